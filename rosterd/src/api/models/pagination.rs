//! Shared pagination query parameters.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Maximum number of records to return
    pub limit: Option<i64>,
}

impl Pagination {
    /// Resolve against a default and hard cap.
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit);
        (skip, limit)
    }
}
