//! API response models for the admin dashboard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::users::UserResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_profiles: i64,
    pub public_profiles: i64,
    pub pending_invites: i64,
    pub total_notes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub admin: UserResponse,
    pub stats: DashboardStats,
}
