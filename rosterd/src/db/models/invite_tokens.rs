//! Database models for invite tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{InviteTokenId, UserId};

/// Database entity model.
///
/// `email` may be the empty string: that represents a generic (QR-style)
/// invite that is not tied to one address. `consumed_at`, once set, is never
/// cleared or changed.
#[derive(Debug, Clone, FromRow)]
pub struct InviteToken {
    pub id: InviteTokenId,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
}

/// Request for creating an invite token
#[derive(Debug, Clone)]
pub struct InviteTokenCreateDBRequest {
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_by: UserId,
}

/// Request for updating an invite token (mark as consumed)
#[derive(Debug, Clone)]
pub struct InviteTokenUpdateDBRequest {
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Response type (same as entity for now)
pub type InviteTokenDBResponse = InviteToken;

/// Filter for listing invite tokens, most recent first
#[derive(Debug, Clone)]
pub struct InviteTokenFilter {
    pub skip: i64,
    pub limit: i64,
}

impl InviteTokenFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}
