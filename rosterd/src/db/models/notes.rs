//! Database models for admin notes on talent.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{NoteId, UserId};

/// Database entity model
#[derive(Debug, Clone, FromRow)]
pub struct NoteDBResponse {
    pub id: NoteId,
    pub talent_user_id: UserId,
    pub admin_user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note joined with the talent it refers to, for the admin notes listing.
#[derive(Debug, Clone)]
pub struct NoteWithTalentDBResponse {
    pub note: NoteDBResponse,
    pub talent_display_name: Option<String>,
    pub talent_avatar_url: Option<String>,
}

/// Request for creating a note
#[derive(Debug, Clone)]
pub struct NoteCreateDBRequest {
    pub talent_user_id: UserId,
    pub admin_user_id: UserId,
    pub body: String,
}

/// Request for updating a note body
#[derive(Debug, Clone)]
pub struct NoteUpdateDBRequest {
    pub body: Option<String>,
}

/// Filter for listing notes
#[derive(Debug, Clone)]
pub struct NoteFilter {
    /// Restrict to notes authored by this admin
    pub admin_user_id: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}

impl NoteFilter {
    pub fn by_admin(admin_user_id: UserId, skip: i64, limit: i64) -> Self {
        Self {
            admin_user_id: Some(admin_user_id),
            skip,
            limit,
        }
    }
}
