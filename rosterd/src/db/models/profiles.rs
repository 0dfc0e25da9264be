//! Database models for talent profiles.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{ProfileId, UserId};

/// Database entity model
#[derive(Debug, Clone, FromRow)]
pub struct ProfileDBResponse {
    pub id: ProfileId,
    pub user_id: UserId,
    pub display_name: String,
    pub bio: Option<String>,
    pub hobbies: Vec<String>,
    pub social_links: Option<serde_json::Value>,
    pub avatar_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile joined with its owning user, for the admin talent listing.
#[derive(Debug, Clone)]
pub struct ProfileWithOwnerDBResponse {
    pub profile: ProfileDBResponse,
    pub owner_email: String,
    pub owner_created_at: DateTime<Utc>,
}

/// Request for creating (or replacing) a profile
#[derive(Debug, Clone)]
pub struct ProfileCreateDBRequest {
    pub user_id: UserId,
    pub display_name: String,
    pub bio: Option<String>,
    pub hobbies: Vec<String>,
    pub social_links: Option<serde_json::Value>,
    pub avatar_url: Option<String>,
    pub is_public: bool,
}

/// Request for partially updating a profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateDBRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub hobbies: Option<Vec<String>>,
    pub social_links: Option<serde_json::Value>,
    pub avatar_url: Option<String>,
    pub is_public: Option<bool>,
}

/// Filter for listing profiles
#[derive(Debug, Clone)]
pub struct ProfileFilter {
    /// Restrict to publicly listed profiles (the gallery view)
    pub public_only: bool,
    pub skip: i64,
    pub limit: i64,
}

impl ProfileFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            public_only: false,
            skip,
            limit,
        }
    }

    pub fn public(skip: i64, limit: i64) -> Self {
        Self {
            public_only: true,
            skip,
            limit,
        }
    }
}
