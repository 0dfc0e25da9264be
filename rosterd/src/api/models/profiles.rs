//! API request/response models for talent profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::profiles::{ProfileDBResponse, ProfileWithOwnerDBResponse},
    types::{ProfileId, UserId},
};

/// Social links are stored as free-form JSON; the UI decides which keys it
/// renders (website, instagram, tiktok in the current frontend).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileCreate {
    pub display_name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    pub social_links: Option<serde_json::Value>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub hobbies: Option<Vec<String>>,
    pub social_links: Option<serde_json::Value>,
    pub avatar_url: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProfileId,
    #[schema(value_type = String, format = "uuid")]
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

impl From<ProfileDBResponse> for ProfileResponse {
    fn from(db: ProfileDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            display_name: db.display_name,
            bio: db.bio,
            hobbies: db.hobbies,
            social_links: db.social_links,
            avatar_url: db.avatar_url,
            is_public: db.is_public,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// A profile with its owner, for the admin talent manager.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TalentResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub owner_email: String,
    pub owner_created_at: DateTime<Utc>,
}

impl From<ProfileWithOwnerDBResponse> for TalentResponse {
    fn from(db: ProfileWithOwnerDBResponse) -> Self {
        Self {
            profile: ProfileResponse::from(db.profile),
            owner_email: db.owner_email,
            owner_created_at: db.owner_created_at,
        }
    }
}

/// Public gallery card: no owner identifiers beyond the profile itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GalleryProfileResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProfileId,
    pub display_name: String,
    pub bio: Option<String>,
    pub hobbies: Vec<String>,
    pub social_links: Option<serde_json::Value>,
    pub avatar_url: Option<String>,
}

impl From<ProfileDBResponse> for GalleryProfileResponse {
    fn from(db: ProfileDBResponse) -> Self {
        Self {
            id: db.id,
            display_name: db.display_name,
            bio: db.bio,
            hobbies: db.hobbies,
            social_links: db.social_links,
            avatar_url: db.avatar_url,
        }
    }
}
