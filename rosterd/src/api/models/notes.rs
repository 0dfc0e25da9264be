//! API request/response models for admin notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::notes::{NoteDBResponse, NoteWithTalentDBResponse},
    types::{NoteId, UserId},
};

pub const MAX_NOTE_BODY: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteCreate {
    #[schema(value_type = String, format = "uuid")]
    pub talent_user_id: UserId,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteUpdate {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NoteId,
    #[schema(value_type = String, format = "uuid")]
    pub talent_user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub admin_user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Talent profile card, when the talent has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talent_display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talent_avatar_url: Option<String>,
}

impl From<NoteDBResponse> for NoteResponse {
    fn from(db: NoteDBResponse) -> Self {
        Self {
            id: db.id,
            talent_user_id: db.talent_user_id,
            admin_user_id: db.admin_user_id,
            body: db.body,
            created_at: db.created_at,
            updated_at: db.updated_at,
            talent_display_name: None,
            talent_avatar_url: None,
        }
    }
}

impl From<NoteWithTalentDBResponse> for NoteResponse {
    fn from(db: NoteWithTalentDBResponse) -> Self {
        Self {
            talent_display_name: db.talent_display_name,
            talent_avatar_url: db.talent_avatar_url,
            ..NoteResponse::from(db.note)
        }
    }
}
