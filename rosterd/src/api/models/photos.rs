//! API request/response models for uploaded photos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    db::models::photos::{PhotoDBResponse, PhotoWithUploaderDBResponse},
    types::{PhotoId, UserId},
};

/// Photos in this folder are publicly visible in the gallery.
pub const GALLERY_FOLDER: &str = "gallery";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PhotoId,
    pub filename: String,
    pub original_name: String,
    pub folder: String,
    pub url: String,
    pub size_bytes: i64,
    #[schema(value_type = String, format = "uuid")]
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Uploader email, included in admin listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader_email: Option<String>,
}

impl From<PhotoDBResponse> for PhotoResponse {
    fn from(db: PhotoDBResponse) -> Self {
        Self {
            id: db.id,
            filename: db.filename,
            original_name: db.original_name,
            folder: db.folder,
            url: db.url,
            size_bytes: db.size_bytes,
            uploaded_by: db.uploaded_by,
            created_at: db.created_at,
            uploader_email: None,
        }
    }
}

impl From<PhotoWithUploaderDBResponse> for PhotoResponse {
    fn from(db: PhotoWithUploaderDBResponse) -> Self {
        Self {
            uploader_email: Some(db.uploader_email),
            ..PhotoResponse::from(db.photo)
        }
    }
}

/// Move a photo between folders (e.g. publish into "gallery").
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoUpdate {
    pub folder: String,
}

/// Query parameters for photo listings
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PhotoSearchQuery {
    /// Case-insensitive substring match on file names
    pub search: Option<String>,
}

/// Result of an avatar upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvatarUploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
}
