//! Database models for uploaded admin photos.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{PhotoId, UserId};

/// Database entity model
#[derive(Debug, Clone, FromRow)]
pub struct PhotoDBResponse {
    pub id: PhotoId,
    pub filename: String,
    pub original_name: String,
    pub folder: String,
    pub path: String,
    pub url: String,
    pub size_bytes: i64,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// A photo joined with its uploader's email, for admin listings.
#[derive(Debug, Clone)]
pub struct PhotoWithUploaderDBResponse {
    pub photo: PhotoDBResponse,
    pub uploader_email: String,
}

/// Request for creating a photo record
#[derive(Debug, Clone)]
pub struct PhotoCreateDBRequest {
    pub filename: String,
    pub original_name: String,
    pub folder: String,
    pub path: String,
    pub url: String,
    pub size_bytes: i64,
    pub uploaded_by: UserId,
}

/// Request for updating a photo record. Only the logical folder can move;
/// the stored object itself stays where it was written.
#[derive(Debug, Clone)]
pub struct PhotoUpdateDBRequest {
    pub folder: Option<String>,
}

/// Filter for listing photos
#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    /// Restrict to a single folder (e.g. "gallery" for the public view)
    pub folder: Option<String>,
    /// Case-insensitive substring match on filename or original name
    pub search: Option<String>,
    pub skip: i64,
    pub limit: i64,
}
