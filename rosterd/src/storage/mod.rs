//! Upload storage behind a trait seam.
//!
//! Handlers talk to [`StorageBackend`]; the only implementation ships files
//! to the local filesystem ([`local::LocalStorage`]), served back under
//! `/files`. The seam exists so an object-store backend can slot in without
//! touching handlers - which provider to use is deployment policy, not
//! application logic.
//!
//! Image resizing lives in [`images`] and runs before bytes reach a backend;
//! backends store what they are given.

pub mod images;
pub mod local;

use async_trait::async_trait;

use crate::{errors::Error, types::UserId};

/// The result of persisting one uploaded object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Public URL the object is reachable at
    pub url: String,
    /// Backend-relative path (stable key for deletion)
    pub path: String,
    /// Generated file name
    pub filename: String,
    /// Stored size in bytes
    pub size: u64,
}

/// Where uploaded files live.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persist a user's avatar image.
    async fn store_avatar(&self, data: &[u8], user_id: UserId, original_name: &str) -> Result<StoredObject, Error>;

    /// Persist an admin-uploaded photo into a folder.
    async fn store_photo(&self, data: &[u8], folder: &str, original_name: &str) -> Result<StoredObject, Error>;

    /// Remove a stored object by its backend-relative path.
    async fn delete(&self, path: &str) -> Result<(), Error>;

    /// Public URL for a backend-relative path.
    fn public_url(&self, path: &str) -> String;
}
