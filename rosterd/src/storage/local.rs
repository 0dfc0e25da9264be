//! Local filesystem storage backend.
//!
//! Layout under the uploads root:
//!
//! ```text
//! uploads/
//!   avatars/<user_id>/<name>-<id>.jpg
//!   admin/<folder>/<name>-<id>.jpg
//! ```
//!
//! The same tree is served read-only under `/files`, so a stored object's
//! public URL is `<public_url>/files/<relative path>`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use crate::{
    errors::Error,
    storage::{StorageBackend, StoredObject},
    types::UserId,
};

pub struct LocalStorage {
    root: PathBuf,
    public_base: Url,
}

impl LocalStorage {
    pub fn new(root: PathBuf, public_base: Url) -> Self {
        Self { root, public_base }
    }

    async fn write_object(&self, relative_dir: &str, filename: &str, data: &[u8]) -> Result<StoredObject, Error> {
        let dir = self.root.join(relative_dir);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| Error::Internal {
            operation: format!("create upload directory: {e}"),
        })?;

        let path = dir.join(filename);
        tokio::fs::write(&path, data).await.map_err(|e| Error::Internal {
            operation: format!("write upload: {e}"),
        })?;

        let relative = format!("{relative_dir}/{filename}");
        Ok(StoredObject {
            url: self.public_url(&relative),
            path: relative,
            filename: filename.to_string(),
            size: data.len() as u64,
        })
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store_avatar(&self, data: &[u8], user_id: UserId, original_name: &str) -> Result<StoredObject, Error> {
        let filename = generate_filename(original_name);
        self.write_object(&format!("avatars/{user_id}"), &filename, data).await
    }

    async fn store_photo(&self, data: &[u8], folder: &str, original_name: &str) -> Result<StoredObject, Error> {
        let folder = sanitize_component(folder);
        if folder.is_empty() {
            return Err(Error::BadRequest {
                message: "Invalid folder name".to_string(),
            });
        }
        let filename = generate_filename(original_name);
        self.write_object(&format!("admin/{folder}"), &filename, data).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        // Stored paths are generated by this backend; anything trying to walk
        // out of the root is hostile input.
        let relative = Path::new(path);
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(Error::BadRequest {
                message: "Invalid storage path".to_string(),
            });
        }

        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            // Already gone: the row is being cleaned up either way
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("storage object {path} already absent");
                Ok(())
            }
            Err(e) => Err(Error::Internal {
                operation: format!("delete upload: {e}"),
            }),
        }
    }

    fn public_url(&self, path: &str) -> String {
        let base = self.public_base.as_str().trim_end_matches('/');
        format!("{base}/files/{path}")
    }
}

/// `holiday shoot (1).png` -> `holiday-shoot-1-<uuid>.jpg`
///
/// The processed payload is always JPEG, so the original extension is
/// dropped; the uuid suffix makes names unique without coordinating with
/// other writers.
fn generate_filename(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let mut base = sanitize_component(stem);
    if base.is_empty() {
        base = "upload".to_string();
    }

    format!("{base}-{}.jpg", Uuid::new_v4().simple())
}

/// Collapse anything outside `[A-Za-z0-9-]` into dashes.
fn sanitize_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path().to_path_buf(), Url::parse("http://localhost:3080").unwrap());
        (dir, storage)
    }

    #[tokio::test]
    async fn test_avatar_round_trip() {
        let (dir, storage) = storage();
        let user_id = Uuid::new_v4();

        let stored = storage
            .store_avatar(b"avatar-bytes", user_id, "Head Shot.png")
            .await
            .expect("store should succeed");

        assert!(stored.path.starts_with(&format!("avatars/{user_id}/head-shot-")));
        assert!(stored.filename.ends_with(".jpg"));
        assert_eq!(stored.size, 12);
        assert_eq!(stored.url, format!("http://localhost:3080/files/{}", stored.path));

        let on_disk = dir.path().join(&stored.path);
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"avatar-bytes");

        storage.delete(&stored.path).await.expect("delete should succeed");
        assert!(!on_disk.exists());

        // Deleting again is fine
        storage.delete(&stored.path).await.expect("repeat delete is a no-op");
    }

    #[tokio::test]
    async fn test_photo_goes_into_folder() {
        let (_dir, storage) = storage();

        let stored = storage.store_photo(b"photo", "Gallery Shots!", "img.jpeg").await.unwrap();
        assert!(stored.path.starts_with("admin/gallery-shots/img-"));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, storage) = storage();

        let err = storage.delete("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("Holiday Shoot (1)"), "holiday-shoot-1");
        assert_eq!(sanitize_component("../sneaky"), "sneaky");
        assert_eq!(sanitize_component("___"), "");
    }
}
