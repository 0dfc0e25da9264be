//! Database repository for uploaded admin photos.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::photos::{PhotoCreateDBRequest, PhotoDBResponse, PhotoFilter, PhotoUpdateDBRequest, PhotoWithUploaderDBResponse},
    },
    types::PhotoId,
};

pub struct Photos<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Photos<'c> {
    type CreateRequest = PhotoCreateDBRequest;
    type UpdateRequest = PhotoUpdateDBRequest;
    type Response = PhotoDBResponse;
    type Id = PhotoId;
    type Filter = PhotoFilter;

    #[instrument(skip(self, request), fields(folder = %request.folder), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();

        let photo = sqlx::query_as!(
            PhotoDBResponse,
            r#"
            INSERT INTO admin_photos (id, filename, original_name, folder, path, url, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, filename, original_name, folder, path, url, size_bytes, uploaded_by, created_at
            "#,
            id,
            request.filename,
            request.original_name,
            request.folder,
            request.path,
            request.url,
            request.size_bytes,
            request.uploaded_by
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(photo)
    }

    #[instrument(skip(self, id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let photo = sqlx::query_as!(
            PhotoDBResponse,
            "SELECT id, filename, original_name, folder, path, url, size_bytes, uploaded_by, created_at FROM admin_photos WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(photo)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let photos = sqlx::query_as!(
            PhotoDBResponse,
            "SELECT id, filename, original_name, folder, path, url, size_bytes, uploaded_by, created_at FROM admin_photos WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(photos.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // Search matches either the generated filename or the name the file
        // was uploaded under.
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));
        let photos = sqlx::query_as!(
            PhotoDBResponse,
            r#"
            SELECT id, filename, original_name, folder, path, url, size_bytes, uploaded_by, created_at
            FROM admin_photos
            WHERE ($1::text IS NULL OR folder = $1)
              AND ($2::text IS NULL OR filename ILIKE $2 OR original_name ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            filter.folder.as_deref(),
            search.as_deref(),
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(photos)
    }

    #[instrument(skip(self, id, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let photo = sqlx::query_as!(
            PhotoDBResponse,
            r#"
            UPDATE admin_photos
            SET folder = COALESCE($2, folder)
            WHERE id = $1
            RETURNING id, filename, original_name, folder, path, url, size_bytes, uploaded_by, created_at
            "#,
            id,
            request.folder
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(photo)
    }

    #[instrument(skip(self, id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM admin_photos WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Photos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Photos joined with their uploader's email, for the admin photo manager.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list_with_uploader(&mut self, filter: &PhotoFilter) -> Result<Vec<PhotoWithUploaderDBResponse>> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));
        let rows = sqlx::query!(
            r#"
            SELECT ph.id, ph.filename, ph.original_name, ph.folder, ph.path, ph.url, ph.size_bytes,
                   ph.uploaded_by, ph.created_at, u.email AS uploader_email
            FROM admin_photos ph
            INNER JOIN users u ON ph.uploaded_by = u.id
            WHERE ($1::text IS NULL OR ph.folder = $1)
              AND ($2::text IS NULL OR ph.filename ILIKE $2 OR ph.original_name ILIKE $2)
            ORDER BY ph.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            filter.folder.as_deref(),
            search.as_deref(),
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PhotoWithUploaderDBResponse {
                photo: PhotoDBResponse {
                    id: r.id,
                    filename: r.filename,
                    original_name: r.original_name,
                    folder: r.folder,
                    path: r.path,
                    url: r.url,
                    size_bytes: r.size_bytes,
                    uploaded_by: r.uploaded_by,
                    created_at: r.created_at,
                },
                uploader_email: r.uploader_email,
            })
            .collect())
    }
}
