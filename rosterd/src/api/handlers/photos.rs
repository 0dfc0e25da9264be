//! Admin photo endpoints: upload, list, move between folders, delete.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        photos::{PhotoResponse, PhotoSearchQuery, PhotoUpdate},
    },
    auth::current_user::RequiresAdmin,
    db::{
        handlers::{Photos, Repository},
        models::photos::{PhotoCreateDBRequest, PhotoFilter, PhotoUpdateDBRequest},
    },
    errors::{Error, Result},
    storage::images,
    types::PhotoId,
};

const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// One uploaded image plus its metadata fields.
pub(crate) struct UploadedImage {
    pub data: Vec<u8>,
    pub original_name: String,
    pub folder: Option<String>,
}

/// Pull the image file (and optional `folder` field) out of a multipart body,
/// enforcing the content-type allow-list and size cap.
pub(crate) async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<UploadedImage> {
    let mut data: Option<Vec<u8>> = None;
    let mut original_name = String::from("upload");
    let mut folder = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Invalid multipart body: {e}"),
    })? {
        match field.name() {
            Some("file") => {
                if let Some(content_type) = field.content_type() {
                    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
                        return Err(Error::BadRequest {
                            message: "Invalid file type. Only JPG, PNG, and WebP are allowed.".to_string(),
                        });
                    }
                }
                if let Some(name) = field.file_name() {
                    original_name = name.to_string();
                }
                let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read upload: {e}"),
                })?;
                if bytes.len() > max_bytes {
                    return Err(Error::BadRequest {
                        message: format!("File too large. Maximum size is {} bytes.", max_bytes),
                    });
                }
                data = Some(bytes.to_vec());
            }
            Some("folder") => {
                let text = field.text().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read folder field: {e}"),
                })?;
                if !text.is_empty() {
                    folder = Some(text);
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| Error::BadRequest {
        message: "No file provided".to_string(),
    })?;

    Ok(UploadedImage {
        data,
        original_name,
        folder,
    })
}

#[utoipa::path(
    get,
    path = "/admin/api/v1/photos",
    tag = "photos",
    summary = "List uploaded photos",
    params(PhotoSearchQuery, Pagination),
    responses(
        (status = 200, description = "All photos with uploader info, newest first", body = Vec<PhotoResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_photos(
    State(state): State<AppState>,
    _: RequiresAdmin,
    Query(search): Query<PhotoSearchQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<PhotoResponse>>> {
    let (skip, limit) = pagination.resolve(100, 1000);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Photos::new(&mut conn);

    let photos = repo
        .list_with_uploader(&PhotoFilter {
            folder: None,
            search: search.search,
            skip,
            limit,
        })
        .await?;

    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/api/v1/photos",
    tag = "photos",
    summary = "Upload a photo",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo resized, stored and recorded", body = PhotoResponse),
        (status = 400, description = "Missing file, bad image, or wrong content type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upload_photo(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoResponse>)> {
    let upload = read_upload(multipart, state.config.storage.max_upload_bytes).await?;
    let folder = upload.folder.unwrap_or_else(|| "general".to_string());

    // Resizing is CPU-bound; keep it off the async runtime
    let processed = tokio::task::spawn_blocking({
        let data = upload.data;
        move || images::process_image(&data, images::ADMIN_PHOTO)
    })
    .await
    .map_err(|e| Error::Internal {
        operation: format!("spawn image processing task: {e}"),
    })??;

    let stored = state.storage.store_photo(&processed, &folder, &upload.original_name).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Photos::new(&mut conn);
    let photo = repo
        .create(&PhotoCreateDBRequest {
            filename: stored.filename,
            original_name: upload.original_name,
            folder,
            path: stored.path,
            url: stored.url,
            size_bytes: stored.size as i64,
            uploaded_by: admin.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PhotoResponse::from(photo))))
}

#[utoipa::path(
    patch,
    path = "/admin/api/v1/photos/{photo_id}",
    tag = "photos",
    summary = "Move a photo to another folder",
    request_body = PhotoUpdate,
    params(("photo_id" = Uuid, Path, description = "Photo to move")),
    responses(
        (status = 200, description = "Photo moved", body = PhotoResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Photo not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_photo(
    State(state): State<AppState>,
    _: RequiresAdmin,
    Path(photo_id): Path<PhotoId>,
    Json(request): Json<PhotoUpdate>,
) -> Result<Json<PhotoResponse>> {
    if request.folder.is_empty() {
        return Err(Error::BadRequest {
            message: "Folder must not be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Photos::new(&mut conn);

    if repo.get_by_id(photo_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Photo".to_string(),
            id: photo_id.to_string(),
        });
    }

    let photo = repo
        .update(
            photo_id,
            &PhotoUpdateDBRequest {
                folder: Some(request.folder),
            },
        )
        .await?;

    Ok(Json(PhotoResponse::from(photo)))
}

#[utoipa::path(
    delete,
    path = "/admin/api/v1/photos/{photo_id}",
    tag = "photos",
    summary = "Delete a photo",
    params(("photo_id" = Uuid, Path, description = "Photo to delete")),
    responses(
        (status = 204, description = "Photo and stored object deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Photo not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_photo(State(state): State<AppState>, _: RequiresAdmin, Path(photo_id): Path<PhotoId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Photos::new(&mut conn);

    let photo = repo.get_by_id(photo_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Photo".to_string(),
        id: photo_id.to_string(),
    })?;

    // Storage first: a dangling row is recoverable, a dangling file is not
    // discoverable.
    state.storage.delete(&photo.path).await?;
    repo.delete(photo_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
