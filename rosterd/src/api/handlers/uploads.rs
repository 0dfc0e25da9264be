//! Avatar upload for the signed-in talent.

use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::{
    AppState,
    api::handlers::photos::read_upload,
    api::models::{photos::AvatarUploadResponse, users::CurrentUser},
    db::handlers::Profiles,
    errors::{Error, Result},
    storage::images,
};

#[utoipa::path(
    post,
    path = "/api/v1/uploads/avatar",
    tag = "uploads",
    summary = "Upload own avatar",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar resized, stored, and set on the profile", body = AvatarUploadResponse),
        (status = 400, description = "Missing file, bad image, or wrong content type"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<AvatarUploadResponse>> {
    let upload = read_upload(multipart, state.config.storage.max_upload_bytes).await?;

    let processed = tokio::task::spawn_blocking({
        let data = upload.data;
        move || images::process_image(&data, images::AVATAR)
    })
    .await
    .map_err(|e| Error::Internal {
        operation: format!("spawn image processing task: {e}"),
    })??;

    let stored = state.storage.store_avatar(&processed, current_user.id, &upload.original_name).await?;

    // The profile may not exist yet; seed it with a placeholder name derived
    // from the email so the avatar has somewhere to live.
    let default_display_name = current_user.email.split('@').next().unwrap_or("talent");

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);
    repo.set_avatar(current_user.id, &stored.url, default_display_name).await?;

    Ok(Json(AvatarUploadResponse {
        url: stored.url,
        filename: stored.filename,
        size: stored.size,
    }))
}
