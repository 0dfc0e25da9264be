//! Public gallery endpoints. No authentication: this is the shop window.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        photos::{GALLERY_FOLDER, PhotoResponse, PhotoSearchQuery},
        profiles::GalleryProfileResponse,
    },
    db::{
        handlers::{Photos, Profiles, Repository},
        models::{photos::PhotoFilter, profiles::ProfileFilter},
    },
    errors::{Error, Result},
};

#[utoipa::path(
    get,
    path = "/api/v1/gallery",
    tag = "gallery",
    summary = "List public talent profiles",
    params(Pagination),
    responses(
        (status = 200, description = "Publicly listed profiles", body = Vec<GalleryProfileResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_gallery(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<Vec<GalleryProfileResponse>>> {
    let (skip, limit) = pagination.resolve(100, 500);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    let profiles = repo.list(&ProfileFilter::public(skip, limit)).await?;

    Ok(Json(profiles.into_iter().map(GalleryProfileResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/gallery/photos",
    tag = "gallery",
    summary = "List public gallery photos",
    params(PhotoSearchQuery, Pagination),
    responses(
        (status = 200, description = "Photos in the public gallery folder", body = Vec<PhotoResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_gallery_photos(
    State(state): State<AppState>,
    Query(search): Query<PhotoSearchQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<PhotoResponse>>> {
    let (skip, limit) = pagination.resolve(100, 500);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Photos::new(&mut conn);

    // Only the "gallery" folder is public; everything else stays internal
    let photos = repo
        .list(&PhotoFilter {
            folder: Some(GALLERY_FOLDER.to_string()),
            search: search.search,
            skip,
            limit,
        })
        .await?;

    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}
