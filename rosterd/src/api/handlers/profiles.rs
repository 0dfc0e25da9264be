//! Profile endpoints for the signed-in talent, plus the admin talent manager.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        profiles::{ProfileCreate, ProfileResponse, ProfileUpdate, TalentResponse},
    },
    auth::current_user::RequiresAdmin,
    api::models::users::CurrentUser,
    db::{
        handlers::{Profiles, Repository},
        models::profiles::{ProfileCreateDBRequest, ProfileFilter, ProfileUpdateDBRequest},
    },
    errors::{Error, Result},
    types::ProfileId,
};

const MAX_HOBBIES: usize = 10;

fn validate_profile_fields(display_name: Option<&str>, hobbies: Option<&[String]>) -> Result<()> {
    if let Some(name) = display_name {
        if name.trim().len() < 2 {
            return Err(Error::BadRequest {
                message: "Display name must be at least 2 characters".to_string(),
            });
        }
    }
    if let Some(hobbies) = hobbies {
        if hobbies.len() > MAX_HOBBIES {
            return Err(Error::BadRequest {
                message: format!("You can add up to {MAX_HOBBIES} hobbies"),
            });
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profiles",
    summary = "Get own profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No profile yet"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_my_profile(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<ProfileResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    let profile = repo.get_by_user_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "Profile".to_string(),
        id: current_user.id.to_string(),
    })?;

    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "profiles",
    summary = "Create or replace own profile",
    request_body = ProfileCreate,
    responses(
        (status = 200, description = "Profile stored", body = ProfileResponse),
        (status = 400, description = "Invalid profile data"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn put_my_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ProfileCreate>,
) -> Result<Json<ProfileResponse>> {
    validate_profile_fields(Some(&request.display_name), Some(&request.hobbies))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    let profile = repo
        .create(&ProfileCreateDBRequest {
            user_id: current_user.id,
            display_name: request.display_name,
            bio: request.bio,
            hobbies: request.hobbies,
            social_links: request.social_links,
            avatar_url: request.avatar_url,
            is_public: request.is_public,
        })
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/profile",
    tag = "profiles",
    summary = "Update own profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid profile data"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No profile yet"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn patch_my_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>> {
    validate_profile_fields(request.display_name.as_deref(), request.hobbies.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    let existing = repo.get_by_user_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "Profile".to_string(),
        id: current_user.id.to_string(),
    })?;

    let profile = repo
        .update(
            existing.id,
            &ProfileUpdateDBRequest {
                display_name: request.display_name,
                bio: request.bio,
                hobbies: request.hobbies,
                social_links: request.social_links,
                avatar_url: request.avatar_url,
                is_public: request.is_public,
            },
        )
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    get,
    path = "/admin/api/v1/talent",
    tag = "talent",
    summary = "List all talent profiles",
    params(Pagination),
    responses(
        (status = 200, description = "All profiles with owner info, most recently updated first", body = Vec<TalentResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_talent(
    State(state): State<AppState>,
    _: RequiresAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<TalentResponse>>> {
    let (skip, limit) = pagination.resolve(100, 1000);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    let profiles = repo.list_with_owner(&ProfileFilter::new(skip, limit)).await?;

    Ok(Json(profiles.into_iter().map(TalentResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/admin/api/v1/talent/{profile_id}",
    tag = "talent",
    summary = "Update any talent profile",
    request_body = ProfileUpdate,
    params(("profile_id" = Uuid, Path, description = "Profile to update")),
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Profile not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_talent(
    State(state): State<AppState>,
    _: RequiresAdmin,
    Path(profile_id): Path<ProfileId>,
    Json(request): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>> {
    validate_profile_fields(request.display_name.as_deref(), request.hobbies.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    if repo.get_by_id(profile_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Profile".to_string(),
            id: profile_id.to_string(),
        });
    }

    let profile = repo
        .update(
            profile_id,
            &ProfileUpdateDBRequest {
                display_name: request.display_name,
                bio: request.bio,
                hobbies: request.hobbies,
                social_links: request.social_links,
                avatar_url: request.avatar_url,
                is_public: request.is_public,
            },
        )
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    delete,
    path = "/admin/api/v1/talent/{profile_id}",
    tag = "talent",
    summary = "Delete a talent profile",
    params(("profile_id" = Uuid, Path, description = "Profile to delete")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Profile not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_talent(State(state): State<AppState>, _: RequiresAdmin, Path(profile_id): Path<ProfileId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Profiles::new(&mut conn);

    if !repo.delete(profile_id).await? {
        return Err(Error::NotFound {
            resource: "Profile".to_string(),
            id: profile_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
