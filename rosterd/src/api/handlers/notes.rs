//! Admin note endpoints. Notes are private to the admin who wrote them.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        notes::{MAX_NOTE_BODY, NoteCreate, NoteResponse, NoteUpdate},
        pagination::Pagination,
    },
    auth::current_user::RequiresAdmin,
    db::{
        handlers::{Notes, Repository, Users},
        models::notes::{NoteCreateDBRequest, NoteFilter, NoteUpdateDBRequest},
    },
    errors::{Error, Result},
    types::NoteId,
};

fn validate_body(body: &str) -> Result<()> {
    if body.is_empty() || body.len() > MAX_NOTE_BODY {
        return Err(Error::BadRequest {
            message: format!("Note body must be between 1 and {MAX_NOTE_BODY} characters"),
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/admin/api/v1/notes",
    tag = "notes",
    summary = "List own notes",
    params(Pagination),
    responses(
        (status = 200, description = "Notes written by the caller, newest first", body = Vec<NoteResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_notes(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<NoteResponse>>> {
    let (skip, limit) = pagination.resolve(100, 1000);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let notes = repo.list_with_talent(&NoteFilter::by_admin(admin.id, skip, limit)).await?;

    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/api/v1/notes",
    tag = "notes",
    summary = "Create a note on a talent",
    request_body = NoteCreate,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Invalid note"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Talent user not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_note(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
    Json(request): Json<NoteCreate>,
) -> Result<(StatusCode, Json<NoteResponse>)> {
    validate_body(&request.body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut users = Users::new(&mut conn);
    if users.get_by_id(request.talent_user_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "User".to_string(),
            id: request.talent_user_id.to_string(),
        });
    }

    let mut repo = Notes::new(&mut conn);
    let note = repo
        .create(&NoteCreateDBRequest {
            talent_user_id: request.talent_user_id,
            admin_user_id: admin.id,
            body: request.body,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(NoteResponse::from(note))))
}

#[utoipa::path(
    patch,
    path = "/admin/api/v1/notes/{note_id}",
    tag = "notes",
    summary = "Edit a note",
    request_body = NoteUpdate,
    params(("note_id" = Uuid, Path, description = "Note to edit")),
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Invalid note"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Note not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_note(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
    Path(note_id): Path<NoteId>,
    Json(request): Json<NoteUpdate>,
) -> Result<Json<NoteResponse>> {
    validate_body(&request.body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    // Notes are private: another admin's note is indistinguishable from a
    // missing one.
    let existing = repo.get_by_id(note_id).await?.filter(|n| n.admin_user_id == admin.id);
    if existing.is_none() {
        return Err(Error::NotFound {
            resource: "Note".to_string(),
            id: note_id.to_string(),
        });
    }

    let note = repo
        .update(
            note_id,
            &NoteUpdateDBRequest {
                body: Some(request.body),
            },
        )
        .await?;

    Ok(Json(NoteResponse::from(note)))
}

#[utoipa::path(
    delete,
    path = "/admin/api/v1/notes/{note_id}",
    tag = "notes",
    summary = "Delete a note",
    params(("note_id" = Uuid, Path, description = "Note to delete")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Note not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_note(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
    Path(note_id): Path<NoteId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let existing = repo.get_by_id(note_id).await?.filter(|n| n.admin_user_id == admin.id);
    if existing.is_none() {
        return Err(Error::NotFound {
            resource: "Note".to_string(),
            id: note_id.to_string(),
        });
    }

    repo.delete(note_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
