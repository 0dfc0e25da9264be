//! Invite endpoints.
//!
//! Admin surface: list, create (email), create (QR), prune. Public surface:
//! validate and consume, keyed by the opaque token string. The lifecycle
//! rules live in [`crate::invites`]; these handlers wire it to HTTP, email
//! and user provisioning.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::invites::{
        InviteConsumedResponse, InviteCreate, InviteCreatedResponse, InvitePruneResponse, InviteResponse, InviteValidationResponse,
        QrInviteResponse,
    },
    auth::current_user::RequiresAdmin,
    db::{
        handlers::{InviteTokens, Repository, Users},
        models::{invite_tokens::InviteTokenFilter, users::UserCreateDBRequest},
    },
    email::EmailService,
    errors::{Error, Result},
    invites::InviteLifecycle,
    qr,
};

#[utoipa::path(
    get,
    path = "/admin/api/v1/invites",
    tag = "invites",
    summary = "List recent invites",
    responses(
        (status = 200, description = "Most recent invites, newest first", body = Vec<InviteResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_invites(State(state): State<AppState>, _: RequiresAdmin) -> Result<Json<Vec<InviteResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = InviteTokens::new(&mut conn);

    let invites = repo.list(&InviteTokenFilter::new(0, state.config.invites.recent_limit)).await?;

    Ok(Json(invites.into_iter().map(InviteResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/api/v1/invites",
    tag = "invites",
    summary = "Create an email invite",
    request_body = InviteCreate,
    responses(
        (status = 201, description = "Invite created; email delivery is best-effort", body = InviteCreatedResponse),
        (status = 400, description = "Invalid email address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_invite(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
    Json(request): Json<InviteCreate>,
) -> Result<(StatusCode, Json<InviteCreatedResponse>)> {
    // Untargeted invites go through the QR endpoint; this one needs a real
    // address to send to.
    if request.email.is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required; use the QR endpoint for generic invites".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let invite = InviteLifecycle::new(&mut conn)
        .create_invite(&request.email, admin.id, state.config.invites.token_duration)
        .await?;

    let invite_url = qr::invite_url(&state.config.public_url, &invite.token);

    // Delivery failure must not roll the invite back: the admin gets the URL
    // in the response either way and can pass it along by hand.
    match EmailService::new(&state.config) {
        Ok(email_service) => {
            if let Err(e) = email_service.send_invite_email(&request.email, &invite_url).await {
                tracing::warn!("failed to send invite email to {}: {e}", request.email);
            }
        }
        Err(e) => tracing::warn!("email service unavailable: {e}"),
    }

    Ok((
        StatusCode::CREATED,
        Json(InviteCreatedResponse {
            invite: InviteResponse::from(invite),
            invite_url,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/api/v1/invites/qr",
    tag = "invites",
    summary = "Create a generic QR invite",
    responses(
        (status = 201, description = "Generic invite with scannable code", body = QrInviteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_qr_invite(
    State(state): State<AppState>,
    RequiresAdmin(admin): RequiresAdmin,
) -> Result<(StatusCode, Json<QrInviteResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // Empty email marks a generic invite: whoever scans the code first gets it
    let invite = InviteLifecycle::new(&mut conn)
        .create_invite("", admin.id, state.config.invites.token_duration)
        .await?;

    let invite_url = qr::invite_url(&state.config.public_url, &invite.token);
    let qr_svg = qr::qr_svg(&invite_url)?;

    Ok((
        StatusCode::CREATED,
        Json(QrInviteResponse {
            token: invite.token,
            invite_url,
            qr_svg,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/api/v1/invites/prune",
    tag = "invites",
    summary = "Delete expired, unconsumed invites",
    responses(
        (status = 200, description = "Expired invites removed", body = InvitePruneResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn prune_invites(State(state): State<AppState>, _: RequiresAdmin) -> Result<Json<InvitePruneResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = InviteTokens::new(&mut conn);

    let removed = repo.delete_expired(Utc::now()).await?;
    tracing::info!("pruned {removed} expired invites");

    Ok(Json(InvitePruneResponse { removed }))
}

#[utoipa::path(
    get,
    path = "/api/v1/invites/{token}/validate",
    tag = "invites",
    summary = "Check an invite before accepting it",
    params(("token" = String, Path, description = "Opaque invite token")),
    responses(
        (status = 200, description = "Invite is valid; shows the target email", body = InviteValidationResponse),
        (status = 404, description = "No such invite"),
        (status = 409, description = "Invite was already used"),
        (status = 410, description = "Invite has expired"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn validate_invite(State(state): State<AppState>, Path(token): Path<String>) -> Result<Json<InviteValidationResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let invite = InviteLifecycle::new(&mut conn).validate(&token).await?;

    Ok(Json(InviteValidationResponse {
        valid: true,
        email: invite.email,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/invites/{token}/consume",
    tag = "invites",
    summary = "Accept an invite",
    params(("token" = String, Path, description = "Opaque invite token")),
    responses(
        (status = 200, description = "Invite consumed; account provisioned for targeted invites", body = InviteConsumedResponse),
        (status = 404, description = "No such invite"),
        (status = 409, description = "Invite was already used"),
        (status = 410, description = "Invite has expired"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn consume_invite(State(state): State<AppState>, Path(token): Path<String>) -> Result<Json<InviteConsumedResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let invite = InviteLifecycle::new(&mut tx).consume(&token).await?;

    // Targeted invites provision the account right away so the sign-in link
    // lands on an existing user. Generic invites collect the email during
    // onboarding instead.
    if !invite.email.is_empty() {
        let mut users = Users::new(&mut tx);
        if users.get_user_by_email(&invite.email).await?.is_none() {
            users
                .create(&UserCreateDBRequest {
                    email: invite.email.clone(),
                    is_admin: false,
                    auth_source: "invite".to_string(),
                    password_hash: None,
                })
                .await?;
        }
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    // Post-consumption sign-in mail is outside the lifecycle's contract;
    // failure is logged and the acceptance still stands.
    if !invite.email.is_empty() {
        let mut signin_url = state.config.public_url.clone();
        signin_url.set_path("/auth/signin");
        match EmailService::new(&state.config) {
            Ok(email_service) => {
                if let Err(e) = email_service.send_signin_email(&invite.email, signin_url.as_str()).await {
                    tracing::warn!("failed to send sign-in email to {}: {e}", invite.email);
                }
            }
            Err(e) => tracing::warn!("email service unavailable: {e}"),
        }
    }

    Ok(Json(InviteConsumedResponse {
        message: "Invite accepted".to_string(),
    }))
}
