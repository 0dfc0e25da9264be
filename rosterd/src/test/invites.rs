//! Invite endpoints, end to end: admin minting, public acceptance, pruning.

use serde_json::json;
use sqlx::PgPool;

use crate::{
    api::models::invites::{InviteCreatedResponse, InviteResponse, InviteStatus, InvitePruneResponse, InviteValidationResponse, QrInviteResponse},
    db::handlers::Users,
    test_utils::*,
};

#[sqlx::test]
#[test_log::test]
async fn test_create_invite_requires_admin(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    // Anonymous
    let response = server
        .post("/admin/api/v1/invites")
        .json(&json!({"email": "jane@example.com"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 401);

    // Signed in, but not an admin
    let response = server
        .post("/admin/api/v1/invites")
        .add_header("cookie", session_cookie_for(&user))
        .json(&json!({"email": "jane@example.com"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 403);
}

#[sqlx::test]
#[test_log::test]
async fn test_invite_acceptance_flow(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let admin = create_test_admin_user(&pool).await;

    // Admin mints an invite
    let response = server
        .post("/admin/api/v1/invites")
        .add_header("cookie", session_cookie_for(&admin))
        .json(&json!({"email": "jane@example.com"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 201);
    let created: InviteCreatedResponse = response.json();
    assert_eq!(created.invite.email, "jane@example.com");
    assert_eq!(created.invite.status, InviteStatus::Pending);
    assert!(created.invite_url.contains(&created.invite.token));

    // The invitee checks the link: target email is shown before committing
    let token = &created.invite.token;
    let response = server.get(&format!("/api/v1/invites/{token}/validate")).await;
    assert_eq!(response.status_code().as_u16(), 200);
    let validation: InviteValidationResponse = response.json();
    assert!(validation.valid);
    assert_eq!(validation.email, "jane@example.com");

    // They accept
    let response = server.post(&format!("/api/v1/invites/{token}/consume")).await;
    assert_eq!(response.status_code().as_u16(), 200);

    // An account now exists for the invited address
    let mut conn = pool.acquire().await.unwrap();
    let provisioned = Users::new(&mut conn)
        .get_user_by_email("jane@example.com")
        .await
        .unwrap()
        .expect("user should be provisioned on acceptance");
    assert!(!provisioned.is_admin);
    assert_eq!(provisioned.auth_source, "invite");
    assert!(provisioned.password_hash.is_none());

    // The link is dead from here on, with a specific explanation
    let response = server.post(&format!("/api/v1/invites/{token}/consume")).await;
    assert_eq!(response.status_code().as_u16(), 409);
    assert_eq!(response.text(), "This invite was already used");

    let response = server.get(&format!("/api/v1/invites/{token}/validate")).await;
    assert_eq!(response.status_code().as_u16(), 409);
}

#[sqlx::test]
#[test_log::test]
async fn test_unknown_and_invalid_tokens(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let admin = create_test_admin_user(&pool).await;

    let response = server.get("/api/v1/invites/nonexistent-token-string/validate").await;
    assert_eq!(response.status_code().as_u16(), 404);
    assert_eq!(response.text(), "Invalid invite link");

    let response = server
        .post("/admin/api/v1/invites")
        .add_header("cookie", session_cookie_for(&admin))
        .json(&json!({"email": "not-an-email"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);

    // Empty email belongs to the QR endpoint
    let response = server
        .post("/admin/api/v1/invites")
        .add_header("cookie", session_cookie_for(&admin))
        .json(&json!({"email": ""}))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);
}

#[sqlx::test]
#[test_log::test]
async fn test_expired_invite_has_specific_status(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let admin = create_test_admin_user(&pool).await;
    let token = create_test_invite(&pool, "slow@example.com", admin.id).await;

    // Eight days pass
    sqlx::query!(
        "UPDATE invite_tokens SET expires_at = expires_at - INTERVAL '8 days' WHERE token = $1",
        token
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = server.get(&format!("/api/v1/invites/{token}/validate")).await;
    assert_eq!(response.status_code().as_u16(), 410);
    assert_eq!(response.text(), "This invite has expired");

    let response = server.post(&format!("/api/v1/invites/{token}/consume")).await;
    assert_eq!(response.status_code().as_u16(), 410);
}

#[sqlx::test]
#[test_log::test]
async fn test_qr_invite(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let admin = create_test_admin_user(&pool).await;

    let response = server
        .post("/admin/api/v1/invites/qr")
        .add_header("cookie", session_cookie_for(&admin))
        .await;
    assert_eq!(response.status_code().as_u16(), 201);
    let qr: QrInviteResponse = response.json();
    assert!(qr.qr_svg.contains("<svg") || qr.qr_svg.contains("<?xml"));
    assert!(qr.invite_url.contains(&qr.token));

    // Generic invite: validates with an empty target email, consumes normally
    let response = server.get(&format!("/api/v1/invites/{}/validate", qr.token)).await;
    assert_eq!(response.status_code().as_u16(), 200);
    let validation: InviteValidationResponse = response.json();
    assert_eq!(validation.email, "");

    let response = server.post(&format!("/api/v1/invites/{}/consume", qr.token)).await;
    assert_eq!(response.status_code().as_u16(), 200);
}

#[sqlx::test]
#[test_log::test]
async fn test_list_and_prune(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let admin = create_test_admin_user(&pool).await;

    let fresh = create_test_invite(&pool, "fresh@example.com", admin.id).await;
    let stale = create_test_invite(&pool, "stale@example.com", admin.id).await;
    sqlx::query!(
        "UPDATE invite_tokens SET expires_at = expires_at - INTERVAL '9 days' WHERE token = $1",
        stale
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = server
        .get("/admin/api/v1/invites")
        .add_header("cookie", session_cookie_for(&admin))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let invites: Vec<InviteResponse> = response.json();
    assert_eq!(invites.len(), 2);
    let statuses: Vec<_> = invites.iter().map(|i| (i.email.as_str(), i.status)).collect();
    assert!(statuses.contains(&("fresh@example.com", InviteStatus::Pending)));
    assert!(statuses.contains(&("stale@example.com", InviteStatus::Expired)));

    let response = server
        .post("/admin/api/v1/invites/prune")
        .add_header("cookie", session_cookie_for(&admin))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let pruned: InvitePruneResponse = response.json();
    assert_eq!(pruned.removed, 1);

    // Only the expired one is gone
    let mut conn = pool.acquire().await.unwrap();
    let remaining = sqlx::query_scalar!("SELECT token FROM invite_tokens")
        .fetch_all(&mut *conn)
        .await
        .unwrap();
    assert_eq!(remaining, vec![fresh]);
}
