//! Authentication flow tests: login, session cookies, set-password.

use serde_json::json;
use sqlx::PgPool;

use crate::{
    api::models::auth::MeResponse,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    test_utils::*,
};

#[sqlx::test]
#[test_log::test]
async fn test_login_sets_session_cookie(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let response = server
        .post("/authentication/login")
        .json(&json!({"email": user.email, "password": TEST_PASSWORD}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    // The cookie authenticates /me
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
    let response = server.get("/api/v1/me").add_header("cookie", cookie_pair).await;
    assert_eq!(response.status_code().as_u16(), 200);
    let me: MeResponse = response.json();
    assert_eq!(me.user.email, user.email);
    assert!(me.profile.is_none());
}

#[sqlx::test]
#[test_log::test]
async fn test_login_rejects_bad_credentials(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let response = server
        .post("/authentication/login")
        .json(&json!({"email": user.email, "password": "wrong"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 401);

    let response = server
        .post("/authentication/login")
        .json(&json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))
        .await;
    assert_eq!(response.status_code().as_u16(), 401);

    let response = server.get("/api/v1/me").await;
    assert_eq!(response.status_code().as_u16(), 401);
}

#[sqlx::test]
#[test_log::test]
async fn test_invited_user_sets_first_password(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;

    // A freshly provisioned invitee: account exists, no password yet
    let mut conn = pool.acquire().await.unwrap();
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: "newcomer@example.com".to_string(),
            is_admin: false,
            auth_source: "invite".to_string(),
            password_hash: None,
        })
        .await
        .unwrap();
    drop(conn);

    // They cannot log in yet
    let response = server
        .post("/authentication/login")
        .json(&json!({"email": "newcomer@example.com", "password": "anything"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 401);

    // First password needs no current_password
    let user_response = crate::api::models::users::UserResponse::from(user);
    let response = server
        .post("/authentication/set-password")
        .add_header("cookie", session_cookie_for(&user_response))
        .json(&json!({"new_password": "first-password-123"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);

    // Now login works
    let response = server
        .post("/authentication/login")
        .json(&json!({"email": "newcomer@example.com", "password": "first-password-123"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
}

#[sqlx::test]
#[test_log::test]
async fn test_password_change_requires_current(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    // Missing current password
    let response = server
        .post("/authentication/set-password")
        .add_header("cookie", session_cookie_for(&user))
        .json(&json!({"new_password": "another-password-123"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);

    // Wrong current password
    let response = server
        .post("/authentication/set-password")
        .add_header("cookie", session_cookie_for(&user))
        .json(&json!({"current_password": "wrong", "new_password": "another-password-123"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 401);

    // Too-short new password
    let response = server
        .post("/authentication/set-password")
        .add_header("cookie", session_cookie_for(&user))
        .json(&json!({"current_password": TEST_PASSWORD, "new_password": "short"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);

    // Correct current password
    let response = server
        .post("/authentication/set-password")
        .add_header("cookie", session_cookie_for(&user))
        .json(&json!({"current_password": TEST_PASSWORD, "new_password": "another-password-123"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);

    let response = server
        .post("/authentication/login")
        .json(&json!({"email": user.email, "password": "another-password-123"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
}

#[sqlx::test]
#[test_log::test]
async fn test_logout_clears_cookie(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;

    let response = server.post("/authentication/logout").await;
    assert_eq!(response.status_code().as_u16(), 200);

    let set_cookie = response.headers().get("set-cookie").expect("logout should clear the cookie");
    assert!(set_cookie.to_str().unwrap().contains("Max-Age=0"));
}
