//! Test utilities for integration testing.

use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    api::models::users::{CurrentUser, UserResponse},
    auth::{password, session},
    config::{Config, EmailTransportConfig},
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    invites::InviteLifecycle,
    types::UserId,
};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    // Unique temp directories per process for emails and uploads
    let base = std::env::temp_dir().join(format!("rosterd-test-{}", std::process::id()));

    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        email: crate::config::EmailConfig {
            transport: EmailTransportConfig::File {
                path: base.join("emails").to_string_lossy().to_string(),
            },
            ..Default::default()
        },
        storage: crate::config::StorageConfig {
            uploads_dir: base.join("uploads"),
            ..Default::default()
        },
        enable_metrics: false,
        ..Default::default()
    }
}

async fn create_user_with_flags(pool: &PgPool, is_admin: bool) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let marker = Uuid::new_v4().simple().to_string();
    let email = if is_admin {
        format!("testadmin_{marker}@example.com")
    } else {
        format!("testuser_{marker}@example.com")
    };

    let password_hash = password::hash_string(TEST_PASSWORD).expect("Failed to hash test password");

    let user = users_repo
        .create(&UserCreateDBRequest {
            email,
            is_admin,
            auth_source: "test".to_string(),
            password_hash: Some(password_hash),
        })
        .await
        .expect("Failed to create test user");

    UserResponse::from(user)
}

pub async fn create_test_user(pool: &PgPool) -> UserResponse {
    create_user_with_flags(pool, false).await
}

pub async fn create_test_admin_user(pool: &PgPool) -> UserResponse {
    create_user_with_flags(pool, true).await
}

/// Build a ready-to-send session cookie for a user, bypassing the login
/// endpoint.
pub fn session_cookie_for(user: &UserResponse) -> String {
    let config = create_test_config();
    let current_user = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
    };
    let token = session::create_session_token(&current_user, &config).expect("Failed to create session token");
    format!("session={token}")
}

/// Create an invite directly through the lifecycle, returning the plaintext
/// token.
pub async fn create_test_invite(pool: &PgPool, email: &str, created_by: UserId) -> String {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let invite = InviteLifecycle::new(&mut conn)
        .create_invite(email, created_by, std::time::Duration::from_secs(7 * 24 * 60 * 60))
        .await
        .expect("Failed to create test invite");
    invite.token
}
