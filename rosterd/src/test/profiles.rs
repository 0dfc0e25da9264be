//! Profile and gallery tests: own-profile CRUD, public visibility, admin
//! talent management.

use serde_json::json;
use sqlx::PgPool;

use crate::{
    api::models::profiles::{GalleryProfileResponse, ProfileResponse, TalentResponse},
    test_utils::*,
};

#[sqlx::test]
#[test_log::test]
async fn test_own_profile_round_trip(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;
    let cookie = session_cookie_for(&user);

    // Nothing yet
    let response = server.get("/api/v1/profile").add_header("cookie", cookie.clone()).await;
    assert_eq!(response.status_code().as_u16(), 404);

    // Onboarding form submission
    let response = server
        .put("/api/v1/profile")
        .add_header("cookie", cookie.clone())
        .json(&json!({
            "display_name": "Jane Doe",
            "bio": "Aspiring actress",
            "hobbies": ["Acting", "Photography"],
            "social_links": {"instagram": "https://instagram.com/janedoe"},
            "is_public": false
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let profile: ProfileResponse = response.json();
    assert_eq!(profile.display_name, "Jane Doe");
    assert_eq!(profile.user_id, user.id);
    assert!(!profile.is_public);

    // Partial update keeps everything else
    let response = server
        .patch("/api/v1/profile")
        .add_header("cookie", cookie.clone())
        .json(&json!({"bio": "Working actress", "is_public": true}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let updated: ProfileResponse = response.json();
    assert_eq!(updated.bio.as_deref(), Some("Working actress"));
    assert_eq!(updated.display_name, "Jane Doe");
    assert!(updated.is_public);

    let response = server.get("/api/v1/profile").add_header("cookie", cookie).await;
    assert_eq!(response.status_code().as_u16(), 200);
}

#[sqlx::test]
#[test_log::test]
async fn test_profile_validation(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;
    let cookie = session_cookie_for(&user);

    // Display name too short
    let response = server
        .put("/api/v1/profile")
        .add_header("cookie", cookie.clone())
        .json(&json!({"display_name": "J"}))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);

    // Too many hobbies
    let hobbies: Vec<String> = (0..11).map(|i| format!("hobby-{i}")).collect();
    let response = server
        .put("/api/v1/profile")
        .add_header("cookie", cookie)
        .json(&json!({"display_name": "Jane Doe", "hobbies": hobbies}))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);
}

#[sqlx::test]
#[test_log::test]
async fn test_gallery_shows_only_public_profiles(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;

    let visible = create_test_user(&pool).await;
    let hidden = create_test_user(&pool).await;

    server
        .put("/api/v1/profile")
        .add_header("cookie", session_cookie_for(&visible))
        .json(&json!({"display_name": "On Display", "is_public": true}))
        .await
        .assert_status_ok();
    server
        .put("/api/v1/profile")
        .add_header("cookie", session_cookie_for(&hidden))
        .json(&json!({"display_name": "Private Person", "is_public": false}))
        .await
        .assert_status_ok();

    // No auth required for the gallery
    let response = server.get("/api/v1/gallery").await;
    assert_eq!(response.status_code().as_u16(), 200);
    let gallery: Vec<GalleryProfileResponse> = response.json();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0].display_name, "On Display");
}

#[sqlx::test]
#[test_log::test]
async fn test_admin_talent_management(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let admin = create_test_admin_user(&pool).await;
    let talent = create_test_user(&pool).await;

    server
        .put("/api/v1/profile")
        .add_header("cookie", session_cookie_for(&talent))
        .json(&json!({"display_name": "Jane Doe", "is_public": false}))
        .await
        .assert_status_ok();

    // Talent listing includes owner info
    let response = server
        .get("/admin/api/v1/talent")
        .add_header("cookie", session_cookie_for(&admin))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let listing: Vec<TalentResponse> = response.json();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].owner_email, talent.email);
    let profile_id = listing[0].profile.id;

    // Admin publishes the profile
    let response = server
        .patch(&format!("/admin/api/v1/talent/{profile_id}"))
        .add_header("cookie", session_cookie_for(&admin))
        .json(&json!({"is_public": true}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let updated: ProfileResponse = response.json();
    assert!(updated.is_public);

    // Non-admins are locked out
    let response = server
        .get("/admin/api/v1/talent")
        .add_header("cookie", session_cookie_for(&talent))
        .await;
    assert_eq!(response.status_code().as_u16(), 403);

    // Delete removes the profile but not the user
    let response = server
        .delete(&format!("/admin/api/v1/talent/{profile_id}"))
        .add_header("cookie", session_cookie_for(&admin))
        .await;
    assert_eq!(response.status_code().as_u16(), 204);

    let response = server
        .get("/api/v1/profile")
        .add_header("cookie", session_cookie_for(&talent))
        .await;
    assert_eq!(response.status_code().as_u16(), 404);
}
