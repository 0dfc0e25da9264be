//! OpenAPI documentation configuration.
//!
//! One document covers all three surfaces (authentication, talent API, admin
//! API); paths are declared absolute in the handler annotations so the
//! rendered doc matches the mounted routes exactly.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKeyValue, SecurityScheme},
};

use crate::api::{handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::set_password,
        handlers::auth::me,
        handlers::profiles::get_my_profile,
        handlers::profiles::put_my_profile,
        handlers::profiles::patch_my_profile,
        handlers::profiles::list_talent,
        handlers::profiles::update_talent,
        handlers::profiles::delete_talent,
        handlers::uploads::upload_avatar,
        handlers::gallery::list_gallery,
        handlers::gallery::list_gallery_photos,
        handlers::invites::list_invites,
        handlers::invites::create_invite,
        handlers::invites::create_qr_invite,
        handlers::invites::prune_invites,
        handlers::invites::validate_invite,
        handlers::invites::consume_invite,
        handlers::notes::list_notes,
        handlers::notes::create_note,
        handlers::notes::update_note,
        handlers::notes::delete_note,
        handlers::photos::list_photos,
        handlers::photos::upload_photo,
        handlers::photos::update_photo,
        handlers::photos::delete_photo,
        handlers::dashboard::dashboard,
    ),
    components(schemas(
        models::auth::LoginRequest,
        models::auth::AuthResponse,
        models::auth::AuthSuccessResponse,
        models::auth::SetPasswordRequest,
        models::auth::MeResponse,
        models::users::UserResponse,
        models::users::CurrentUser,
        models::profiles::ProfileCreate,
        models::profiles::ProfileUpdate,
        models::profiles::ProfileResponse,
        models::profiles::TalentResponse,
        models::profiles::GalleryProfileResponse,
        models::invites::InviteStatus,
        models::invites::InviteCreate,
        models::invites::InviteResponse,
        models::invites::InviteCreatedResponse,
        models::invites::QrInviteResponse,
        models::invites::InviteValidationResponse,
        models::invites::InviteConsumedResponse,
        models::invites::InvitePruneResponse,
        models::notes::NoteCreate,
        models::notes::NoteUpdate,
        models::notes::NoteResponse,
        models::photos::PhotoResponse,
        models::photos::PhotoUpdate,
        models::photos::AvatarUploadResponse,
        models::dashboard::DashboardStats,
        models::dashboard::DashboardResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Login, logout, password management"),
        (name = "profiles", description = "Own-profile management"),
        (name = "gallery", description = "Public talent gallery"),
        (name = "invites", description = "Invite lifecycle"),
        (name = "talent", description = "Admin talent management"),
        (name = "notes", description = "Private admin notes"),
        (name = "photos", description = "Admin photo management"),
        (name = "uploads", description = "File uploads"),
        (name = "dashboard", description = "Admin dashboard"),
    ),
    info(
        title = "rosterd",
        description = "Talent portfolio platform with invite-only onboarding"
    )
)]
pub struct ApiDoc;

/// Registers the session-cookie security scheme referenced by the handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("CookieAuth", SecurityScheme::ApiKey(utoipa::openapi::security::ApiKey::Cookie(ApiKeyValue::new("session"))));
        }
    }
}
