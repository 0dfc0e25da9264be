//! Admin dashboard: aggregate counts across the system.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        dashboard::{DashboardResponse, DashboardStats},
        users::UserResponse,
    },
    auth::current_user::RequiresAdmin,
    db::handlers::{InviteTokens, Notes, Profiles, Repository, Users},
    errors::{Error, Result},
};

#[utoipa::path(
    get,
    path = "/admin/api/v1/dashboard",
    tag = "dashboard",
    summary = "Admin dashboard stats",
    responses(
        (status = 200, description = "Aggregate counts", body = DashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn dashboard(State(state): State<AppState>, RequiresAdmin(admin): RequiresAdmin) -> Result<Json<DashboardResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let admin_user = Users::new(&mut conn).get_by_id(admin.id).await?.ok_or_else(|| Error::Unauthenticated {
        message: Some("User not found".to_string()),
    })?;

    let total_users = Users::new(&mut conn).count().await?;
    let (total_profiles, public_profiles) = Profiles::new(&mut conn).counts().await?;
    let pending_invites = InviteTokens::new(&mut conn).count_pending().await?;
    let total_notes = Notes::new(&mut conn).count().await?;

    Ok(Json(DashboardResponse {
        admin: UserResponse::from(admin_user),
        stats: DashboardStats {
            total_users,
            total_profiles,
            public_profiles,
            pending_invites,
            total_notes,
        },
    }))
}
