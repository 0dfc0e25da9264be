//! # rosterd: a self-hostable talent portfolio platform
//!
//! `rosterd` serves a small talent-portfolio application: invite-only user
//! onboarding, a public talent gallery, profile management for signed-in
//! talent, and admin tooling for invites, talent, notes, and photo uploads.
//! It is a CRUD application over PostgreSQL with local-filesystem file
//! storage, served as a single Axum binary.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence.
//!
//! The **API layer** ([`api`]) exposes three surfaces: authentication routes
//! at `/authentication/*`, the talent-facing API at `/api/v1/*` (own profile,
//! avatar upload, public gallery, invite acceptance), and the management API
//! at `/admin/api/v1/*` (invites, talent, notes, photos, dashboard). Uploaded
//! files are served read-only under `/files/*`.
//!
//! The **authentication layer** ([`auth`]) handles session-based
//! authentication with JWTs in HTTP-only cookies, Argon2 password hashing,
//! and the admin authorization gate used by the management API.
//!
//! The **database layer** ([`db`]) uses the repository pattern to abstract
//! data access. Each entity (users, profiles, invite tokens, notes, photos)
//! has a corresponding repository that handles queries and mutations.
//!
//! The **invite lifecycle** ([`invites`]) is the one real state machine in
//! the system: single-use, seven-day tokens whose consumption is enforced
//! with an atomic conditional update so concurrent acceptances cannot both
//! succeed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use rosterd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = rosterd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     rosterd::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
mod crypto;
pub mod db;
mod email;
pub mod errors;
pub mod invites;
mod openapi;
mod qr;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod test;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{self, HeaderValue},
    routing::{get, patch, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    auth::password,
    config::CorsOrigin,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    openapi::ApiDoc,
    storage::{StorageBackend, local::LocalStorage},
};

pub use config::Config;
pub use types::{InviteTokenId, NoteId, PhotoId, ProfileId, UserId};

/// Application state shared across all request handlers.
///
/// Contains the database pool, loaded configuration, and the upload storage
/// backend.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub storage: Arc<dyn StorageBackend>,
}

/// Get the rosterd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin on first startup, or refreshes the password
/// if one is supplied and the user already exists. This guarantees there is
/// always an account that can mint invites.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if password_hash.is_some() {
            user_repo
                .update(
                    existing_user.id,
                    &UserUpdateDBRequest {
                        password_hash,
                        is_admin: Some(true),
                    },
                )
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            is_admin: true,
            auth_source: "system".to_string(),
            password_hash,
        })
        .await?;

    tx.commit().await?;
    Ok(created_user.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard(_) => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// - Authentication routes (login, logout, set-password)
/// - Talent API (own profile, avatar upload, gallery, invite acceptance)
/// - Admin API (invites, talent, notes, photos, dashboard)
/// - Uploaded-file serving
/// - OpenAPI docs, CORS, tracing, optional Prometheus metrics
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.storage.max_upload_bytes;

    // Authentication routes at root level
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/set-password", post(api::handlers::auth::set_password))
        .with_state(state.clone());

    // Talent-facing and public API
    let app_routes = Router::new()
        .route("/me", get(api::handlers::auth::me))
        .route(
            "/profile",
            get(api::handlers::profiles::get_my_profile)
                .put(api::handlers::profiles::put_my_profile)
                .patch(api::handlers::profiles::patch_my_profile),
        )
        .route(
            "/uploads/avatar",
            post(api::handlers::uploads::upload_avatar).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/gallery", get(api::handlers::gallery::list_gallery))
        .route("/gallery/photos", get(api::handlers::gallery::list_gallery_photos))
        // Invite acceptance is public: the invitee has no session yet
        .route("/invites/{token}/validate", get(api::handlers::invites::validate_invite))
        .route("/invites/{token}/consume", post(api::handlers::invites::consume_invite))
        .with_state(state.clone());

    // Management API; every handler here runs behind the admin gate
    let admin_routes = Router::new()
        .route("/dashboard", get(api::handlers::dashboard::dashboard))
        .route(
            "/invites",
            get(api::handlers::invites::list_invites).post(api::handlers::invites::create_invite),
        )
        .route("/invites/qr", post(api::handlers::invites::create_qr_invite))
        .route("/invites/prune", post(api::handlers::invites::prune_invites))
        .route("/talent", get(api::handlers::profiles::list_talent))
        .route(
            "/talent/{profile_id}",
            patch(api::handlers::profiles::update_talent).delete(api::handlers::profiles::delete_talent),
        )
        .route(
            "/notes",
            get(api::handlers::notes::list_notes).post(api::handlers::notes::create_note),
        )
        .route(
            "/notes/{note_id}",
            patch(api::handlers::notes::update_note).delete(api::handlers::notes::delete_note),
        )
        .route(
            "/photos",
            get(api::handlers::photos::list_photos)
                .post(api::handlers::photos::upload_photo)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/photos/{photo_id}",
            patch(api::handlers::photos::update_photo).delete(api::handlers::photos::delete_photo),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", app_routes)
        .nest("/admin/api/v1", admin_routes)
        // Uploaded objects, served read-only from the storage root
        .nest_service("/files", ServeDir::new(&state.config.storage.uploads_dir))
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, seeds the initial admin user, and prepares storage
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
/// 3. **Shutdown**: on the shutdown signal, drains and closes the pool
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application around an existing pool (used by tests, where
    /// the harness owns the database and has already run migrations).
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting rosterd with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => {
                let settings = &config.database.pool;
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .min_connections(settings.min_connections)
                    .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
                    .idle_timeout((settings.idle_timeout_secs > 0).then(|| std::time::Duration::from_secs(settings.idle_timeout_secs)))
                    .connect(&config.database.url)
                    .await?;
                migrator().run(&pool).await?;
                pool
            }
        };

        // Ensure there is always an account that can mint invites
        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        // Prepare the uploads root so ServeDir has something to serve
        std::fs::create_dir_all(&config.storage.uploads_dir)?;
        let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(config.storage.uploads_dir.clone(), config.public_url.clone()));

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).storage(storage).build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "rosterd listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
