//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, logout, set-password
//! - **Talent API** (`/api/v1/*`): Own profile, avatar upload, `/me`
//! - **Public API** (`/api/v1/gallery*`, `/api/v1/invites/{token}/*`):
//!   Gallery browsing and invite acceptance
//! - **Admin API** (`/admin/api/v1/*`): Invites, talent, notes, photos,
//!   dashboard
//! - **Files** (`/files/*`): Uploaded objects served from local storage
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/admin/docs` when the server is running.

pub mod handlers;
pub mod models;
