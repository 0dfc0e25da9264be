//! HTTP request handlers for all API endpoints.
//!
//! Handlers deserialize and validate requests, run the authorization
//! extractors, execute business logic through the database repositories, and
//! serialize responses. Errors return [`crate::errors::Error`], which
//! converts to the right status code and a user-safe message.
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, logout, set-password, current user
//! - [`dashboard`]: Admin aggregate counts
//! - [`gallery`]: Public profile and photo listings
//! - [`invites`]: Invite creation, listing, validation, consumption, pruning
//! - [`notes`]: Private admin notes on talent
//! - [`photos`]: Admin photo upload and management
//! - [`profiles`]: Own-profile CRUD and the admin talent manager
//! - [`uploads`]: Avatar upload

pub mod auth;
pub mod dashboard;
pub mod gallery;
pub mod invites;
pub mod notes;
pub mod photos;
pub mod profiles;
pub mod uploads;
