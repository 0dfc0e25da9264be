//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed CRUD operations, and returns domain models from
//! [`crate::db::models`]. All repositories implement the [`Repository`]
//! trait; entity-specific queries (token lookups, joins, counts) are inherent
//! methods on the same types.
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts and login lookup
//! - [`Profiles`]: Talent profiles, gallery listing, avatar upsert
//! - [`InviteTokens`]: Invite token records and the atomic consumption write
//! - [`Notes`]: Private admin notes on talent
//! - [`Photos`]: Uploaded photo records

pub mod invite_tokens;
pub mod notes;
pub mod photos;
pub mod profiles;
pub mod repository;
pub mod users;

pub use invite_tokens::InviteTokens;
pub use notes::Notes;
pub use photos::Photos;
pub use profiles::Profiles;
pub use repository::Repository;
pub use users::Users;
