//! Authentication and authorization.
//!
//! Browser sessions are the only authentication method: users log in via
//! `/authentication/login` with email/password, and a JWT is stored in a
//! secure, HTTP-only cookie. Magic-link sign-in mails point users at the same
//! login flow once they have set a password.
//!
//! Authorization is two-tier: a caller either is an administrator or they are
//! not. The [`current_user::RequiresAdmin`] extractor gates every admin
//! route; talent-facing routes only require [`current_user`] extraction and
//! operate on the caller's own rows.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation, verification, cookie rendering

pub mod current_user;
pub mod password;
pub mod session;
