//! Invite token lifecycle: creation, validation, consumption.
//!
//! An invite moves through exactly one state machine:
//!
//! ```text
//! Pending ──consume──> Consumed   (terminal, persisted via consumed_at)
//!    │
//!    └──time passes──> Expired    (terminal, derived from expires_at, never persisted)
//! ```
//!
//! The lifecycle manager holds no in-memory state; everything lives in the
//! `invite_tokens` table and any number of callers may run these operations
//! concurrently. Authorization is the HTTP layer's job: by the time
//! [`InviteLifecycle::create_invite`] runs, the caller has already been
//! admitted by the admin gate and arrives as an explicit user id.
//!
//! Validation and consumption are deliberately separate operations - the
//! acceptance flow shows the invitee their target email before they commit.
//! That separation opens a time-of-check/time-of-use gap, which `consume`
//! closes by re-validating and then relying on the store's atomic
//! conditional update rather than on its own re-check.

use chrono::Utc;
use sqlx::PgConnection;
use thiserror::Error;
use tracing::instrument;

use crate::{
    crypto,
    db::{
        errors::DbError,
        handlers::{InviteTokens, Repository},
        models::invite_tokens::{InviteTokenCreateDBRequest, InviteTokenDBResponse},
    },
    types::{UserId, abbrev_uuid},
};

/// Why an invite operation was rejected.
///
/// Each variant maps to a distinct user-facing message; the invitee needs to
/// know whether to ask for a new invite, so a generic "something went wrong"
/// is never acceptable here.
#[derive(Error, Debug)]
pub enum InviteError {
    /// Malformed target email on creation; caller's fault, no retry implied.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Freshly generated token collided with an existing row even after a
    /// regeneration attempt. With 256 bits of entropy this is effectively
    /// unreachable; if it fires, something is wrong with the RNG.
    #[error("Invite token generation collided")]
    DuplicateToken,

    /// Token string does not match any record.
    #[error("Invalid invite link")]
    NotFound,

    /// Token matched but was already used.
    #[error("This invite was already used")]
    AlreadyConsumed,

    /// Token matched, unconsumed, but past its expiry.
    #[error("This invite has expired")]
    Expired,

    #[error(transparent)]
    Database(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, InviteError>;

/// Orchestrates invite state transitions against the invite store.
pub struct InviteLifecycle<'c> {
    db: &'c mut PgConnection,
}

impl<'c> InviteLifecycle<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Create a new invite for `email` (empty string for a generic QR-style
    /// invite), expiring `ttl` from now.
    ///
    /// The returned record carries the plaintext token - the only moment it
    /// leaves the core. It has to reach the invitee out-of-band (acceptance
    /// URL, QR code); it is not recoverable later.
    ///
    /// A token collision gets one transparent regeneration attempt before the
    /// error surfaces. Nothing is written on failure.
    #[instrument(skip(self, email), fields(created_by = %abbrev_uuid(&created_by)), err)]
    pub async fn create_invite(&mut self, email: &str, created_by: UserId, ttl: std::time::Duration) -> Result<InviteTokenDBResponse> {
        if !email.is_empty() && !is_plausible_email(email) {
            return Err(InviteError::InvalidEmail);
        }

        let expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(7));

        let mut attempts = 0;
        loop {
            let request = InviteTokenCreateDBRequest {
                email: email.to_string(),
                token: crypto::generate_invite_token(),
                expires_at,
                created_by,
            };

            let mut repo = InviteTokens::new(&mut *self.db);
            match repo.create(&request).await {
                Ok(invite) => return Ok(invite),
                Err(e) if e.is_invite_token_collision() && attempts == 0 => {
                    tracing::warn!("invite token collision, regenerating");
                    attempts += 1;
                }
                Err(e) if e.is_invite_token_collision() => return Err(InviteError::DuplicateToken),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Check whether a token is currently acceptable. Read-only; calling this
    /// any number of times changes nothing.
    ///
    /// Rejection reasons are checked in priority order: `NotFound`, then
    /// `AlreadyConsumed`, then `Expired`. A token that is both consumed and
    /// expired reports `AlreadyConsumed` - consumption is the more specific
    /// and more actionable failure for the invitee.
    #[instrument(skip_all)]
    pub async fn validate(&mut self, token: &str) -> Result<InviteTokenDBResponse> {
        let mut repo = InviteTokens::new(&mut *self.db);
        let invite = repo.find_by_token(token).await?.ok_or(InviteError::NotFound)?;

        if invite.consumed_at.is_some() {
            return Err(InviteError::AlreadyConsumed);
        }
        if invite.expires_at <= Utc::now() {
            return Err(InviteError::Expired);
        }

        Ok(invite)
    }

    /// Consume a token: re-validate, then mark it used.
    ///
    /// Re-validation closes the gap between the caller's earlier `validate`
    /// and this call, but the guarantee that at most one caller succeeds does
    /// NOT rest on it - it rests on the store's conditional update. If that
    /// update reports no row changed, another caller got there between our
    /// re-validation and our write, and this call fails with
    /// `AlreadyConsumed`.
    #[instrument(skip_all)]
    pub async fn consume(&mut self, token: &str) -> Result<InviteTokenDBResponse> {
        self.validate(token).await?;

        let mut repo = InviteTokens::new(&mut *self.db);
        repo.mark_consumed(token).await?.ok_or(InviteError::AlreadyConsumed)
    }
}

/// Just enough checking to reject obvious garbage. Real validation happened
/// in the admin's mail client when they typed the address.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.starts_with('.') && domain.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{
            handlers::Users,
            models::{invite_tokens::InviteTokenFilter, users::UserCreateDBRequest},
        },
        types::UserId,
    };
    use sqlx::PgPool;
    use std::time::Duration;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    async fn create_admin(pool: &PgPool) -> UserId {
        let mut conn = pool.acquire().await.expect("Failed to acquire connection");
        let mut users = Users::new(&mut conn);
        let user = users
            .create(&UserCreateDBRequest {
                email: format!("admin_{}@example.com", uuid::Uuid::new_v4().simple()),
                is_admin: true,
                auth_source: "test".to_string(),
                password_hash: None,
            })
            .await
            .expect("Failed to create admin");
        user.id
    }

    /// Push an invite's expiry into the past without touching anything else,
    /// simulating the passage of `days`.
    async fn age_invite(pool: &PgPool, token: &str, days: i64) {
        sqlx::query!(
            "UPDATE invite_tokens SET expires_at = expires_at - make_interval(days => $2::int), created_at = created_at - make_interval(days => $2::int) WHERE token = $1",
            token,
            days as i32
        )
        .execute(pool)
        .await
        .expect("Failed to age invite");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_round_trip(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let invite = InviteLifecycle::new(&mut conn)
            .create_invite("jane@example.com", admin, WEEK)
            .await
            .expect("create should succeed");
        assert_eq!(invite.email, "jane@example.com");
        assert_eq!(invite.created_by, admin);
        assert!(invite.consumed_at.is_none());

        // Valid, and the target email is visible to the acceptance flow
        let validated = InviteLifecycle::new(&mut conn).validate(&invite.token).await.expect("should be valid");
        assert_eq!(validated.email, "jane@example.com");

        let consumed = InviteLifecycle::new(&mut conn).consume(&invite.token).await.expect("consume should succeed");
        assert!(consumed.consumed_at.is_some());

        // Once consumed, validation reports AlreadyConsumed from then on
        let err = InviteLifecycle::new(&mut conn).validate(&invite.token).await.unwrap_err();
        assert!(matches!(err, InviteError::AlreadyConsumed));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_expiry_is_exactly_seven_days(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let before = Utc::now();
        let invite = InviteLifecycle::new(&mut conn).create_invite("a@example.com", admin, WEEK).await.unwrap();
        let after = Utc::now();

        let lower = before + chrono::Duration::days(7);
        let upper = after + chrono::Duration::days(7);
        assert!(invite.expires_at >= lower && invite.expires_at <= upper);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_expired_invite_rejected(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let invite = InviteLifecycle::new(&mut conn).create_invite("late@example.com", admin, WEEK).await.unwrap();

        // Eight days later...
        age_invite(&pool, &invite.token, 8).await;

        let err = InviteLifecycle::new(&mut conn).validate(&invite.token).await.unwrap_err();
        assert!(matches!(err, InviteError::Expired));

        // consume fails with the same reason, and leaves the row unconsumed
        let err = InviteLifecycle::new(&mut conn).consume(&invite.token).await.unwrap_err();
        assert!(matches!(err, InviteError::Expired));

        let row = InviteTokens::new(&mut conn).find_by_token(&invite.token).await.unwrap().unwrap();
        assert!(row.consumed_at.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_consumed_wins_over_expired(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let invite = InviteLifecycle::new(&mut conn).create_invite("both@example.com", admin, WEEK).await.unwrap();
        InviteLifecycle::new(&mut conn).consume(&invite.token).await.unwrap();
        age_invite(&pool, &invite.token, 8).await;

        // Consumed AND expired: the more specific reason wins
        let err = InviteLifecycle::new(&mut conn).validate(&invite.token).await.unwrap_err();
        assert!(matches!(err, InviteError::AlreadyConsumed));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_validate_is_idempotent(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let invite = InviteLifecycle::new(&mut conn).create_invite("idem@example.com", admin, WEEK).await.unwrap();

        for _ in 0..5 {
            let validated = InviteLifecycle::new(&mut conn).validate(&invite.token).await.expect("still valid");
            assert!(validated.consumed_at.is_none());
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_token(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let err = InviteLifecycle::new(&mut conn)
            .validate("nonexistent-token-string")
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_generic_invite(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        // QR-style invite: empty email is not an address, it's "anyone with
        // this code"
        let invite = InviteLifecycle::new(&mut conn).create_invite("", admin, WEEK).await.expect("generic invite");
        assert_eq!(invite.email, "");

        let validated = InviteLifecycle::new(&mut conn).validate(&invite.token).await.unwrap();
        assert_eq!(validated.email, "");

        InviteLifecycle::new(&mut conn).consume(&invite.token).await.expect("consumes like any other");
        let err = InviteLifecycle::new(&mut conn).consume(&invite.token).await.unwrap_err();
        assert!(matches!(err, InviteError::AlreadyConsumed));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_malformed_email_rejected(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        for bad in ["not-an-email", "@nodomain.com", "user@", "user@nodot"] {
            let err = InviteLifecycle::new(&mut conn).create_invite(bad, admin, WEEK).await.unwrap_err();
            assert!(matches!(err, InviteError::InvalidEmail), "{bad} should be rejected");
        }
    }

    /// The one concurrency-sensitive invariant: two racing consumers, exactly
    /// one winner.
    #[sqlx::test]
    #[test_log::test]
    async fn test_concurrent_consume_single_winner(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let invite = InviteLifecycle::new(&mut conn).create_invite("race@example.com", admin, WEEK).await.unwrap();
        drop(conn);

        let token_a = invite.token.clone();
        let token_b = invite.token.clone();
        let pool_a = pool.clone();
        let pool_b = pool.clone();

        let (a, b) = tokio::join!(
            tokio::spawn(async move {
                let mut conn = pool_a.acquire().await.unwrap();
                InviteLifecycle::new(&mut conn).consume(&token_a).await
            }),
            tokio::spawn(async move {
                let mut conn = pool_b.acquire().await.unwrap();
                InviteLifecycle::new(&mut conn).consume(&token_b).await
            }),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one concurrent consume must win (got {a:?}, {b:?})");

        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser.unwrap_err(), InviteError::AlreadyConsumed));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_listing_is_most_recent_first(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        for i in 0..3 {
            let invite = InviteLifecycle::new(&mut conn)
                .create_invite(&format!("u{i}@example.com"), admin, WEEK)
                .await
                .unwrap();
            // Space the rows out so created_at ordering is deterministic
            age_invite(&pool, &invite.token, (3 - i) as i64).await;
        }

        let listed = InviteTokens::new(&mut conn).list(&InviteTokenFilter::new(0, 2)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].email, "u2@example.com");
        assert_eq!(listed[1].email, "u1@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_prune_removes_only_expired_unconsumed(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let expired = InviteLifecycle::new(&mut conn).create_invite("old@example.com", admin, WEEK).await.unwrap();
        age_invite(&pool, &expired.token, 10).await;

        let consumed = InviteLifecycle::new(&mut conn).create_invite("used@example.com", admin, WEEK).await.unwrap();
        InviteLifecycle::new(&mut conn).consume(&consumed.token).await.unwrap();
        age_invite(&pool, &consumed.token, 10).await;

        let pending = InviteLifecycle::new(&mut conn).create_invite("new@example.com", admin, WEEK).await.unwrap();

        let removed = InviteTokens::new(&mut conn).delete_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);

        let mut repo = InviteTokens::new(&mut conn);
        assert!(repo.find_by_token(&expired.token).await.unwrap().is_none());
        // Consumed rows are history, not garbage
        assert!(repo.find_by_token(&consumed.token).await.unwrap().is_some());
        assert!(repo.find_by_token(&pending.token).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_count_pending(pool: PgPool) {
        let admin = create_admin(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let a = InviteLifecycle::new(&mut conn).create_invite("p1@example.com", admin, WEEK).await.unwrap();
        InviteLifecycle::new(&mut conn).create_invite("p2@example.com", admin, WEEK).await.unwrap();
        let gone = InviteLifecycle::new(&mut conn).create_invite("p3@example.com", admin, WEEK).await.unwrap();

        InviteLifecycle::new(&mut conn).consume(&a.token).await.unwrap();
        age_invite(&pool, &gone.token, 9).await;

        let pending = InviteTokens::new(&mut conn).count_pending().await.unwrap();
        assert_eq!(pending, 1);
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("jane@example.com"));
        assert!(is_plausible_email("a.b+c@sub.domain.org"));
        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("jane"));
        assert!(!is_plausible_email("jane@"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("jane@.com"));
    }
}
