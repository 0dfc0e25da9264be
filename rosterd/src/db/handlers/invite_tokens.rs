//! Database repository for invite tokens.
//!
//! This is the durable side of the invite lifecycle. The state-transition
//! rules (what counts as valid, which rejection wins) live in
//! [`crate::invites`]; this layer only guarantees that writes are safe to run
//! concurrently. In particular [`InviteTokens::mark_consumed`] is a single
//! conditional update so that two racing consumers can never both succeed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::invite_tokens::{
            InviteToken, InviteTokenCreateDBRequest, InviteTokenDBResponse, InviteTokenFilter, InviteTokenUpdateDBRequest,
        },
    },
    types::InviteTokenId,
};

pub struct InviteTokens<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for InviteTokens<'c> {
    type CreateRequest = InviteTokenCreateDBRequest;
    type UpdateRequest = InviteTokenUpdateDBRequest;
    type Response = InviteTokenDBResponse;
    type Id = InviteTokenId;
    type Filter = InviteTokenFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = uuid::Uuid::new_v4();

        // A token collision hits the invite_tokens_token_key constraint and
        // surfaces as DbError::UniqueViolation. It must never be absorbed
        // here: the lifecycle layer decides whether to retry.
        let invite = sqlx::query_as!(
            InviteToken,
            r#"
            INSERT INTO invite_tokens (id, email, token, expires_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, token, expires_at, consumed_at, created_at, created_by
            "#,
            id,
            request.email,
            request.token,
            request.expires_at,
            request.created_by
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(invite)
    }

    #[instrument(skip(self, id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let invite = sqlx::query_as!(
            InviteToken,
            "SELECT id, email, token, expires_at, consumed_at, created_at, created_by FROM invite_tokens WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(invite)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let invites = sqlx::query_as!(
            InviteToken,
            "SELECT id, email, token, expires_at, consumed_at, created_at, created_by FROM invite_tokens WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(invites.into_iter().map(|i| (i.id, i)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let invites = sqlx::query_as!(
            InviteToken,
            r#"
            SELECT id, email, token, expires_at, consumed_at, created_at, created_by
            FROM invite_tokens
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(invites)
    }

    #[instrument(skip(self, id, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // COALESCE keeps an already-set consumed_at in place: the column is
        // written at most once for the lifetime of the row.
        let invite = sqlx::query_as!(
            InviteToken,
            r#"
            UPDATE invite_tokens
            SET consumed_at = COALESCE(consumed_at, $2)
            WHERE id = $1
            RETURNING id, email, token, expires_at, consumed_at, created_at, created_by
            "#,
            id,
            request.consumed_at
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(invite)
    }

    #[instrument(skip(self, id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM invite_tokens WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> InviteTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Exact-match lookup by the external-facing token string.
    #[instrument(skip(self, token), err)]
    pub async fn find_by_token(&mut self, token: &str) -> Result<Option<InviteTokenDBResponse>> {
        let invite = sqlx::query_as!(
            InviteToken,
            "SELECT id, email, token, expires_at, consumed_at, created_at, created_by FROM invite_tokens WHERE token = $1",
            token
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(invite)
    }

    /// Mark a token consumed, if and only if it has not been consumed yet.
    ///
    /// This is the single atomic conditional write that makes consumption
    /// race-free: `WHERE consumed_at IS NULL` means that of any number of
    /// concurrent callers, exactly one gets the row back. `None` tells the
    /// caller the row was already consumed (or never existed) - never a
    /// silent success.
    #[instrument(skip(self, token), err)]
    pub async fn mark_consumed(&mut self, token: &str) -> Result<Option<InviteTokenDBResponse>> {
        let invite = sqlx::query_as!(
            InviteToken,
            r#"
            UPDATE invite_tokens
            SET consumed_at = NOW()
            WHERE token = $1 AND consumed_at IS NULL
            RETURNING id, email, token, expires_at, consumed_at, created_at, created_by
            "#,
            token
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(invite)
    }

    /// Count invites that are still pending (unconsumed and unexpired).
    #[instrument(skip(self), err)]
    pub async fn count_pending(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar!("SELECT COUNT(*) FROM invite_tokens WHERE consumed_at IS NULL AND expires_at > NOW()")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count.unwrap_or(0))
    }

    /// Remove expired, unconsumed invites that expired before `cutoff`.
    ///
    /// Nothing calls this automatically. Expired rows are inert and stay
    /// behind as history; pruning is an explicit maintenance operation.
    /// Consumed rows are kept regardless of age - they record that an
    /// onboarding actually happened.
    #[instrument(skip(self), err)]
    pub async fn delete_expired(&mut self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query!(
            "DELETE FROM invite_tokens WHERE consumed_at IS NULL AND expires_at < $1",
            cutoff
        )
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
