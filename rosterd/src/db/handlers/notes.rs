//! Database repository for admin notes on talent.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::notes::{NoteCreateDBRequest, NoteDBResponse, NoteFilter, NoteUpdateDBRequest, NoteWithTalentDBResponse},
    },
    types::{NoteId, abbrev_uuid},
};

pub struct Notes<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Notes<'c> {
    type CreateRequest = NoteCreateDBRequest;
    type UpdateRequest = NoteUpdateDBRequest;
    type Response = NoteDBResponse;
    type Id = NoteId;
    type Filter = NoteFilter;

    #[instrument(skip(self, request), fields(admin = %abbrev_uuid(&request.admin_user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();

        let note = sqlx::query_as!(
            NoteDBResponse,
            r#"
            INSERT INTO notes (id, talent_user_id, admin_user_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, talent_user_id, admin_user_id, body, created_at, updated_at
            "#,
            id,
            request.talent_user_id,
            request.admin_user_id,
            request.body
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(note)
    }

    #[instrument(skip(self, id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let note = sqlx::query_as!(
            NoteDBResponse,
            "SELECT id, talent_user_id, admin_user_id, body, created_at, updated_at FROM notes WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(note)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let notes = sqlx::query_as!(
            NoteDBResponse,
            "SELECT id, talent_user_id, admin_user_id, body, created_at, updated_at FROM notes WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(notes.into_iter().map(|n| (n.id, n)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let notes = sqlx::query_as!(
            NoteDBResponse,
            r#"
            SELECT id, talent_user_id, admin_user_id, body, created_at, updated_at
            FROM notes
            WHERE ($1::uuid IS NULL OR admin_user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            filter.admin_user_id,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(notes)
    }

    #[instrument(skip(self, id, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let note = sqlx::query_as!(
            NoteDBResponse,
            r#"
            UPDATE notes
            SET body = COALESCE($2, body), updated_at = NOW()
            WHERE id = $1
            RETURNING id, talent_user_id, admin_user_id, body, created_at, updated_at
            "#,
            id,
            request.body
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(note)
    }

    #[instrument(skip(self, id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM notes WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Notes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Notes joined with the talent's profile card, for the notes manager.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list_with_talent(&mut self, filter: &NoteFilter) -> Result<Vec<NoteWithTalentDBResponse>> {
        let rows = sqlx::query!(
            r#"
            SELECT n.id, n.talent_user_id, n.admin_user_id, n.body, n.created_at, n.updated_at,
                   p.display_name AS "talent_display_name?", p.avatar_url AS "talent_avatar_url?"
            FROM notes n
            LEFT JOIN profiles p ON p.user_id = n.talent_user_id
            WHERE ($1::uuid IS NULL OR n.admin_user_id = $1)
            ORDER BY n.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            filter.admin_user_id,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| NoteWithTalentDBResponse {
                note: NoteDBResponse {
                    id: r.id,
                    talent_user_id: r.talent_user_id,
                    admin_user_id: r.admin_user_id,
                    body: r.body,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                talent_display_name: r.talent_display_name,
                talent_avatar_url: r.talent_avatar_url,
            })
            .collect())
    }

    /// Total note count for the admin dashboard.
    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar!("SELECT COUNT(*) FROM notes").fetch_one(&mut *self.db).await?;

        Ok(count.unwrap_or(0))
    }
}
