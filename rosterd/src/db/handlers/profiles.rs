//! Database repository for talent profiles.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::profiles::{
            ProfileCreateDBRequest, ProfileDBResponse, ProfileFilter, ProfileUpdateDBRequest, ProfileWithOwnerDBResponse,
        },
    },
    types::{ProfileId, UserId, abbrev_uuid},
};

pub struct Profiles<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Profiles<'c> {
    type CreateRequest = ProfileCreateDBRequest;
    type UpdateRequest = ProfileUpdateDBRequest;
    type Response = ProfileDBResponse;
    type Id = ProfileId;
    type Filter = ProfileFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();

        // One profile per user: a second create for the same user replaces
        // the profile contents instead of failing, which is what the
        // onboarding form needs when it is resubmitted.
        let profile = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            INSERT INTO profiles (id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                bio = EXCLUDED.bio,
                hobbies = EXCLUDED.hobbies,
                social_links = EXCLUDED.social_links,
                avatar_url = EXCLUDED.avatar_url,
                is_public = EXCLUDED.is_public,
                updated_at = NOW()
            RETURNING id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            "#,
            id,
            request.user_id,
            request.display_name,
            request.bio,
            &request.hobbies,
            request.social_links,
            request.avatar_url,
            request.is_public
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(profile)
    }

    #[instrument(skip(self, id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let profile = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            SELECT id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            FROM profiles WHERE id = $1
            "#,
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(profile)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let profiles = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            SELECT id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            FROM profiles WHERE id = ANY($1)
            "#,
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip, public_only = filter.public_only), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let profiles = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            SELECT id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            FROM profiles
            WHERE (NOT $1 OR is_public)
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
            filter.public_only,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(profiles)
    }

    #[instrument(skip(self, id, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let profile = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            UPDATE profiles
            SET display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                hobbies = COALESCE($4, hobbies),
                social_links = COALESCE($5, social_links),
                avatar_url = COALESCE($6, avatar_url),
                is_public = COALESCE($7, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            "#,
            id,
            request.display_name,
            request.bio,
            request.hobbies.as_deref(),
            request.social_links,
            request.avatar_url,
            request.is_public
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(profile)
    }

    #[instrument(skip(self, id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM profiles WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Profiles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch the profile owned by a user, if they have created one.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_by_user_id(&mut self, user_id: UserId) -> Result<Option<ProfileDBResponse>> {
        let profile = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            SELECT id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            FROM profiles WHERE user_id = $1
            "#,
            user_id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(profile)
    }

    /// Set a user's avatar, creating a minimal private profile if they have
    /// not finished onboarding yet (the upload can arrive first).
    #[instrument(skip(self, avatar_url), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn set_avatar(&mut self, user_id: UserId, avatar_url: &str, default_display_name: &str) -> Result<ProfileDBResponse> {
        let id = Uuid::new_v4();
        let profile = sqlx::query_as!(
            ProfileDBResponse,
            r#"
            INSERT INTO profiles (id, user_id, display_name, avatar_url, is_public)
            VALUES ($1, $2, $3, $4, FALSE)
            ON CONFLICT (user_id) DO UPDATE SET
                avatar_url = EXCLUDED.avatar_url,
                updated_at = NOW()
            RETURNING id, user_id, display_name, bio, hobbies, social_links, avatar_url, is_public, created_at, updated_at
            "#,
            id,
            user_id,
            default_display_name,
            avatar_url
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(profile)
    }

    /// All profiles joined with their owner, most recently updated first.
    /// Backs the admin talent manager.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list_with_owner(&mut self, filter: &ProfileFilter) -> Result<Vec<ProfileWithOwnerDBResponse>> {
        let rows = sqlx::query!(
            r#"
            SELECT p.id, p.user_id, p.display_name, p.bio, p.hobbies, p.social_links, p.avatar_url,
                   p.is_public, p.created_at, p.updated_at,
                   u.email AS owner_email, u.created_at AS owner_created_at
            FROM profiles p
            INNER JOIN users u ON p.user_id = u.id
            WHERE (NOT $1 OR p.is_public)
            ORDER BY p.updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
            filter.public_only,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProfileWithOwnerDBResponse {
                profile: ProfileDBResponse {
                    id: r.id,
                    user_id: r.user_id,
                    display_name: r.display_name,
                    bio: r.bio,
                    hobbies: r.hobbies,
                    social_links: r.social_links,
                    avatar_url: r.avatar_url,
                    is_public: r.is_public,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                owner_email: r.owner_email,
                owner_created_at: r.owner_created_at,
            })
            .collect())
    }

    /// Profile counts for the admin dashboard: (total, public).
    #[instrument(skip(self), err)]
    pub async fn counts(&mut self) -> Result<(i64, i64)> {
        let row = sqlx::query!(
            r#"SELECT COUNT(*) AS "total!", COUNT(*) FILTER (WHERE is_public) AS "public_count!" FROM profiles"#
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok((row.total, row.public_count))
    }
}
