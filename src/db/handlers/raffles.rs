//! Database repository for raffles and their entries.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::raffles::{RaffleCreateDBRequest, RaffleDBResponse, RaffleEntryDBResponse, RaffleUpdateDBRequest},
};
use crate::types::{RaffleId, UserId};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing raffles
#[derive(Debug, Clone)]
pub struct RaffleFilter {
    pub skip: i64,
    pub limit: i64,
}

impl RaffleFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Raffles<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Raffles<'c> {
    type CreateRequest = RaffleCreateDBRequest;
    type UpdateRequest = RaffleUpdateDBRequest;
    type Response = RaffleDBResponse;
    type Id = RaffleId;
    type Filter = RaffleFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let raffle = sqlx::query_as::<_, RaffleDBResponse>(
            r#"
            INSERT INTO raffles (title, detail, user_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.detail)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(raffle)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let raffle = sqlx::query_as::<_, RaffleDBResponse>("SELECT * FROM raffles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(raffle)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let raffles = sqlx::query_as::<_, RaffleDBResponse>("SELECT * FROM raffles ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(raffles)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM raffles WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let raffle = sqlx::query_as::<_, RaffleDBResponse>(
            r#"
            UPDATE raffles SET
                title = COALESCE($2, title),
                detail = COALESCE($3, detail),
                is_open = COALESCE($4, is_open)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.detail)
        .bind(request.is_open)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(raffle)
    }
}

impl<'c> Raffles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Enter a user into a raffle. The raffle's open state is checked in the
    /// same statement as the insert, so an entry can never land in a raffle
    /// that closed after the caller last looked at it. Returns false when the
    /// raffle is closed. Entering twice violates the entries primary key and
    /// surfaces as a unique violation.
    #[instrument(skip(self), err)]
    pub async fn add_entry(&mut self, raffle_id: RaffleId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO raffle_entries (raffle_id, user_id)
            SELECT $1, $2
            WHERE EXISTS (SELECT 1 FROM raffles WHERE id = $1 AND is_open)
            "#,
        )
        .bind(raffle_id)
        .bind(user_id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn list_entries(&mut self, raffle_id: RaffleId) -> Result<Vec<RaffleEntryDBResponse>> {
        let entries = sqlx::query_as::<_, RaffleEntryDBResponse>(
            r#"
            SELECT e.raffle_id, e.user_id, u.username, e.created_at
            FROM raffle_entries e
            JOIN users u ON u.id = e.user_id
            WHERE e.raffle_id = $1
            ORDER BY e.created_at
            "#,
        )
        .bind(raffle_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(entries)
    }

    /// Record the winner and close the raffle in one statement.
    ///
    /// The `is_open` guard makes the transition once-only: of two concurrent
    /// draws, exactly one matches the row and the other gets `None` instead
    /// of overwriting the recorded winner.
    #[instrument(skip(self), err)]
    pub async fn set_winner(&mut self, raffle_id: RaffleId, winner_id: UserId) -> Result<Option<RaffleDBResponse>> {
        let raffle = sqlx::query_as::<_, RaffleDBResponse>(
            "UPDATE raffles SET winner_id = $2, is_open = FALSE WHERE id = $1 AND is_open RETURNING *",
        )
        .bind(raffle_id)
        .bind(winner_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(raffle)
    }
}
