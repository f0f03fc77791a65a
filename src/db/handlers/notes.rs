//! Database repository for notes.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::notes::{NoteCreateDBRequest, NoteDBResponse, NoteFilter, NoteUpdateDBRequest},
};
use crate::types::NoteId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Notes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Notes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Notes<'c> {
    type CreateRequest = NoteCreateDBRequest;
    type UpdateRequest = NoteUpdateDBRequest;
    type Response = NoteDBResponse;
    type Id = NoteId;
    type Filter = NoteFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let note = sqlx::query_as::<_, NoteDBResponse>(
            r#"
            INSERT INTO notes (title, detail, is_public, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.detail)
        .bind(request.is_public)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(note)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let note = sqlx::query_as::<_, NoteDBResponse>("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(note)
    }

    /// Archived notes never show up in listings; they stay reachable by id.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let notes = if let Some(user_id) = filter.visible_to {
            sqlx::query_as::<_, NoteDBResponse>(
                r#"
                SELECT * FROM notes
                WHERE (user_id = $1 OR is_public) AND NOT is_archived
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(user_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?
        } else {
            sqlx::query_as::<_, NoteDBResponse>(
                "SELECT * FROM notes WHERE NOT is_archived ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?
        };

        Ok(notes)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let note = sqlx::query_as::<_, NoteDBResponse>(
            r#"
            UPDATE notes SET
                title = COALESCE($2, title),
                detail = COALESCE($3, detail),
                is_public = COALESCE($4, is_public),
                is_archived = COALESCE($5, is_archived),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.detail)
        .bind(request.is_public)
        .bind(request.is_archived)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(note)
    }
}
