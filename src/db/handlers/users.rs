//! Database repository for users.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::{
        roles::RoleDBResponse,
        users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub fullname: String,
    pub age: Option<i32>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl From<(Vec<RoleDBResponse>, User)> for UserDBResponse {
    fn from((roles, user): (Vec<RoleDBResponse>, User)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            age: user.age,
            image_path: user.image_path,
            is_active: user.is_active,
            password_hash: user.password_hash,
            roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, fullname, age, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.fullname)
        .bind(request.age)
        .bind(&request.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        // Assign roles; IDs that match no existing role are skipped rather
        // than failing the whole creation
        sqlx::query("INSERT INTO users_roles (user_id, role_id) SELECT $1, id FROM roles WHERE id = ANY($2)")
            .bind(user.id)
            .bind(&request.role_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let roles = self.roles_for(user.id).await?;
        Ok(UserDBResponse::from((roles, user)))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        if let Some(user) = user {
            let roles = self.roles_for(user.id).await?;
            Ok(Some(UserDBResponse::from((roles, user))))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.roles_for(user.id).await?;
            result.push(UserDBResponse::from((roles, user)));
        }

        Ok(result)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Touches the link table too, so the whole update runs in one transaction
        let user;
        {
            let mut tx = self.db.begin().await?;

            user = sqlx::query_as::<_, User>(
                r#"
                UPDATE users SET
                    username = COALESCE($2, username),
                    fullname = COALESCE($3, fullname),
                    age = COALESCE($4, age),
                    image_path = COALESCE($5, image_path),
                    is_active = COALESCE($6, is_active),
                    password_hash = COALESCE($7, password_hash),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(&request.username)
            .bind(&request.fullname)
            .bind(request.age)
            .bind(&request.image_path)
            .bind(request.is_active)
            .bind(&request.password_hash)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

            // Role assignments are replaced wholesale when provided
            if let Some(role_ids) = &request.role_ids {
                sqlx::query("DELETE FROM users_roles WHERE user_id = $1").bind(id).execute(&mut *tx).await?;

                sqlx::query("INSERT INTO users_roles (user_id, role_id) SELECT $1, id FROM roles WHERE id = ANY($2)")
                    .bind(id)
                    .bind(role_ids)
                    .execute(&mut *tx)
                    .await?;
            }

            tx.commit().await?;
        }

        let roles = self.roles_for(id).await?;
        Ok(UserDBResponse::from((roles, user)))
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    async fn roles_for(&mut self, id: UserId) -> Result<Vec<RoleDBResponse>> {
        let roles = sqlx::query_as::<_, RoleDBResponse>(
            r#"
            SELECT r.id, r.name, r.is_active
            FROM roles r
            JOIN users_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(roles)
    }

    #[instrument(skip(self, username), err)]
    pub async fn get_user_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        if let Some(user) = user {
            let roles = self.roles_for(user.id).await?;
            Ok(Some(UserDBResponse::from((roles, user))))
        } else {
            Ok(None)
        }
    }

    /// Overwrite the stored password hash.
    #[instrument(skip(self, password_hash), err)]
    pub async fn update_password(&mut self, id: UserId, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
