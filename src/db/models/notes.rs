//! Note persistence models.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{NoteId, UserId};

#[derive(Debug, Clone)]
pub struct NoteCreateDBRequest {
    pub title: String,
    pub detail: String,
    pub is_public: bool,
    pub user_id: UserId,
}

/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdateDBRequest {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub is_public: Option<bool>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NoteDBResponse {
    pub id: NoteId,
    pub title: String,
    pub detail: String,
    pub is_public: bool,
    pub is_archived: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which notes a list query should return.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteFilter {
    /// When set, restrict to notes owned by this user or marked public.
    /// `None` means no visibility restriction (manager listings).
    pub visible_to: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}
