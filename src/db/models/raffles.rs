//! Raffle persistence models.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{RaffleId, UserId};

#[derive(Debug, Clone)]
pub struct RaffleCreateDBRequest {
    pub title: String,
    pub detail: String,
    pub user_id: UserId,
}

/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RaffleUpdateDBRequest {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RaffleDBResponse {
    pub id: RaffleId,
    pub title: String,
    pub detail: String,
    pub is_open: bool,
    pub user_id: UserId,
    pub winner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// One participant's entry in a raffle, with the username joined in for
/// display.
#[derive(Debug, Clone, FromRow)]
pub struct RaffleEntryDBResponse {
    pub raffle_id: RaffleId,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
