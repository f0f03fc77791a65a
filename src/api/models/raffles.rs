//! Raffle API models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::{check_max, check_required};
use crate::db::models::raffles::{RaffleCreateDBRequest, RaffleDBResponse, RaffleEntryDBResponse, RaffleUpdateDBRequest};
use crate::errors::Error;
use crate::types::{RaffleId, UserId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RaffleCreate {
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

impl RaffleCreate {
    pub fn validate(&self) -> Result<(), Error> {
        check_required("title", &self.title, 32)?;
        check_max("detail", &self.detail, 256)
    }

    pub fn into_db_request(self, user_id: UserId) -> RaffleCreateDBRequest {
        RaffleCreateDBRequest {
            title: self.title,
            detail: self.detail,
            user_id,
        }
    }
}

/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RaffleUpdate {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub is_open: Option<bool>,
}

impl RaffleUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            check_required("title", title, 32)?;
        }
        if let Some(detail) = &self.detail {
            check_max("detail", detail, 256)?;
        }
        Ok(())
    }
}

impl From<RaffleUpdate> for RaffleUpdateDBRequest {
    fn from(update: RaffleUpdate) -> Self {
        Self {
            title: update.title,
            detail: update.detail,
            is_open: update.is_open,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RaffleResponse {
    pub id: RaffleId,
    pub title: String,
    pub detail: String,
    pub is_open: bool,
    pub user_id: UserId,
    pub winner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl From<RaffleDBResponse> for RaffleResponse {
    fn from(raffle: RaffleDBResponse) -> Self {
        Self {
            id: raffle.id,
            title: raffle.title,
            detail: raffle.detail,
            is_open: raffle.is_open,
            user_id: raffle.user_id,
            winner_id: raffle.winner_id,
            created_at: raffle.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RaffleEntryResponse {
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<RaffleEntryDBResponse> for RaffleEntryResponse {
    fn from(entry: RaffleEntryDBResponse) -> Self {
        Self {
            user_id: entry.user_id,
            username: entry.username,
            created_at: entry.created_at,
        }
    }
}
