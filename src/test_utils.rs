//! Shared fixtures for unit tests.

use chrono::Utc;

use crate::api::models::roles::RoleResponse;
use crate::api::models::users::CurrentUser;
use crate::db::models::notes::NoteDBResponse;
use crate::db::models::raffles::{RaffleDBResponse, RaffleEntryDBResponse};
use crate::db::models::users::UserDBResponse;
use crate::types::{NoteId, RaffleId, UserId};

pub fn user_fixture(id: UserId, username: &str) -> UserDBResponse {
    UserDBResponse {
        id,
        username: username.to_string(),
        fullname: format!("{username} Example"),
        age: None,
        image_path: None,
        is_active: true,
        password_hash: None,
        roles: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn current_user_fixture(id: UserId, username: &str, roles: &[&str]) -> CurrentUser {
    CurrentUser {
        id,
        username: username.to_string(),
        fullname: format!("{username} Example"),
        is_active: true,
        roles: roles
            .iter()
            .enumerate()
            .map(|(i, name)| RoleResponse {
                id: i as i32 + 1,
                name: name.to_string(),
                is_active: true,
            })
            .collect(),
    }
}

pub fn note_fixture(id: NoteId, owner: UserId, is_public: bool) -> NoteDBResponse {
    NoteDBResponse {
        id,
        title: "a note".to_string(),
        detail: "some detail".to_string(),
        is_public,
        is_archived: false,
        user_id: owner,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn raffle_fixture(id: RaffleId, owner: UserId, is_open: bool) -> RaffleDBResponse {
    RaffleDBResponse {
        id,
        title: "a raffle".to_string(),
        detail: "prize".to_string(),
        is_open,
        user_id: owner,
        winner_id: None,
        created_at: Utc::now(),
    }
}

pub fn raffle_entry_fixture(raffle_id: RaffleId, user_id: UserId, username: &str) -> RaffleEntryDBResponse {
    RaffleEntryDBResponse {
        raffle_id,
        user_id,
        username: username.to_string(),
        created_at: Utc::now(),
    }
}
