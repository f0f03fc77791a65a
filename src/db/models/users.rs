//! User persistence models.

use chrono::{DateTime, Utc};

use crate::db::models::roles::RoleDBResponse;
use crate::types::{RoleId, UserId};

/// Request to create a user row.
///
/// Carries an already-computed password hash; plaintext never reaches the
/// database layer.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub fullname: String,
    pub age: Option<i32>,
    pub password_hash: Option<String>,
    pub role_ids: Vec<RoleId>,
}

/// Request to update a user row. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub age: Option<i32>,
    pub image_path: Option<String>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
    /// When present, replaces the full set of role assignments.
    pub role_ids: Option<Vec<RoleId>>,
}

/// A user row with its assigned roles attached.
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub fullname: String,
    pub age: Option<i32>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub password_hash: Option<String>,
    pub roles: Vec<RoleDBResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
