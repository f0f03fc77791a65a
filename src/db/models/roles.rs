//! Role persistence models.

use sqlx::FromRow;

use crate::types::RoleId;

#[derive(Debug, Clone)]
pub struct RoleCreateDBRequest {
    pub name: String,
}

/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RoleUpdateDBRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoleDBResponse {
    pub id: RoleId,
    pub name: String,
    pub is_active: bool,
}
