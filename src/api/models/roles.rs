//! Role API models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::check_required;
use crate::db::models::roles::{RoleCreateDBRequest, RoleDBResponse, RoleUpdateDBRequest};
use crate::errors::Error;
use crate::types::RoleId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RoleCreate {
    pub name: String,
}

impl RoleCreate {
    pub fn validate(&self) -> Result<(), Error> {
        check_required("name", &self.name, 32)
    }
}

impl From<RoleCreate> for RoleCreateDBRequest {
    fn from(create: RoleCreate) -> Self {
        Self { name: create.name }
    }
}

/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl RoleUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            check_required("name", name, 32)?;
        }
        Ok(())
    }
}

impl From<RoleUpdate> for RoleUpdateDBRequest {
    fn from(update: RoleUpdate) -> Self {
        Self {
            name: update.name,
            is_active: update.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub is_active: bool,
}

impl From<RoleDBResponse> for RoleResponse {
    fn from(role: RoleDBResponse) -> Self {
        Self {
            id: role.id,
            name: role.name,
            is_active: role.is_active,
        }
    }
}
