//! User API models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::roles::RoleResponse;
use crate::api::models::check_required;
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest};
use crate::errors::Error;
use crate::types::{RoleId, UserId};

/// Request to create a user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCreate {
    pub username: String,
    pub fullname: String,
    pub age: Option<i32>,
    pub password: String,
    /// Role IDs to assign; unknown IDs are silently skipped
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), Error> {
        check_required("username", &self.username, 32)?;
        check_required("fullname", &self.fullname, 64)?;
        check_required("password", &self.password, 256)
    }

    /// Pair with a computed hash to form the database request; the plaintext
    /// password stops here.
    pub fn into_db_request(self, password_hash: String) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: self.username,
            fullname: self.fullname,
            age: self.age,
            password_hash: Some(password_hash),
            role_ids: self.role_ids,
        }
    }
}

/// Request to update a user. Absent fields are left unchanged; passwords
/// change through their own endpoint.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub age: Option<i32>,
    pub is_active: Option<bool>,
    /// When present, replaces the full set of role assignments
    pub role_ids: Option<Vec<RoleId>>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(username) = &self.username {
            check_required("username", username, 32)?;
        }
        if let Some(fullname) = &self.fullname {
            check_required("fullname", fullname, 64)?;
        }
        Ok(())
    }

    /// Whether this update touches fields only administrators may change.
    pub fn touches_admin_fields(&self) -> bool {
        self.is_active.is_some() || self.role_ids.is_some()
    }
}

impl From<UserUpdate> for UserUpdateDBRequest {
    fn from(update: UserUpdate) -> Self {
        Self {
            username: update.username,
            fullname: update.fullname,
            age: update.age,
            image_path: None,
            is_active: update.is_active,
            password_hash: None,
            role_ids: update.role_ids,
        }
    }
}

/// A user as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub fullname: String,
    pub age: Option<i32>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub roles: Vec<RoleResponse>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            age: user.age,
            image_path: user.image_path,
            is_active: user.is_active,
            roles: user.roles.into_iter().map(RoleResponse::from).collect(),
        }
    }
}

/// The resolved identity behind an authenticated request.
///
/// Produced by the bearer-token extractor; handlers receive it as an
/// argument and use it for ownership and role checks.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub fullname: String,
    pub is_active: bool,
    pub roles: Vec<RoleResponse>,
}

impl CurrentUser {
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            is_active: user.is_active,
            roles: user.roles.into_iter().map(RoleResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> UserCreate {
        UserCreate {
            username: "alice".to_string(),
            fullname: "Alice Example".to_string(),
            age: Some(30),
            password: "s3cret".to_string(),
            role_ids: vec![],
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(valid_create().validate().is_ok());

        let mut empty_username = valid_create();
        empty_username.username = "  ".to_string();
        assert!(empty_username.validate().is_err());

        let mut long_username = valid_create();
        long_username.username = "x".repeat(33);
        assert!(long_username.validate().is_err());

        let mut empty_password = valid_create();
        empty_password.password = String::new();
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_update_validation_ignores_absent_fields() {
        assert!(UserUpdate::default().validate().is_ok());

        let update = UserUpdate {
            username: Some("y".repeat(40)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_admin_only_fields_detected() {
        assert!(!UserUpdate::default().touches_admin_fields());

        let roles = UserUpdate {
            role_ids: Some(vec![1]),
            ..Default::default()
        };
        assert!(roles.touches_admin_fields());

        let activity = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(activity.touches_admin_fields());
    }
}
