//! Authentication and authorization.
//!
//! This module covers the whole identity pipeline: password hashing
//! ([`password`]), token issuance and verification ([`token`]), resolving the
//! caller behind a request ([`current_user`]), and role-based authorization
//! ([`role_gate`]).

pub mod current_user;
pub mod password;
pub mod role_gate;
pub mod token;

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::handlers::users::Users;
use crate::db::models::users::UserDBResponse;
use crate::errors::{Error, Result};

/// Authenticate a username/password pair against stored credentials.
///
/// Unknown usernames, accounts without a password, and wrong passwords all
/// produce the same [`Error::InvalidCredentials`], so a caller cannot probe
/// which usernames exist. Account activity is deliberately not checked here;
/// login and request-time identity checks are separate concerns.
#[instrument(skip(conn, password_plain))]
pub async fn authenticate(conn: &mut PgConnection, username: &str, password_plain: &str) -> Result<UserDBResponse> {
    let mut users = Users::new(conn);
    let user = users.get_user_by_username(username).await?;

    // Argon2 verification is CPU-bound; keep it off the async runtime
    let password_plain = password_plain.to_string();
    tokio::task::spawn_blocking(move || check_credentials(user, &password_plain))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("run password verification: {e}"),
        })?
}

/// Check a plaintext password against an optionally-found user record.
fn check_credentials(user: Option<UserDBResponse>, password_plain: &str) -> Result<UserDBResponse> {
    let Some(user) = user else {
        return Err(Error::InvalidCredentials);
    };
    let Some(hash) = user.password_hash.as_deref() else {
        return Err(Error::InvalidCredentials);
    };

    if password::verify_password(password_plain, hash) {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::user_fixture;

    #[test]
    fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let hash = password::hash_password("right-password").unwrap();
        let mut user = user_fixture(1, "alice");
        user.password_hash = Some(hash);

        let missing = check_credentials(None, "right-password").unwrap_err();
        let wrong = check_credentials(Some(user), "wrong-password").unwrap_err();

        assert!(matches!(missing, Error::InvalidCredentials));
        assert!(matches!(wrong, Error::InvalidCredentials));
    }

    #[test]
    fn test_passwordless_account_cannot_log_in() {
        let user = user_fixture(1, "alice");
        assert!(user.password_hash.is_none());

        let err = check_credentials(Some(user), "anything").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[test]
    fn test_correct_password_returns_the_user() {
        let mut user = user_fixture(7, "bob");
        user.password_hash = Some(password::hash_password("s3cret").unwrap());

        let found = check_credentials(Some(user), "s3cret").unwrap();
        assert_eq!(found.id, 7);
        assert_eq!(found.username, "bob");
    }

    #[test]
    fn test_inactive_account_still_authenticates() {
        // Activity is enforced at request time, not at login
        let mut user = user_fixture(3, "carol");
        user.is_active = false;
        user.password_hash = Some(password::hash_password("pw").unwrap());

        assert!(check_credentials(Some(user), "pw").is_ok());
    }
}
