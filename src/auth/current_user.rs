//! Request-time identity resolution.
//!
//! [`CurrentUser`] is an axum extractor: handlers that take it as an argument
//! only run for requests carrying a valid bearer token that resolves to an
//! active account.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::instrument;

use crate::AppState;
use crate::api::models::users::CurrentUser;
use crate::db::handlers::users::Users;
use crate::errors::{Error, Result};

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Reject identities whose account has been deactivated.
///
/// Runs on every authenticated request, so deactivating an account takes
/// effect immediately even for tokens issued before the deactivation.
pub fn ensure_active(user: CurrentUser) -> Result<CurrentUser> {
    if user.is_active { Ok(user) } else { Err(Error::InactiveIdentity) }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts).ok_or(Error::InvalidToken)?;
        let claims = state.tokens.verify(token)?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut users = Users::new(&mut conn);

        // A token whose subject no longer resolves is treated as an invalid
        // token, not as a missing resource
        let user = users.get_user_by_username(&claims.sub).await?.ok_or(Error::InvalidToken)?;

        ensure_active(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::current_user_fixture;
    use axum::http::Request;

    fn parts_with_auth(value: &str) -> Parts {
        let request = Request::builder().uri("/").header(AUTHORIZATION, value).body(()).unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_non_bearer_schemes_rejected() {
        let parts = parts_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&parts), None);

        let request = Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = request.into_parts();
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_inactive_identity_is_its_own_failure() {
        let mut user = current_user_fixture(1, "alice", &[]);
        user.is_active = false;

        let err = ensure_active(user).unwrap_err();
        assert!(matches!(err, Error::InactiveIdentity));
    }

    #[test]
    fn test_active_identity_passes_through() {
        let user = current_user_fixture(1, "alice", &[]);
        assert!(ensure_active(user).is_ok());
    }
}
