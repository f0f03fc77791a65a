//! Wire-level request/response types exposed by the HTTP API.

pub mod auth;
pub mod notes;
pub mod pagination;
pub mod raffles;
pub mod roles;
pub mod users;

use crate::errors::Error;

/// Reject empty or over-length text fields before they hit the database,
/// where a length overflow would surface as an opaque 500.
pub(crate) fn check_required(field: &str, value: &str, max: usize) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest {
            message: format!("{field} must not be empty"),
        });
    }
    check_max(field, value, max)
}

pub(crate) fn check_max(field: &str, value: &str, max: usize) -> Result<(), Error> {
    if value.chars().count() > max {
        return Err(Error::BadRequest {
            message: format!("{field} must be at most {max} characters"),
        });
    }
    Ok(())
}
