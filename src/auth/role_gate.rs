//! Role-based authorization.
//!
//! A [`RoleGate`] is a reusable predicate over a fixed set of allowed role
//! names. Gates carry no request state and hit no I/O; they only inspect the
//! roles already attached to a resolved [`CurrentUser`]. Route handlers
//! decide where a gate applies and whether resource ownership bypasses it.

use crate::api::models::users::CurrentUser;
use crate::errors::Error;

/// Role allowed to manage user and role records.
pub const USER_MANAGER: &str = "user_manager";
/// Role allowed to read and edit any note.
pub const NOTE_MANAGER: &str = "note_manager";
/// Role allowed to manage any raffle.
pub const RAFFLE_MANAGER: &str = "raffle_manager";

/// An authorization predicate parameterized by the roles it accepts.
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [&'static str],
}

impl RoleGate {
    pub const fn new(allowed: &'static [&'static str]) -> Self {
        Self { allowed }
    }

    /// Passes if the user holds at least one of the allowed roles.
    pub fn check(&self, user: &CurrentUser) -> Result<(), Error> {
        if self.allowed.iter().any(|role| user.has_role(role)) {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

/// Gate for user and role administration endpoints.
pub const USER_ADMIN: RoleGate = RoleGate::new(&[USER_MANAGER]);
/// Gate for cross-user note access.
pub const NOTE_ADMIN: RoleGate = RoleGate::new(&[NOTE_MANAGER]);
/// Gate for cross-user raffle management.
pub const RAFFLE_ADMIN: RoleGate = RoleGate::new(&[RAFFLE_MANAGER]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::current_user_fixture;

    #[test]
    fn test_any_allowed_role_passes() {
        let gate = RoleGate::new(&["user_manager", "note_manager"]);

        let user = current_user_fixture(1, "alice", &["note_manager"]);
        assert!(gate.check(&user).is_ok());

        let both = current_user_fixture(2, "bob", &["user_manager", "note_manager"]);
        assert!(gate.check(&both).is_ok());
    }

    #[test]
    fn test_no_matching_role_is_forbidden() {
        let gate = USER_ADMIN;

        let unrelated = current_user_fixture(1, "alice", &["raffle_manager"]);
        assert!(matches!(gate.check(&unrelated), Err(Error::Forbidden)));

        let none = current_user_fixture(2, "bob", &[]);
        assert!(matches!(gate.check(&none), Err(Error::Forbidden)));
    }

    #[test]
    fn test_extra_roles_do_not_hurt() {
        let user = current_user_fixture(1, "alice", &["raffle_manager", "user_manager"]);
        assert!(USER_ADMIN.check(&user).is_ok());
    }
}
