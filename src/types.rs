//! Common type definitions.
//!
//! All entity identifiers are sequential database integers wrapped in type
//! aliases for readability at call sites.

/// User account identifier
pub type UserId = i32;
/// Role identifier
pub type RoleId = i32;
/// Note identifier
pub type NoteId = i32;
/// Raffle identifier
pub type RaffleId = i32;
