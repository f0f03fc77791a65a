//! Persistence-layer request/response types, kept separate from the API
//! models so storage concerns (hashes, link tables) never leak onto the wire.

pub mod notes;
pub mod raffles;
pub mod roles;
pub mod users;
