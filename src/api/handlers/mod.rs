//! HTTP request handlers.

pub mod auth;
pub mod notes;
pub mod raffles;
pub mod roles;
pub mod users;
