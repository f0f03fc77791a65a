//! Repository handlers, one per table.

pub mod notes;
pub mod raffles;
pub mod repository;
pub mod roles;
pub mod users;

pub use repository::Repository;
