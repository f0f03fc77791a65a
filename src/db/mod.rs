//! Database layer: persistence models, repository handlers, and error
//! categorization.

pub mod errors;
pub mod handlers;
pub mod models;
