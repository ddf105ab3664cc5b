//! Domain layer: configuration, errors and query parameters.

pub mod config;
pub mod errors;
pub mod queries;
