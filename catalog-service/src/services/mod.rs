//! Services module for catalog-service.

pub mod database;

pub use database::Database;
