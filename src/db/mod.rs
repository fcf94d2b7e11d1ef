//! Database layer
//!
//! SQLite persistence for the Vitrine service (single-binary deployment).
//! Code-based migrations run at startup, and repositories provide
//! trait-based data access so services can be tested against in-memory
//! databases.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
