//! Solace storage crate - SQLite persistence for partition snapshots.
//!
//! Provides a WAL-mode SQLite database with migrations and the durable
//! [`ContentCache`] the content repository falls back to when the remote
//! store is unreachable.

pub mod cache;
pub mod db;
pub mod migrations;

pub use cache::{ContentCache, SqliteContentCache};
pub use db::Database;
