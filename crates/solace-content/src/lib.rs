//! Passage retrieval for Solace.
//!
//! Wraps the remote passage store behind the [`ContentStore`] seam and
//! layers the durable snapshot cache underneath it so lookups degrade to
//! the last known corpus instead of failing.

pub mod error;
pub mod remote;
pub mod repository;

pub use error::ContentError;
pub use remote::{ContentStore, HttpContentStore};
pub use repository::{filter_by_tags, ContentRepository};
