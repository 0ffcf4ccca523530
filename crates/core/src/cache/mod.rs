//! Key-value cache collaborator.
//!
//! The report trigger invalidates the status key around each run so a
//! status read never spans a run boundary with stale data.

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use std::time::Duration;

/// Trait for cache backends.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value by key, if present and not expired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value with a time-to-live.
    async fn set(&self, key: &str, value: String, ttl: Duration);

    /// Remove a key.
    async fn delete(&self, key: &str);
}
