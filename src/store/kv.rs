//! # Key-value store capability
//!
//! `KeyValueStore` abstracts the process-wide distributed store (Redis or
//! similar) that holds ownership records and stop flags. A single instance is
//! created at process start and shared as `Arc<dyn KeyValueStore>`.
//!
//! ## Contract
//! - Operations are single-key; no in-process locking is required around them.
//! - `set` overwrites any existing value and resets its TTL.
//! - `get` never returns an expired entry.
//! - `delete` of a missing key is not an error.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Contract for TTL key-value backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Removes `key`.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
