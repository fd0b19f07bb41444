//! # Stop flags.
//!
//! A stop flag is the only channel between a cancellation request and a
//! running task. The listener consumes it with [`StopSignalStore::take`], which
//! deletes the flag so cancellation is observed once.

use std::sync::Arc;
use std::time::Duration;

use super::kv::KeyValueStore;
use crate::error::StoreError;

/// Typed view over the stop-flag keys of a [`KeyValueStore`].
#[derive(Clone)]
pub struct StopSignalStore {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl StopSignalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    /// Raises the stop flag for `task_id`.
    pub async fn raise(&self, task_id: &str) -> Result<(), StoreError> {
        self.kv.set(&Self::key(task_id), "1", self.ttl).await
    }

    /// True if a flag is pending, without consuming it.
    pub async fn is_raised(&self, task_id: &str) -> Result<bool, StoreError> {
        Ok(self.kv.get(&Self::key(task_id)).await?.is_some())
    }

    /// Consumes the flag: returns `true` and deletes it if one was pending.
    pub async fn take(&self, task_id: &str) -> Result<bool, StoreError> {
        let key = Self::key(task_id);
        if self.kv.get(&key).await?.is_none() {
            return Ok(false);
        }
        self.kv.delete(&key).await?;
        Ok(true)
    }

    fn key(task_id: &str) -> String {
        format!("generate_task_stopped:{task_id}")
    }
}
