//! # Task ownership records.
//!
//! When a task bus is opened, the identity of whoever started the task is
//! written under the task id. A later stop request is honored only if the
//! requester resolves to the same identity.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::error::StoreError;

/// Surface a request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvokeFrom {
    ServiceApi,
    WebApp,
    Explore,
    Debugger,
}

impl InvokeFrom {
    /// Console surfaces are used by workspace accounts; the rest by end users.
    #[inline]
    pub fn is_trusted(&self) -> bool {
        matches!(self, InvokeFrom::Explore | InvokeFrom::Debugger)
    }
}

/// Caller identity: user id plus the surface it came through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub user_id: String,
    pub invoke_from: InvokeFrom,
}

impl Requester {
    pub fn new(user_id: impl Into<String>, invoke_from: InvokeFrom) -> Self {
        Self {
            user_id: user_id.into(),
            invoke_from,
        }
    }

    /// Prefixed identity stored in ownership records.
    ///
    /// # Example
    /// ```
    /// use taskrelay::{InvokeFrom, Requester};
    ///
    /// assert_eq!(Requester::new("42", InvokeFrom::Debugger).identity(), "account-42");
    /// assert_eq!(Requester::new("42", InvokeFrom::WebApp).identity(), "end-user-42");
    /// ```
    pub fn identity(&self) -> String {
        let prefix = if self.invoke_from.is_trusted() {
            "account"
        } else {
            "end-user"
        };
        format!("{prefix}-{}", self.user_id)
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity())
    }
}

/// Typed view over the ownership keys of a [`KeyValueStore`].
#[derive(Clone)]
pub struct OwnershipStore {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl OwnershipStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    /// Records `owner` as the owner of `task_id`.
    pub async fn record(&self, task_id: &str, owner: &Requester) -> Result<(), StoreError> {
        self.kv
            .set(&Self::key(task_id), &owner.identity(), self.ttl)
            .await
    }

    /// Recorded owner identity of `task_id`, if still live.
    pub async fn owner(&self, task_id: &str) -> Result<Option<String>, StoreError> {
        self.kv.get(&Self::key(task_id)).await
    }

    /// True if `requester` is the recorded owner of `task_id`.
    pub async fn is_owner(&self, task_id: &str, requester: &Requester) -> Result<bool, StoreError> {
        Ok(self
            .owner(task_id)
            .await?
            .is_some_and(|owner| owner == requester.identity()))
    }

    fn key(task_id: &str) -> String {
        format!("generate_task_belong:{task_id}")
    }
}
