//! # Cross-request task control.
//!
//! [`TaskControl`] is what a *separate* request (e.g. `POST /tasks/{id}/stop`)
//! uses to cancel a running task. It never touches the task's queue or its
//! producer: it only writes a stop flag, which the task's
//! [`Listener`](crate::Listener) observes within one tick.
//!
//! ## Stop request
//! ```text
//! request_stop(task_id, requester)
//!   ├─► owner record missing          ─► Ok(false) (finished or unknown task)
//!   ├─► requester identity ≠ owner    ─► Ok(false) (no cross-user cancellation)
//!   └─► raise stop flag (stop_flag_ttl) ─► Ok(true)
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use super::config::Config;
use crate::error::StoreError;
use crate::store::{KeyValueStore, OwnershipStore, Requester, StopSignalStore};

/// Handle over the ownership and stop-flag stores.
///
/// Create once at process start and share; cheap to clone.
#[derive(Clone)]
pub struct TaskControl {
    ownership: OwnershipStore,
    stops: StopSignalStore,
}

impl TaskControl {
    /// Uses one key-value backend for both ownership records and stop flags.
    pub fn new(kv: Arc<dyn KeyValueStore>, cfg: &Config) -> Self {
        Self {
            ownership: OwnershipStore::new(Arc::clone(&kv), cfg.owner_ttl),
            stops: StopSignalStore::new(kv, cfg.stop_flag_ttl),
        }
    }

    /// Uses separately configured stores.
    pub fn with_stores(ownership: OwnershipStore, stops: StopSignalStore) -> Self {
        Self { ownership, stops }
    }

    pub fn ownership(&self) -> &OwnershipStore {
        &self.ownership
    }

    pub fn stops(&self) -> &StopSignalStore {
        &self.stops
    }

    /// Requests that `task_id` stop, on behalf of `requester`.
    ///
    /// Returns `true` if the stop flag was raised.
    pub async fn request_stop(
        &self,
        task_id: &str,
        requester: &Requester,
    ) -> Result<bool, StoreError> {
        let Some(owner) = self.ownership.owner(task_id).await? else {
            debug!(task_id, "stop request ignored: no owner record");
            return Ok(false);
        };

        if owner != requester.identity() {
            debug!(task_id, requester = %requester, "stop request ignored: not the owner");
            return Ok(false);
        }

        self.stops.raise(task_id).await?;
        info!(task_id, requester = %requester, "stop requested");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InvokeFrom, MemoryStore};

    fn control() -> TaskControl {
        TaskControl::new(Arc::new(MemoryStore::new()), &Config::default())
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_task_is_a_no_op() {
        let ctl = control();
        let who = Requester::new("u1", InvokeFrom::WebApp);
        assert!(!ctl.request_stop("missing", &who).await.unwrap());
        assert!(!ctl.stops().is_raised("missing").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_owner_can_stop() {
        let ctl = control();
        let owner = Requester::new("u1", InvokeFrom::ServiceApi);
        ctl.ownership().record("t1", &owner).await.unwrap();

        let intruder = Requester::new("u2", InvokeFrom::ServiceApi);
        assert!(!ctl.request_stop("t1", &intruder).await.unwrap());
        assert!(!ctl.stops().is_raised("t1").await.unwrap());

        assert!(ctl.request_stop("t1", &owner).await.unwrap());
        assert!(ctl.stops().is_raised("t1").await.unwrap());
    }
}
