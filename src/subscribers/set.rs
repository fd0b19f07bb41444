//! # Non-blocking notification fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`] distributes notifications to multiple subscribers
//! concurrently without blocking the finalizer.
//!
//! ## Architecture
//! ```text
//! emit(notification)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_notification()
//!     │    (bounded)         └──────► panic → error log
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_notification()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_notification()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**
//! - **Overflow**: notification dropped for that subscriber only (warn)
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Per-subscriber FIFO**
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, warn};

use super::notification::Notification;
use super::subscribe::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Notification>>,
}

/// Fan-out coordinator for notification subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// `default_capacity` applies to subscribers that do not declare their own
    /// (see [`Config::notification_queue_capacity`](crate::Config)).
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, default_capacity: usize) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().unwrap_or(default_capacity).max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Notification>>(cap);
            let s = Arc::clone(&sub);

            let handle = tokio::spawn(async move {
                while let Some(n) = rx.recv().await {
                    let fut = s.on_notification(n.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = {
                            let any = &*panic_err;
                            if let Some(msg) = any.downcast_ref::<&'static str>() {
                                (*msg).to_string()
                            } else if let Some(msg) = any.downcast_ref::<String>() {
                                msg.clone()
                            } else {
                                "unknown panic".to_string()
                            }
                        };
                        error!(subscriber = s.name(), panic = %info, "subscriber panicked");
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self { channels, workers }
    }

    /// A set with no subscribers; `emit` is a no-op.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            channels: Vec::new(),
            workers: Vec::new(),
        }
    }

    /// Emits a notification to all subscribers (non-blocking).
    pub fn emit(&self, notification: Notification) {
        let n = Arc::new(notification);
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&n)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        subscriber = channel.name,
                        kind = n.as_label(),
                        "notification dropped: queue full"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(
                        subscriber = channel.name,
                        kind = n.as_label(),
                        "notification dropped: worker closed"
                    );
                }
            }
        }
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::empty()
    }
}
