//! # Notification subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for reacting to finalized tasks.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`],
//!   or the configured default)
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Architecture
//! ```text
//! SubscriberSet ──► [bounded queue] ──► worker task ──► subscriber.on_notification()
//!                                    └─► panic caught → tracing::error!
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the notification **for this subscriber only** (warn).
//! - Notifications are processed sequentially (FIFO) per subscriber.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskrelay::{Notification, Subscribe};
//!
//! struct TitleGenerator;
//!
//! #[async_trait]
//! impl Subscribe for TitleGenerator {
//!     async fn on_notification(&self, n: &Notification) {
//!         if let Notification::MessageCreated { is_first_message: true, .. } = n {
//!             // generate a conversation title, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "title-generator" }
//!     fn queue_capacity(&self) -> Option<usize> { Some(64) }
//! }
//! ```

use async_trait::async_trait;

use super::notification::Notification;

/// Notification subscriber.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single notification.
    ///
    /// Called from a dedicated worker task, never from the finalizer itself.
    async fn on_notification(&self, notification: &Notification);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity, or `None` for the set's default.
    ///
    /// The set clamps capacity to a minimum of 1.
    fn queue_capacity(&self) -> Option<usize> {
        None
    }
}
