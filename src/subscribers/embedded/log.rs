//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] logs every notification through `tracing` at info level.
//!
//! ## Output format (with the default fmt subscriber)
//! ```text
//! INFO taskrelay: message created message_id=m1 conversation_id=Some("c1") first=true
//! ```

use async_trait::async_trait;
use tracing::info;

use crate::subscribers::{Notification, Subscribe};

/// Logging notification subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Subscribe`] for analytics or downstream jobs.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_notification(&self, n: &Notification) {
        match n {
            Notification::MessageCreated {
                message_id,
                conversation_id,
                is_first_message,
                extras,
            } => {
                info!(
                    message_id = %message_id,
                    conversation_id = ?conversation_id,
                    first = is_first_message,
                    extras = extras.len(),
                    "message created"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
