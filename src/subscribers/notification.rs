//! # Notifications emitted after finalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Something downstream services may want to react to (conversation titles,
/// analytics, billing).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// The final message of a task has been persisted.
    MessageCreated {
        message_id: String,
        conversation_id: Option<String>,
        /// True if the request started a new conversation.
        is_first_message: bool,
        /// Request-specific values forwarded untouched.
        extras: Map<String, Value>,
    },
}

impl Notification {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Notification::MessageCreated { .. } => "message_was_created",
        }
    }

    /// Message the notification refers to.
    pub fn message_id(&self) -> &str {
        match self {
            Notification::MessageCreated { message_id, .. } => message_id,
        }
    }
}
