//! # Task-scoped envelope around an [`Event`].
//!
//! Every event is wrapped with the identifiers of the task it belongs to and a
//! per-task sequence number assigned at enqueue time. Sequence numbers are
//! strictly increasing in enqueue order, so consumers can verify FIFO delivery.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::event::Event;

/// Conversation mode of the application that owns the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    /// Multi-turn chat; frames carry the conversation id.
    #[default]
    Chat,
    /// Single-shot completion.
    Completion,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Chat => "chat",
            AppMode::Completion => "completion",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers shared by every envelope of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskIds {
    pub task_id: String,
    pub message_id: String,
    pub conversation_id: Option<String>,
    pub app_mode: AppMode,
}

impl TaskIds {
    pub fn new(
        task_id: impl Into<String>,
        message_id: impl Into<String>,
        conversation_id: Option<String>,
        app_mode: AppMode,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            message_id: message_id.into(),
            conversation_id,
            app_mode,
        }
    }
}

/// Immutable wrapper binding an event to its task.
#[derive(Debug, Clone)]
pub struct Envelope {
    seq: u64,
    ids: Arc<TaskIds>,
    event: Event,
}

impl Envelope {
    pub(crate) fn new(seq: u64, ids: Arc<TaskIds>, event: Event) -> Self {
        Self { seq, ids, event }
    }

    /// Per-task enqueue sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[inline]
    pub fn task_id(&self) -> &str {
        &self.ids.task_id
    }

    #[inline]
    pub fn message_id(&self) -> &str {
        &self.ids.message_id
    }

    #[inline]
    pub fn conversation_id(&self) -> Option<&str> {
        self.ids.conversation_id.as_deref()
    }

    #[inline]
    pub fn app_mode(&self) -> AppMode {
        self.ids.app_mode
    }

    #[inline]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Consumes the envelope, returning the event.
    #[inline]
    pub fn into_event(self) -> Event {
        self.event
    }
}
