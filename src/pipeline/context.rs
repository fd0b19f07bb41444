//! Request-scoped values the consumer side needs besides the events.

use serde_json::{Map, Value};

use crate::events::{AppMode, TaskIds};
use crate::llm::ModelConfig;

/// Identifiers, model selection and request metadata of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskContext {
    pub task_id: String,
    pub message_id: String,
    pub conversation_id: Option<String>,
    pub app_mode: AppMode,
    pub model: ModelConfig,
    /// Message creation time, unix seconds.
    pub created_at: i64,
    /// True if the request did not reference an existing conversation.
    ///
    /// Derived from `conversation_id` in [`TaskContext::new`]; override with
    /// [`TaskContext::with_first_message`] when the caller creates the
    /// conversation before opening the bus.
    pub is_first_message: bool,
    /// Request-specific values forwarded to notifications.
    pub extras: Map<String, Value>,
}

impl TaskContext {
    pub fn new(ids: &TaskIds, model: ModelConfig, created_at: i64) -> Self {
        Self {
            task_id: ids.task_id.clone(),
            message_id: ids.message_id.clone(),
            conversation_id: ids.conversation_id.clone(),
            app_mode: ids.app_mode,
            model,
            created_at,
            is_first_message: ids.conversation_id.is_none(),
            extras: Map::new(),
        }
    }

    #[inline]
    pub fn with_first_message(mut self, first: bool) -> Self {
        self.is_first_message = first;
        self
    }

    #[inline]
    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = extras;
        self
    }

    /// Conversation id to stamp on outgoing frames: chat apps only.
    pub fn frame_conversation_id(&self) -> Option<String> {
        match self.app_mode {
            AppMode::Chat => self.conversation_id.clone(),
            AppMode::Completion => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelMode;

    fn model() -> ModelConfig {
        ModelConfig::new("openai", "gpt", ModelMode::Chat)
    }

    #[test]
    fn first_message_follows_the_conversation_id() {
        let fresh = TaskIds::new("t1", "m1", None, AppMode::Chat);
        assert!(TaskContext::new(&fresh, model(), 0).is_first_message);

        let existing = TaskIds::new("t1", "m1", Some("c1".into()), AppMode::Chat);
        let ctx = TaskContext::new(&existing, model(), 0);
        assert!(!ctx.is_first_message);
        assert!(ctx.with_first_message(true).is_first_message);
    }

    #[test]
    fn frames_carry_the_conversation_only_for_chat() {
        let ids = TaskIds::new("t1", "m1", Some("c1".into()), AppMode::Completion);
        assert_eq!(TaskContext::new(&ids, model(), 0).frame_conversation_id(), None);
    }
}
