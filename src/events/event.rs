//! # Events flowing through a task bus.
//!
//! [`Event`] is the closed set of payloads a producer can publish for one
//! generation task. The [`EventKind`] enum mirrors it without payloads, for
//! logging and matching.
//!
//! ## Terminal events
//! `Stop`, `Error` and `MessageEnd` are terminal: once one of them is enqueued
//! the bus is shut down and the listener ends after draining it.
//!
//! ## Payload rules
//! Variants only hold owned plain values (strings, numbers, JSON values, ids).
//! Records owned by the persistence layer never cross the queue: an agent
//! thought is referenced by id and re-read by the consumer.
//!
//! ## Example
//! ```rust
//! use taskrelay::{Event, EventKind, LlmResultChunk};
//!
//! let ev = Event::MessageChunk(LlmResultChunk::text("gpt-4o", "Hel"));
//! assert_eq!(ev.kind(), EventKind::MessageChunk);
//! assert!(!ev.is_terminal());
//! assert!(Event::Stop.is_terminal());
//! ```

use serde_json::Value;

use crate::error::PublishError;
use crate::llm::{LlmResult, LlmResultChunk};

/// Classification of bus events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Keepalive, no payload.
    Ping,
    /// Terminal: the task was stopped (lifetime expiry or cancellation).
    Stop,
    /// Terminal: generation failed.
    Error,
    /// Incremental content.
    MessageChunk,
    /// Display-level replacement of everything shown so far.
    MessageReplace,
    /// Terminal: generation completed naturally.
    MessageEnd,
    /// Retrieval side-channel metadata.
    RetrieverResources,
    /// Reference to a persisted agent thought.
    AgentThought,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Ping => "ping",
            EventKind::Stop => "stop",
            EventKind::Error => "error",
            EventKind::MessageChunk => "message_chunk",
            EventKind::MessageReplace => "message_replace",
            EventKind::MessageEnd => "message_end",
            EventKind::RetrieverResources => "retriever_resources",
            EventKind::AgentThought => "agent_thought",
        }
    }
}

/// Category of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Provider rejected the credentials.
    Authorization,
    /// Descriptive failure of the model invocation.
    Invoke,
    /// Invalid input.
    InvalidValue,
    /// Anything else.
    Other,
}

/// Failure reported by the generation pipeline, carried by [`Event::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Longer human-readable description, when the source error has one.
    pub description: Option<String>,
}

impl InvokeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            description: None,
        }
    }

    /// Attaches a description.
    #[inline]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Payload published for a generation task.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ping,
    Stop,
    Error(InvokeFailure),
    MessageChunk(LlmResultChunk),
    MessageReplace { text: String },
    MessageEnd(LlmResult),
    /// Resource descriptors; each must be a JSON object.
    RetrieverResources(Vec<Value>),
    AgentThought { agent_thought_id: String },
}

impl Event {
    /// Payload-free classification of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Ping => EventKind::Ping,
            Event::Stop => EventKind::Stop,
            Event::Error(_) => EventKind::Error,
            Event::MessageChunk(_) => EventKind::MessageChunk,
            Event::MessageReplace { .. } => EventKind::MessageReplace,
            Event::MessageEnd(_) => EventKind::MessageEnd,
            Event::RetrieverResources(_) => EventKind::RetrieverResources,
            Event::AgentThought { .. } => EventKind::AgentThought,
        }
    }

    /// True for `Stop`, `Error` and `MessageEnd`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Stop | Event::Error(_) | Event::MessageEnd(_))
    }

    /// Checks the parts of the publish contract the types cannot express.
    ///
    /// - retriever resources must be JSON objects (descriptors), never bare
    ///   scalars or nested arrays;
    /// - agent thought references must carry a non-empty id.
    pub(crate) fn validate(&self) -> Result<(), PublishError> {
        match self {
            Event::RetrieverResources(resources) => {
                if let Some(pos) = resources.iter().position(|r| !r.is_object()) {
                    return Err(PublishError::validation(format!(
                        "retriever resource #{pos} is not an object"
                    )));
                }
                Ok(())
            }
            Event::AgentThought { agent_thought_id } if agent_thought_id.trim().is_empty() => {
                Err(PublishError::validation("agent thought id is empty"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_classification() {
        assert!(Event::Stop.is_terminal());
        assert!(Event::Error(InvokeFailure::new(FailureKind::Other, "x")).is_terminal());
        assert!(Event::MessageEnd(LlmResult::default()).is_terminal());
        assert!(!Event::Ping.is_terminal());
        assert!(!Event::MessageReplace { text: "t".into() }.is_terminal());
        assert!(!Event::RetrieverResources(vec![]).is_terminal());
    }

    #[test]
    fn validation_rejects_non_object_resources() {
        let ok = Event::RetrieverResources(vec![json!({"dataset_id": "d1", "score": 0.9})]);
        assert!(ok.validate().is_ok());

        let bad = Event::RetrieverResources(vec![json!({"a": 1}), json!("raw")]);
        let err = bad.validate().unwrap_err();
        assert_eq!(err.as_label(), "publish_validation");
        assert!(err.to_string().contains("#1"));
    }

    #[test]
    fn validation_rejects_empty_thought_id() {
        let bad = Event::AgentThought {
            agent_thought_id: "  ".into(),
        };
        assert!(bad.validate().is_err());
    }
}
