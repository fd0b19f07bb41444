//! # Producer-facing side of a task bus.
//!
//! [`Publisher`] wraps events in envelopes and enqueues them on the task's
//! [`TaskQueue`]. It is what the generation pipeline holds.
//!
//! ## Publish flow
//! ```text
//! publish(event)
//!   ├─► validate payload          ── invalid ──► Err(Validation), nothing enqueued
//!   ├─► task cancelled?           ── yes ──────► Err(TaskCancelled)
//!   ├─► push (close if terminal)  ── closed ───► Ok(()) (dropped, bus is shut down)
//!   │                             ── no consumer ► cancel token, Err(TaskCancelled)
//!   └─► event == Stop?            ── yes ──────► cancel token, Err(TaskCancelled)
//! ```
//!
//! ## Rules
//! - Terminal events (`Stop`, `Error`, `MessageEnd`) shut the bus down; later
//!   publishes are no-ops.
//! - Once the listener injects `Stop` (lifetime expiry or stop flag), every
//!   publish returns [`PublishError::TaskCancelled`]. The producer should treat
//!   it as "stop generating", not as a failure.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::PublishError;
use crate::events::{Event, InvokeFailure, TaskIds, TaskQueue};
use crate::llm::{LlmResult, LlmResultChunk};
use crate::persistence::AgentThoughtRecord;

/// Producer handle of one task bus.
///
/// Cheap to clone; all clones publish into the same queue.
#[derive(Clone, Debug)]
pub struct Publisher {
    queue: Arc<TaskQueue>,
}

impl Publisher {
    pub(crate) fn new(queue: Arc<TaskQueue>) -> Self {
        Self { queue }
    }

    /// Identifiers of the task this publisher feeds.
    pub fn ids(&self) -> &TaskIds {
        self.queue.ids()
    }

    /// Publishes one event. See the module docs for the full flow.
    pub fn publish(&self, event: Event) -> Result<(), PublishError> {
        event.validate()?;

        if self.queue.is_cancelled() {
            return Err(PublishError::TaskCancelled);
        }

        let kind = event.kind();
        let is_stop = matches!(event, Event::Stop);
        let closes = event.is_terminal();
        if !self.queue.push(event, closes) {
            if self.queue.is_cancelled() {
                debug!(
                    task_id = %self.queue.ids().task_id,
                    kind = kind.as_label(),
                    "consumer gone; task cancelled"
                );
                return Err(PublishError::TaskCancelled);
            }
            debug!(
                task_id = %self.queue.ids().task_id,
                kind = kind.as_label(),
                "bus already shut down; event dropped"
            );
            return Ok(());
        }

        if is_stop {
            self.queue.cancel();
            return Err(PublishError::TaskCancelled);
        }
        Ok(())
    }

    /// Publishes an incremental chunk.
    pub fn publish_chunk(&self, chunk: LlmResultChunk) -> Result<(), PublishError> {
        self.publish(Event::MessageChunk(chunk))
    }

    /// Publishes a display-level replacement of the whole answer.
    pub fn publish_message_replace(&self, text: impl Into<String>) -> Result<(), PublishError> {
        self.publish(Event::MessageReplace { text: text.into() })
    }

    /// Publishes retrieval metadata.
    pub fn publish_retriever_resources(&self, resources: Vec<Value>) -> Result<(), PublishError> {
        self.publish(Event::RetrieverResources(resources))
    }

    /// Publishes a reference to a persisted agent thought. Only its id is enqueued.
    pub fn publish_agent_thought(&self, thought: &AgentThoughtRecord) -> Result<(), PublishError> {
        self.publish(Event::AgentThought {
            agent_thought_id: thought.id.clone(),
        })
    }

    /// Publishes the final result and shuts the bus down.
    pub fn publish_message_end(&self, result: LlmResult) -> Result<(), PublishError> {
        self.publish(Event::MessageEnd(result))
    }

    /// Publishes a failure and shuts the bus down.
    pub fn publish_error(&self, failure: InvokeFailure) -> Result<(), PublishError> {
        self.publish(Event::Error(failure))
    }

    /// Stops the task from the producer side.
    ///
    /// Always returns `Err(TaskCancelled)` unless the bus was already shut down.
    pub fn publish_stop(&self) -> Result<(), PublishError> {
        self.publish(Event::Stop)
    }

    /// True once the task has been stopped.
    pub fn is_cancelled(&self) -> bool {
        self.queue.is_cancelled()
    }

    /// Token cancelled when the task is stopped, for cooperative checks
    /// while the producer is busy outside of `publish` (e.g. awaiting the model).
    pub fn cancellation(&self) -> CancellationToken {
        self.queue.cancellation().child_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AppMode, FailureKind, Slot};
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn publisher() -> (Publisher, UnboundedReceiver<Slot>) {
        let (queue, rx) = TaskQueue::new(TaskIds::new("t1", "m1", None, AppMode::Completion));
        (Publisher::new(queue), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Slot>) -> Vec<Option<Event>> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .map(|slot| match slot {
                Slot::Event(env) => Some(env.into_event()),
                Slot::Close => None,
            })
            .collect()
    }

    #[test]
    fn stop_enqueues_closes_and_cancels() {
        let (p, mut rx) = publisher();
        let token = p.cancellation();

        assert_eq!(p.publish_stop(), Err(PublishError::TaskCancelled));
        assert!(p.is_cancelled());
        assert!(token.is_cancelled());
        assert_eq!(
            p.publish_chunk(LlmResultChunk::text("m", "late")),
            Err(PublishError::TaskCancelled)
        );
        assert_eq!(drain(&mut rx), vec![Some(Event::Stop), None]);
    }

    #[test]
    fn terminal_events_shut_the_bus() {
        let (p, mut rx) = publisher();
        p.publish_chunk(LlmResultChunk::text("m", "a")).unwrap();
        p.publish_error(InvokeFailure::new(FailureKind::Invoke, "boom"))
            .unwrap();
        // No-op after a terminal event, and not a cancellation.
        p.publish_message_end(LlmResult::default()).unwrap();
        assert!(!p.is_cancelled());

        let drained = drain(&mut rx);
        assert_eq!(drained.len(), 3);
        assert!(matches!(drained[1], Some(Event::Error(_))));
        assert_eq!(drained[2], None);
    }

    #[test]
    fn invalid_payload_is_never_enqueued() {
        let (p, mut rx) = publisher();
        let err = p
            .publish_retriever_resources(vec![json!([1, 2, 3])])
            .unwrap_err();
        assert!(matches!(err, PublishError::Validation { .. }));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn agent_thought_crosses_by_id() {
        let (p, mut rx) = publisher();
        let record = AgentThoughtRecord {
            id: "th-1".into(),
            position: 1,
            thought: "searching".into(),
            tool: "web".into(),
            tool_input: "{}".into(),
        };
        p.publish_agent_thought(&record).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![Some(Event::AgentThought {
                agent_thought_id: "th-1".into()
            })]
        );
    }
}
