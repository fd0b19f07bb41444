//! # Response assembly.
//!
//! [`ResponseAssembler`] drains one task's [`Listener`] and produces either a
//! single [`BlockingResponse`] or a lazy stream of [`StreamFrame`]s. It owns
//! the [`TaskState`] and hands it to the [`Finalizer`] on the terminal event.
//!
//! ## Event handling
//! ```text
//! event              blocking                     streaming
//! ─────────────────  ───────────────────────────  ──────────────────────────────
//! Ping               ignored                      ping frame
//! MessageChunk       accumulate                   accumulate, message frame
//! MessageReplace     ignored                      message_replace frame
//! RetrieverResources metadata                     metadata
//! AgentThought       ignored                      load record, agent_thought frame
//! MessageEnd / Stop  finalize, response           finalize, message_end frame, end
//! Error              Err(translated)              Err(translated), end
//! ```

use std::sync::Arc;

use futures::{Stream, stream};
use tracing::{debug, warn};

use super::context::TaskContext;
use super::finalizer::{Finalizer, Termination};
use super::frame::{BlockingResponse, StreamFrame};
use super::state::TaskState;
use crate::core::Listener;
use crate::error::GenerateError;
use crate::events::{Event, InvokeFailure};
use crate::persistence::{AgentThoughtRecord, MessageRepository};

/// Outcome of one streaming step.
enum Step {
    Frame(StreamFrame),
    Last(Result<StreamFrame, GenerateError>),
    Done,
}

/// Consumer side of one task.
pub struct ResponseAssembler {
    ctx: TaskContext,
    listener: Listener,
    finalizer: Finalizer,
    repo: Arc<dyn MessageRepository>,
    state: TaskState,
}

impl ResponseAssembler {
    /// Thoughts are loaded from the finalizer's repository.
    pub fn new(ctx: TaskContext, listener: Listener, finalizer: Finalizer) -> Self {
        let repo = Arc::clone(finalizer.repository());
        let state = TaskState::new(ctx.model.model.clone());
        Self {
            ctx,
            listener,
            finalizer,
            repo,
            state,
        }
    }

    /// Drains the task and returns the aggregated response.
    pub async fn blocking(mut self) -> Result<BlockingResponse, GenerateError> {
        while let Some(envelope) = self.listener.next().await {
            match envelope.into_event() {
                Event::Error(failure) => return Err(self.translate(&failure)),
                Event::RetrieverResources(resources) => {
                    self.state.set_retriever_resources(resources);
                }
                Event::MessageChunk(chunk) => {
                    self.state.append_chunk(&chunk);
                }
                Event::MessageEnd(result) => {
                    self.finish(Termination::MessageEnd(result)).await?;
                    return Ok(self.blocking_response());
                }
                Event::Stop => {
                    self.finish(Termination::Stopped).await?;
                    return Ok(self.blocking_response());
                }
                Event::Ping | Event::MessageReplace { .. } | Event::AgentThought { .. } => {}
            }
        }
        Err(GenerateError::internal("task ended without a terminal event"))
    }

    /// Lazily drains the task as frames.
    ///
    /// The stream ends after `message_end`, or after yielding the error of a
    /// failed task.
    pub fn streaming(self) -> impl Stream<Item = Result<StreamFrame, GenerateError>> + Send {
        stream::unfold(Some(self), |slot| async move {
            let mut this = slot?;
            match this.next_step().await {
                Step::Frame(frame) => Some((Ok(frame), Some(this))),
                Step::Last(item) => Some((item, None)),
                Step::Done => None,
            }
        })
    }

    /// Accumulated state, for callers that keep the assembler around.
    pub fn state(&self) -> &TaskState {
        &self.state
    }

    async fn next_step(&mut self) -> Step {
        while let Some(envelope) = self.listener.next().await {
            match envelope.into_event() {
                Event::Ping => return Step::Frame(StreamFrame::Ping),
                Event::MessageChunk(chunk) => {
                    if let Some(delta) = self.state.append_chunk(&chunk) {
                        return Step::Frame(self.message_frame(delta));
                    }
                }
                Event::MessageReplace { text } => {
                    return Step::Frame(self.replace_frame(text));
                }
                Event::RetrieverResources(resources) => {
                    self.state.set_retriever_resources(resources);
                }
                Event::AgentThought { agent_thought_id } => {
                    match self.repo.load_agent_thought(&agent_thought_id).await {
                        Ok(Some(record)) => return Step::Frame(self.thought_frame(record)),
                        Ok(None) => {
                            debug!(
                                task_id = %self.ctx.task_id,
                                agent_thought_id = %agent_thought_id,
                                "agent thought not found; skipped"
                            );
                        }
                        Err(e) => return Step::Last(Err(e)),
                    }
                }
                Event::MessageEnd(result) => {
                    let done = self.finish(Termination::MessageEnd(result)).await;
                    return Step::Last(done.map(|()| self.end_frame()));
                }
                Event::Stop => {
                    let done = self.finish(Termination::Stopped).await;
                    return Step::Last(done.map(|()| self.end_frame()));
                }
                Event::Error(failure) => return Step::Last(Err(self.translate(&failure))),
            }
        }
        Step::Done
    }

    async fn finish(&mut self, termination: Termination) -> Result<(), GenerateError> {
        self.finalizer
            .finalize(termination, &mut self.state, &self.ctx)
            .await
            .map(|_| ())
    }

    fn translate(&self, failure: &InvokeFailure) -> GenerateError {
        let err = GenerateError::from_failure(failure);
        if err.is_user_visible() {
            debug!(task_id = %self.ctx.task_id, error = %failure.message, "task failed");
        } else {
            warn!(
                task_id = %self.ctx.task_id,
                error = %failure.message,
                label = err.as_label(),
                "task failed"
            );
        }
        err
    }

    fn blocking_response(&self) -> BlockingResponse {
        BlockingResponse {
            event: "message",
            task_id: self.ctx.task_id.clone(),
            id: self.ctx.message_id.clone(),
            mode: self.ctx.app_mode,
            answer: self.state.answer().to_string(),
            metadata: self.state.metadata.clone(),
            created_at: self.ctx.created_at,
            conversation_id: self.ctx.frame_conversation_id(),
        }
    }

    fn message_frame(&self, delta: String) -> StreamFrame {
        StreamFrame::Message {
            task_id: self.ctx.task_id.clone(),
            message_id: self.ctx.message_id.clone(),
            answer: delta,
            created_at: self.ctx.created_at,
            conversation_id: self.ctx.frame_conversation_id(),
        }
    }

    fn replace_frame(&self, text: String) -> StreamFrame {
        StreamFrame::MessageReplace {
            task_id: self.ctx.task_id.clone(),
            message_id: self.ctx.message_id.clone(),
            answer: text,
            created_at: self.ctx.created_at,
            conversation_id: self.ctx.frame_conversation_id(),
        }
    }

    fn thought_frame(&self, record: AgentThoughtRecord) -> StreamFrame {
        StreamFrame::AgentThought {
            id: record.id,
            task_id: self.ctx.task_id.clone(),
            message_id: self.ctx.message_id.clone(),
            position: record.position,
            thought: record.thought,
            tool: record.tool,
            tool_input: record.tool_input,
            created_at: self.ctx.created_at,
            conversation_id: self.ctx.frame_conversation_id(),
        }
    }

    fn end_frame(&self) -> StreamFrame {
        StreamFrame::MessageEnd {
            task_id: self.ctx.task_id.clone(),
            id: self.ctx.message_id.clone(),
            metadata: (!self.state.metadata.is_empty()).then(|| self.state.metadata.clone()),
            conversation_id: self.ctx.frame_conversation_id(),
        }
    }
}
