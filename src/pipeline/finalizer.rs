//! # Terminal finalization.
//!
//! [`Finalizer`] turns the task's accumulated state into a persisted
//! [`FinalMessage`] and announces it to subscribers. It runs at most once per
//! task, no matter how many terminal-looking events reach it.
//!
//! ## Flow
//! ```text
//! finalize(termination, state, ctx)
//!   ├─► already finalized?            ── yes ─► Ok(false)
//!   ├─► MessageEnd(result)            ─► usage from the result
//!   │   Stopped                       ─► count prompt + answer tokens, compute usage
//!   ├─► save_final_message(FinalMessage)
//!   └─► emit MessageCreated           ─► Ok(true)
//! ```

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use super::context::TaskContext;
use super::state::TaskState;
use super::template::remove_template_variables;
use super::transcript;
use crate::error::GenerateError;
use crate::llm::{LlmResult, ModelRuntime, PromptMessage};
use crate::persistence::{FinalMessage, MessageRepository};
use crate::subscribers::{Notification, SubscriberSet};

/// How a task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// The producer reported a final result.
    MessageEnd(LlmResult),
    /// The task was stopped (lifetime expiry, stop request or producer stop);
    /// usage has to be computed from what was accumulated.
    Stopped,
}

/// Exactly-once persistence of a task's result.
pub struct Finalizer {
    runtime: Arc<dyn ModelRuntime>,
    repo: Arc<dyn MessageRepository>,
    notifications: Arc<SubscriberSet>,
    started_at: Instant,
    finalized: bool,
}

impl Finalizer {
    /// Creates a finalizer; latency is measured from this call.
    pub fn new(
        runtime: Arc<dyn ModelRuntime>,
        repo: Arc<dyn MessageRepository>,
        notifications: Arc<SubscriberSet>,
    ) -> Self {
        Self {
            runtime,
            repo,
            notifications,
            started_at: Instant::now(),
            finalized: false,
        }
    }

    /// Repository the final message is written to.
    pub fn repository(&self) -> &Arc<dyn MessageRepository> {
        &self.repo
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Persists the final message. Returns `false` if the task was already finalized.
    ///
    /// The guard is set before any collaborator is called, so a failed
    /// finalization is not retried either.
    pub async fn finalize(
        &mut self,
        termination: Termination,
        state: &mut TaskState,
        ctx: &TaskContext,
    ) -> Result<bool, GenerateError> {
        if self.finalized {
            debug!(task_id = %ctx.task_id, "already finalized");
            return Ok(false);
        }
        self.finalized = true;

        match termination {
            Termination::MessageEnd(result) => state.apply_final(result),
            Termination::Stopped => {
                let model = ctx.model.model.as_str();
                let prompt_tokens = self
                    .runtime
                    .count_tokens(model, &state.result.prompt_messages)
                    .await?;
                let completion_tokens = self
                    .runtime
                    .count_tokens(model, &[PromptMessage::assistant(state.answer())])
                    .await?;
                state.result.usage = self
                    .runtime
                    .compute_usage(model, &ctx.model.credentials, prompt_tokens, completion_tokens)
                    .await?;
            }
        }

        let message = self.final_message(state, ctx);
        let total_price = message.total_price;
        self.repo.save_final_message(message).await?;

        self.notifications.emit(Notification::MessageCreated {
            message_id: ctx.message_id.clone(),
            conversation_id: ctx.conversation_id.clone(),
            is_first_message: ctx.is_first_message,
            extras: ctx.extras.clone(),
        });

        info!(
            task_id = %ctx.task_id,
            message_id = %ctx.message_id,
            total_tokens = state.result.usage.total_tokens,
            total_price,
            "task finalized"
        );
        Ok(true)
    }

    fn final_message(&self, state: &TaskState, ctx: &TaskContext) -> FinalMessage {
        let usage = &state.result.usage;
        let answer = state.answer().trim();
        FinalMessage {
            message_id: ctx.message_id.clone(),
            conversation_id: ctx.conversation_id.clone(),
            transcript: transcript::render(ctx.model.mode, &state.result.prompt_messages),
            message_tokens: usage.prompt_tokens,
            message_unit_price: usage.prompt_unit_price,
            message_price_unit: usage.prompt_price_unit,
            answer: remove_template_variables(answer),
            answer_tokens: usage.completion_tokens,
            answer_unit_price: usage.completion_unit_price,
            answer_price_unit: usage.completion_price_unit,
            total_price: usage.total_price,
            currency: usage.currency.clone(),
            provider_response_latency: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::events::{AppMode, TaskIds};
    use crate::llm::{LlmResultChunk, LlmUsage, ModelConfig, ModelMode};
    use crate::persistence::InMemoryRepository;

    /// Counts one token per character and prices each token at 0.001.
    #[derive(Default)]
    pub(crate) struct CharRuntime {
        pub(crate) usage_calls: AtomicU32,
    }

    #[async_trait]
    impl ModelRuntime for CharRuntime {
        async fn count_tokens(
            &self,
            _model: &str,
            messages: &[PromptMessage],
        ) -> Result<u32, GenerateError> {
            Ok(messages.iter().map(|m| m.content.text().chars().count() as u32).sum())
        }

        async fn compute_usage(
            &self,
            _model: &str,
            _credentials: &HashMap<String, String>,
            prompt_tokens: u32,
            completion_tokens: u32,
        ) -> Result<LlmUsage, GenerateError> {
            self.usage_calls.fetch_add(1, Ordering::SeqCst);
            let total_tokens = prompt_tokens + completion_tokens;
            Ok(LlmUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
                total_price: f64::from(total_tokens) * 0.001,
                currency: "USD".into(),
                ..Default::default()
            })
        }
    }

    pub(crate) fn context(mode: AppMode) -> TaskContext {
        let ids = TaskIds::new("t1", "m1", Some("c1".into()), mode);
        TaskContext::new(&ids, ModelConfig::new("openai", "gpt", ModelMode::Chat), 1_700_000_000)
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_task_computes_usage_from_accumulated_text() {
        let runtime = Arc::new(CharRuntime::default());
        let repo = Arc::new(InMemoryRepository::new());
        let mut finalizer = Finalizer::new(runtime.clone(), repo.clone(), Arc::default());

        let ctx = context(AppMode::Chat);
        let mut state = TaskState::new("gpt");
        state.append_chunk(
            &LlmResultChunk::text("gpt", "  Hi {{name}}  ")
                .with_prompt_messages(vec![PromptMessage::user("hello")]),
        );

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!(finalizer.finalize(Termination::Stopped, &mut state, &ctx).await.unwrap());

        let saved = repo.saved_messages().await;
        assert_eq!(saved.len(), 1);
        let msg = &saved[0];
        assert_eq!(msg.answer, "Hi {name}");
        assert_eq!(msg.message_tokens, 5);
        assert_eq!(msg.answer_tokens, 15);
        assert_eq!(msg.currency, "USD");
        assert_eq!(msg.transcript.len(), 1);
        assert!((msg.provider_response_latency - 1.5).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn finalizes_exactly_once() {
        let runtime = Arc::new(CharRuntime::default());
        let repo = Arc::new(InMemoryRepository::new());
        let mut finalizer = Finalizer::new(runtime.clone(), repo.clone(), Arc::default());
        let ctx = context(AppMode::Completion);
        let mut state = TaskState::new("gpt");

        let end = LlmResult {
            message: "done".into(),
            ..Default::default()
        };
        assert!(finalizer
            .finalize(Termination::MessageEnd(end), &mut state, &ctx)
            .await
            .unwrap());
        assert!(!finalizer
            .finalize(Termination::Stopped, &mut state, &ctx)
            .await
            .unwrap());

        assert!(finalizer.is_finalized());
        assert_eq!(repo.saved_messages().await.len(), 1);
        // The late stop never reached the pricing path.
        assert_eq!(runtime.usage_calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.answer(), "done");
    }
}
