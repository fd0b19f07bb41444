//! # taskrelay
//!
//! **Taskrelay** is a per-task event bus for LLM generation requests.
//!
//! A generation pipeline publishes typed events (chunks, replacements,
//! retrieval metadata, agent thoughts, the final result or a failure) into a
//! task-scoped queue. A listener drains that queue with a bounded lifetime,
//! keepalive pings and cross-request cancellation, and a response assembler
//! turns the events into either one aggregated response or a stream of SSE
//! frames, finalizing the task exactly once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   generation pipeline (spawned)                     stop request (other request)
//!            │                                                  │
//!            ▼                                                  ▼
//!     ┌─────────────┐   publish(Event)   ┌────────────┐   ┌─────────────┐
//!     │  Publisher  │ ─────────────────► │ TaskQueue  │   │ TaskControl │
//!     └─────────────┘ ◄── TaskCancelled  │ (mpsc +    │   │ ownership   │
//!                                        │  cancel    │   │ check       │
//!                                        │  token)    │   └──────┬──────┘
//!                                        └─────┬──────┘          │ raise flag
//!                                              ▼                 ▼
//!                                        ┌────────────┐   ┌──────────────┐
//!                                        │  Listener  │ ◄─│ KeyValueStore│
//!                                        │ tick, ping,│   └──────────────┘
//!                                        │ lifetime   │
//!                                        └─────┬──────┘
//!                                              ▼
//!                                  ┌───────────────────────┐
//!                                  │  ResponseAssembler    │
//!                                  │  blocking | streaming │
//!                                  └───────────┬───────────┘
//!                                              ▼
//!                                  ┌───────────────────────┐
//!                                  │  Finalizer (once)     │──► MessageRepository
//!                                  │                       │──► SubscriberSet
//!                                  └───────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! TaskBus::open(ids, owner) ──► record owner ──► (Publisher, Listener)
//!
//! listener loop {
//!   ├─► wait one tick for an envelope
//!   │       ├─ envelope ──► yield (nothing after a terminal event)
//!   │       └─ close    ──► end
//!   ├─► ticks_left -= 1
//!   ├─► ticks_left == 0       ─► inject Stop, cancel producer
//!   ├─► stop flag raised      ─► inject Stop, cancel producer
//!   └─► ticks_left % 10 == 0  ─► inject Ping
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                  |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Bus**           | Per-task queue, producer and consumer halves.                | [`TaskBus`], [`Publisher`], [`Listener`], [`Event`] |
//! | **Cancellation**  | Owner-checked stop requests through an external store.       | [`TaskControl`], [`KeyValueStore`]                  |
//! | **Responses**     | Blocking and streaming assembly, SSE frames.                 | [`ResponseAssembler`], [`StreamFrame`]              |
//! | **Finalization**  | Exactly-once persistence and notifications.                  | [`Finalizer`], [`MessageRepository`], [`Subscribe`] |
//! | **Errors**        | Typed publish, generation and store errors.                  | [`PublishError`], [`GenerateError`], [`StoreError`] |
//! | **Configuration** | TTLs, tick length, lifetime and keepalive budgets.           | [`Config`]                                          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use taskrelay::{
//!     AppMode, Config, Finalizer, GenerateError, InMemoryRepository, InvokeFrom, LlmResult,
//!     LlmResultChunk, LlmUsage, MemoryStore, ModelConfig, ModelMode, ModelRuntime,
//!     PromptMessage, Requester, ResponseAssembler, SubscriberSet, TaskBus, TaskContext,
//!     TaskControl, TaskIds,
//! };
//!
//! struct FreeModel;
//!
//! #[async_trait]
//! impl ModelRuntime for FreeModel {
//!     async fn count_tokens(&self, _: &str, _: &[PromptMessage]) -> Result<u32, GenerateError> {
//!         Ok(0)
//!     }
//!     async fn compute_usage(
//!         &self,
//!         _: &str,
//!         _: &HashMap<String, String>,
//!         _: u32,
//!         _: u32,
//!     ) -> Result<LlmUsage, GenerateError> {
//!         Ok(LlmUsage::default())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let control = TaskControl::new(Arc::new(MemoryStore::new()), &cfg);
//!     let bus = TaskBus::new(cfg, control);
//!
//!     let ids = TaskIds::new("task-1", "msg-1", None, AppMode::Completion);
//!     let ctx = TaskContext::new(&ids, ModelConfig::new("acme", "m1", ModelMode::Chat), 0);
//!     let (publisher, listener) = bus.open(ids, &Requester::new("u1", InvokeFrom::WebApp)).await?;
//!
//!     tokio::spawn(async move {
//!         publisher.publish_chunk(LlmResultChunk::text("m1", "Hello"))?;
//!         publisher.publish_message_end(LlmResult::default())
//!     });
//!
//!     let finalizer = Finalizer::new(
//!         Arc::new(FreeModel),
//!         Arc::new(InMemoryRepository::new()),
//!         Arc::new(SubscriberSet::empty()),
//!     );
//!     let response = ResponseAssembler::new(ctx, listener, finalizer).blocking().await?;
//!     assert_eq!(response.answer, "Hello");
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod llm;
mod persistence;
mod pipeline;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Config, Listener, Publisher, StopCause, TaskBus, TaskControl};
pub use error::{AUTHORIZATION_MESSAGE, GenerateError, PublishError, StoreError};
pub use events::{AppMode, Envelope, Event, EventKind, FailureKind, InvokeFailure, TaskIds, TaskQueue};
pub use llm::{
    ContentPart, ImageDetail, LlmResult, LlmResultChunk, LlmUsage, ModelConfig, ModelMode,
    ModelRuntime, PromptContent, PromptMessage, PromptMessageRole,
};
pub use persistence::{
    AgentThoughtRecord, FileDescriptor, FinalMessage, InMemoryRepository, MessageRepository,
    TranscriptEntry,
};
pub use pipeline::{
    BlockingResponse, Finalizer, RETRIEVER_RESOURCES, ResponseAssembler, StreamFrame, TaskContext,
    TaskState, Termination, remove_template_variables, render_transcript,
};
pub use store::{InvokeFrom, KeyValueStore, MemoryStore, OwnershipStore, Requester, StopSignalStore};
pub use subscribers::{Notification, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
