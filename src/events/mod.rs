//! Task events: data model and per-task queue.
//!
//! This module groups the event **data model** and the **queue** that carries
//! it from the generation pipeline to the response assembler.
//!
//! ## Contents
//! - [`Event`], [`EventKind`], [`InvokeFailure`] payloads and classification
//! - [`Envelope`], [`TaskIds`], [`AppMode`] task-scoped wrapper
//! - [`TaskQueue`] thin wrapper over an unbounded `tokio::sync::mpsc`
//!
//! ## Quick reference
//! - **Publishers**: [`Publisher`](crate::Publisher) (content, errors, stop) and
//!   [`Listener`](crate::Listener) (synthetic `Ping` / `Stop`).
//! - **Consumer**: [`Listener`](crate::Listener), drained by
//!   [`ResponseAssembler`](crate::ResponseAssembler).

mod envelope;
mod event;
mod queue;

pub use envelope::{AppMode, Envelope, TaskIds};
pub use event::{Event, EventKind, FailureKind, InvokeFailure};
pub use queue::TaskQueue;
pub(crate) use queue::Slot;
