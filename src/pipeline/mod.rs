//! Consumer-side pipeline: from listener events to responses and a persisted message.
//!
//! ## Contents
//! - [`ResponseAssembler`] blocking and streaming drains of one task
//! - [`TaskState`] accumulated answer, transcript and metadata
//! - [`Finalizer`] exactly-once persistence and notification
//! - [`StreamFrame`], [`BlockingResponse`] wire payloads
//! - [`TaskContext`] request-scoped identifiers and model selection
//! - [`remove_template_variables`] answer cleanup applied before persisting

mod assembler;
mod context;
mod finalizer;
mod frame;
mod state;
mod template;
mod transcript;

pub use assembler::ResponseAssembler;
pub use context::TaskContext;
pub use finalizer::{Finalizer, Termination};
pub use frame::{BlockingResponse, StreamFrame};
pub use state::{RETRIEVER_RESOURCES, TaskState};
pub use template::remove_template_variables;
pub use transcript::render as render_transcript;
