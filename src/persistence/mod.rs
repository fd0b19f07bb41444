//! Durable message storage consumed by the response pipeline.
//!
//! ## Contents
//! - [`MessageRepository`] the injected capability (agent thoughts in, final message out)
//! - [`InMemoryRepository`] in-process implementation
//! - [`AgentThoughtRecord`], [`FinalMessage`], [`TranscriptEntry`], [`FileDescriptor`] records

mod memory;
mod record;
mod repository;

pub use memory::InMemoryRepository;
pub use record::{AgentThoughtRecord, FileDescriptor, FinalMessage, TranscriptEntry};
pub use repository::MessageRepository;
