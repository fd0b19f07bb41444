//! # Message repository capability
//!
//! `MessageRepository` abstracts the durable message store. The assembler reads
//! agent thoughts through it and the finalizer writes the final message.
//!
//! ## Contract
//! - `load_agent_thought` of an unknown id returns `Ok(None)`, not an error.
//! - `save_final_message` is called at most once per message id by this crate.

use async_trait::async_trait;

use super::record::{AgentThoughtRecord, FinalMessage};
use crate::error::GenerateError;

/// Contract for durable message stores.
#[async_trait]
pub trait MessageRepository: Send + Sync + 'static {
    /// Fetches a persisted agent thought by id.
    async fn load_agent_thought(&self, id: &str)
    -> Result<Option<AgentThoughtRecord>, GenerateError>;

    /// Persists the final state of a message.
    async fn save_final_message(&self, message: FinalMessage) -> Result<(), GenerateError>;
}
