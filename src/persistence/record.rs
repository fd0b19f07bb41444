//! # Persisted records.
//!
//! Plain owned values exchanged with a [`MessageRepository`](super::MessageRepository).
//! None of them hold a connection or session, so they are safe to move
//! across tasks.

use serde::{Deserialize, Serialize};

use crate::llm::ImageDetail;

/// An agent reasoning step, persisted by the generation pipeline before it is
/// announced on the bus.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentThoughtRecord {
    pub id: String,
    pub position: u32,
    pub thought: String,
    pub tool: String,
    pub tool_input: String,
}

/// File attached to a transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
    pub detail: ImageDetail,
}

impl FileDescriptor {
    pub fn image(data: impl Into<String>, detail: ImageDetail) -> Self {
        Self {
            kind: "image".to_string(),
            data: data.into(),
            detail,
        }
    }
}

/// One rendered prompt message, as stored alongside the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileDescriptor>>,
}

/// Final state of a generated message, written exactly once per task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinalMessage {
    pub message_id: String,
    pub conversation_id: Option<String>,
    /// Prompt transcript in persisted form.
    pub transcript: Vec<TranscriptEntry>,
    pub message_tokens: u32,
    pub message_unit_price: f64,
    pub message_price_unit: f64,
    /// Cleaned answer text.
    pub answer: String,
    pub answer_tokens: u32,
    pub answer_unit_price: f64,
    pub answer_price_unit: f64,
    pub total_price: f64,
    pub currency: String,
    /// Seconds between pipeline start and finalization.
    pub provider_response_latency: f64,
}
