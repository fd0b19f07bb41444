//! # Generation output and usage accounting.

use serde::{Deserialize, Serialize};

use super::message::PromptMessage;

/// Token counts and prices for one generation.
///
/// Prices are expressed in `currency`; `*_price_unit` is the multiplier the
/// provider quotes unit prices in (e.g. `0.001` for "per 1K tokens").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub prompt_unit_price: f64,
    pub prompt_price_unit: f64,
    pub prompt_price: f64,
    pub completion_tokens: u32,
    pub completion_unit_price: f64,
    pub completion_price_unit: f64,
    pub completion_price: f64,
    pub total_tokens: u32,
    pub total_price: f64,
    pub currency: String,
    /// Provider latency in seconds.
    pub latency: f64,
}

/// Aggregated result of a finished generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlmResult {
    pub model: String,
    pub prompt_messages: Vec<PromptMessage>,
    /// Assembled assistant text.
    pub message: String,
    pub usage: LlmUsage,
}

impl LlmResult {
    /// Empty result for `model`, used to seed the consumer-side state.
    pub fn empty(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

/// One incremental piece of a generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlmResultChunk {
    pub model: String,
    pub prompt_messages: Vec<PromptMessage>,
    /// Text delta; `None` for chunks that carry no text (e.g. tool-call deltas).
    pub delta: Option<String>,
}

impl LlmResultChunk {
    /// Chunk carrying `delta` for `model`.
    pub fn text(model: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt_messages: Vec::new(),
            delta: Some(delta.into()),
        }
    }

    /// Attaches the prompt transcript the chunk was generated from.
    #[inline]
    pub fn with_prompt_messages(mut self, messages: Vec<PromptMessage>) -> Self {
        self.prompt_messages = messages;
        self
    }
}
