//! # Model runtime capability.
//!
//! The finalizer needs token counts and prices when a task ends without an
//! explicit `MessageEnd` (lifetime expiry or cancellation). Both come from the
//! model provider, so they are consumed through [`ModelRuntime`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::message::PromptMessage;
use super::result::LlmUsage;
use crate::error::GenerateError;

/// Whether the model takes a chat transcript or a single completion prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    #[default]
    Chat,
    Completion,
}

/// Model selection for one task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub mode: ModelMode,
    /// Provider credentials, handed back to [`ModelRuntime::compute_usage`].
    #[serde(default)]
    pub credentials: HashMap<String, String>,
}

impl ModelConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, mode: ModelMode) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            mode,
            credentials: HashMap::new(),
        }
    }
}

/// Token counting and pricing, implemented by the model provider layer.
#[async_trait]
pub trait ModelRuntime: Send + Sync + 'static {
    /// Number of tokens `messages` occupy for `model`.
    async fn count_tokens(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<u32, GenerateError>;

    /// Usage and cost for the given token counts.
    async fn compute_usage(
        &self,
        model: &str,
        credentials: &HashMap<String, String>,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> Result<LlmUsage, GenerateError>;
}
