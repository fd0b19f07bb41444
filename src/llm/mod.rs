//! LLM-facing data model and the model-runtime capability.
//!
//! ## Contents
//! - [`PromptMessage`], [`PromptContent`], [`ContentPart`] the prompt transcript
//! - [`LlmResult`], [`LlmResultChunk`], [`LlmUsage`] generation output and cost
//! - [`ModelRuntime`], [`ModelConfig`] the external token counter / pricer

mod message;
mod result;
mod runtime;

pub use message::{ContentPart, ImageDetail, PromptContent, PromptMessage, PromptMessageRole};
pub use result::{LlmResult, LlmResultChunk, LlmUsage};
pub use runtime::{ModelConfig, ModelMode, ModelRuntime};
