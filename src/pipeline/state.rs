//! Consumer-side accumulation of a task's output.

use serde_json::{Map, Value};

use crate::llm::{LlmResult, LlmResultChunk};

/// Metadata key under which retrieval resources are reported.
pub const RETRIEVER_RESOURCES: &str = "retriever_resources";

/// Running result of one task. Owned and mutated by the assembler only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskState {
    pub result: LlmResult,
    pub metadata: Map<String, Value>,
}

impl TaskState {
    /// Empty state for `model`, with zeroed usage.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            result: LlmResult::empty(model),
            metadata: Map::new(),
        }
    }

    /// Appends a chunk's text.
    ///
    /// The first chunk carrying text also seeds the prompt transcript. Returns
    /// the appended delta, or `None` when the chunk has no text to show.
    pub fn append_chunk(&mut self, chunk: &LlmResultChunk) -> Option<String> {
        let delta = chunk.delta.as_deref().filter(|d| !d.is_empty())?;
        if self.result.prompt_messages.is_empty() {
            self.result.prompt_messages = chunk.prompt_messages.clone();
        }
        self.result.message.push_str(delta);
        Some(delta.to_string())
    }

    /// Records retrieval resources, replacing any earlier ones.
    pub fn set_retriever_resources(&mut self, resources: Vec<Value>) {
        self.metadata
            .insert(RETRIEVER_RESOURCES.to_string(), Value::Array(resources));
    }

    /// Takes the final result reported by the producer.
    ///
    /// Text and transcript fall back to what was accumulated when the producer
    /// left them empty.
    pub fn apply_final(&mut self, result: LlmResult) {
        let LlmResult {
            model,
            prompt_messages,
            message,
            usage,
        } = result;
        if !model.is_empty() {
            self.result.model = model;
        }
        if !prompt_messages.is_empty() {
            self.result.prompt_messages = prompt_messages;
        }
        if !message.is_empty() {
            self.result.message = message;
        }
        self.result.usage = usage;
    }

    /// Accumulated answer text.
    pub fn answer(&self) -> &str {
        &self.result.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmUsage, PromptMessage};
    use serde_json::json;

    #[test]
    fn chunks_accumulate_and_seed_transcript_once() {
        let mut state = TaskState::new("m");
        let first = LlmResultChunk::text("m", "Hel").with_prompt_messages(vec![PromptMessage::user("hi")]);
        let second = LlmResultChunk::text("m", "lo").with_prompt_messages(vec![PromptMessage::user("other")]);

        assert_eq!(state.append_chunk(&first).as_deref(), Some("Hel"));
        assert_eq!(state.append_chunk(&second).as_deref(), Some("lo"));
        assert_eq!(state.answer(), "Hello");
        assert_eq!(state.result.prompt_messages, vec![PromptMessage::user("hi")]);
    }

    #[test]
    fn empty_deltas_are_ignored() {
        let mut state = TaskState::new("m");
        let none = LlmResultChunk {
            delta: None,
            prompt_messages: vec![PromptMessage::user("hi")],
            ..Default::default()
        };
        assert_eq!(state.append_chunk(&none), None);
        assert_eq!(state.append_chunk(&LlmResultChunk::text("m", "")), None);
        assert!(state.result.prompt_messages.is_empty());
    }

    #[test]
    fn final_result_falls_back_to_accumulated() {
        let mut state = TaskState::new("m");
        state.append_chunk(&LlmResultChunk::text("m", "partial").with_prompt_messages(vec![PromptMessage::user("q")]));
        state.apply_final(LlmResult {
            usage: LlmUsage {
                total_tokens: 7,
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(state.answer(), "partial");
        assert_eq!(state.result.model, "m");
        assert_eq!(state.result.prompt_messages.len(), 1);
        assert_eq!(state.result.usage.total_tokens, 7);
    }

    #[test]
    fn resources_replace_previous() {
        let mut state = TaskState::new("m");
        state.set_retriever_resources(vec![json!({"a": 1})]);
        state.set_retriever_resources(vec![json!({"b": 2})]);
        assert_eq!(state.metadata[RETRIEVER_RESOURCES], json!([{"b": 2}]));
    }
}
