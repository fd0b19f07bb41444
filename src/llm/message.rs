//! # Prompt messages.
//!
//! A [`PromptMessage`] is one entry of the transcript sent to the model. Its
//! content is either plain text or a list of typed parts (text and images).

use serde::{Deserialize, Serialize};

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Requested fidelity for an image part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageDetail {
    #[default]
    Low,
    High,
}

impl ImageDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
        }
    }
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { data: String },
    /// Image payload: a URL or an inline base64 data URI.
    Image { data: String, detail: ImageDetail },
}

/// Message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Default for PromptContent {
    fn default() -> Self {
        PromptContent::Text(String::new())
    }
}

impl PromptContent {
    /// Concatenated text of the content, ignoring non-text parts.
    pub fn text(&self) -> String {
        match self {
            PromptContent::Text(t) => t.clone(),
            PromptContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { data } => Some(data.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect(),
        }
    }
}

/// A single prompt transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptMessageRole,
    pub content: PromptContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PromptMessage {
    pub fn new(role: PromptMessageRole, content: PromptContent) -> Self {
        Self {
            role,
            content,
            name: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(PromptMessageRole::System, PromptContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(PromptMessageRole::User, PromptContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(PromptMessageRole::Assistant, PromptContent::Text(text.into()))
    }

    /// Attaches a participant name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_skips_images() {
        let content = PromptContent::Parts(vec![
            ContentPart::Text { data: "look ".into() },
            ContentPart::Image {
                data: "https://img".into(),
                detail: ImageDetail::High,
            },
            ContentPart::Text { data: "here".into() },
        ]);
        assert_eq!(content.text(), "look here");
    }
}
