//! Prompt transcript in its persisted form.
//!
//! Chat models keep every system/user/assistant message, with image parts
//! split out as truncated file descriptors. Completion models keep only the
//! first prompt, as a single user entry.

use crate::llm::{ContentPart, ModelMode, PromptContent, PromptMessage, PromptMessageRole};
use crate::persistence::{FileDescriptor, TranscriptEntry};

const TRUNCATION_MARKER: &str = "...[TRUNCATED]...";
const KEPT_CHARS: usize = 10;

/// Renders `messages` for storage.
pub fn render(mode: ModelMode, messages: &[PromptMessage]) -> Vec<TranscriptEntry> {
    match mode {
        ModelMode::Chat => messages.iter().filter_map(chat_entry).collect(),
        ModelMode::Completion => messages
            .first()
            .map(|m| TranscriptEntry {
                role: "user".to_string(),
                text: m.content.text(),
                files: None,
            })
            .into_iter()
            .collect(),
    }
}

fn chat_entry(message: &PromptMessage) -> Option<TranscriptEntry> {
    let role = match message.role {
        PromptMessageRole::System => "system",
        PromptMessageRole::User => "user",
        PromptMessageRole::Assistant => "assistant",
        PromptMessageRole::Tool => return None,
    };

    let mut text = String::new();
    let mut files = Vec::new();
    match &message.content {
        PromptContent::Text(t) => text.push_str(t),
        PromptContent::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { data } => text.push_str(data),
                    ContentPart::Image { data, detail } => {
                        files.push(FileDescriptor::image(truncate(data), *detail));
                    }
                }
            }
        }
    }

    Some(TranscriptEntry {
        role: role.to_string(),
        text,
        files: Some(files),
    })
}

/// Keeps the first and last ten characters of an image payload.
fn truncate(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    let head: String = chars.iter().take(KEPT_CHARS).collect();
    let tail: String = chars[chars.len().saturating_sub(KEPT_CHARS)..].iter().collect();
    format!("{head}{TRUNCATION_MARKER}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageDetail;

    #[test]
    fn chat_splits_parts_and_skips_tools() {
        let image = format!("data:image/png;base64,{}", "A".repeat(64) + "0123456789");
        let messages = vec![
            PromptMessage::system("be brief"),
            PromptMessage::new(
                PromptMessageRole::User,
                PromptContent::Parts(vec![
                    ContentPart::Text { data: "what is ".into() },
                    ContentPart::Image {
                        data: image,
                        detail: ImageDetail::High,
                    },
                    ContentPart::Text { data: "this?".into() },
                ]),
            ),
            PromptMessage::new(PromptMessageRole::Tool, PromptContent::Text("{}".into())),
            PromptMessage::assistant("a cat"),
        ];

        let entries = render(ModelMode::Chat, &messages);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].role, "system");
        assert_eq!(entries[0].files, Some(vec![]));
        assert_eq!(entries[1].text, "what is this?");
        assert_eq!(
            entries[1].files,
            Some(vec![FileDescriptor::image(
                "data:image...[TRUNCATED]...0123456789",
                ImageDetail::High
            )])
        );
        assert_eq!(entries[2].role, "assistant");
    }

    #[test]
    fn completion_keeps_first_prompt_only() {
        let messages = vec![PromptMessage::user("write a haiku"), PromptMessage::assistant("x")];
        let entries = render(ModelMode::Completion, &messages);
        assert_eq!(
            entries,
            vec![TranscriptEntry {
                role: "user".into(),
                text: "write a haiku".into(),
                files: None,
            }]
        );
        assert!(render(ModelMode::Completion, &[]).is_empty());
    }

    #[test]
    fn short_payloads_overlap_like_slices() {
        assert_eq!(truncate("abc"), "abc...[TRUNCATED]...abc");
    }
}
