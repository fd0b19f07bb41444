//! # Wire-level payloads.
//!
//! Streaming mode yields [`StreamFrame`]s; each renders to one SSE record
//! through [`StreamFrame::to_sse`]:
//! ```text
//! data: {"event":"message","task_id":"t1","message_id":"m1","answer":"Hel","created_at":1700000000}\n\n
//! event: ping\n\n
//! ```
//! Blocking mode returns a single [`BlockingResponse`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::events::AppMode;

/// One streaming frame.
///
/// `conversation_id` is present on every frame of a chat-mode task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Incremental answer text.
    Message {
        task_id: String,
        message_id: String,
        answer: String,
        created_at: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },
    /// Display-level replacement of the whole answer.
    MessageReplace {
        task_id: String,
        message_id: String,
        answer: String,
        created_at: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },
    /// One agent reasoning step.
    AgentThought {
        id: String,
        task_id: String,
        message_id: String,
        position: u32,
        thought: String,
        tool: String,
        tool_input: String,
        created_at: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },
    /// Last frame of a successful stream.
    MessageEnd {
        task_id: String,
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Map<String, Value>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },
    /// Keepalive.
    Ping,
}

impl StreamFrame {
    /// Stable event name of the frame.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamFrame::Message { .. } => "message",
            StreamFrame::MessageReplace { .. } => "message_replace",
            StreamFrame::AgentThought { .. } => "agent_thought",
            StreamFrame::MessageEnd { .. } => "message_end",
            StreamFrame::Ping => "ping",
        }
    }

    /// Renders the frame as one SSE record.
    pub fn to_sse(&self) -> Result<String, serde_json::Error> {
        match self {
            StreamFrame::Ping => Ok("event: ping\n\n".to_string()),
            frame => Ok(format!("data: {}\n\n", serde_json::to_string(frame)?)),
        }
    }
}

/// Aggregated response of a blocking request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockingResponse {
    /// Always `"message"`.
    pub event: &'static str,
    pub task_id: String,
    /// Message id.
    pub id: String,
    pub mode: AppMode,
    pub answer: String,
    pub metadata: Map<String, Value>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ping_renders_as_sse_event() {
        assert_eq!(StreamFrame::Ping.to_sse().unwrap(), "event: ping\n\n");
    }

    #[test]
    fn message_frame_shape() {
        let frame = StreamFrame::Message {
            task_id: "t1".into(),
            message_id: "m1".into(),
            answer: "Hel".into(),
            created_at: 1_700_000_000,
            conversation_id: Some("c1".into()),
        };
        let sse = frame.to_sse().unwrap();
        assert!(sse.starts_with("data: ") && sse.ends_with("\n\n"));

        let body: Value = serde_json::from_str(sse.trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(
            body,
            json!({
                "event": "message",
                "task_id": "t1",
                "message_id": "m1",
                "answer": "Hel",
                "created_at": 1_700_000_000,
                "conversation_id": "c1",
            })
        );
    }

    #[test]
    fn message_end_omits_empty_optionals() {
        let frame = StreamFrame::MessageEnd {
            task_id: "t1".into(),
            id: "m1".into(),
            metadata: None,
            conversation_id: None,
        };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"event": "message_end", "task_id": "t1", "id": "m1"})
        );
    }

    #[test]
    fn blocking_response_shape() {
        let resp = BlockingResponse {
            event: "message",
            task_id: "t1".into(),
            id: "m1".into(),
            mode: AppMode::Completion,
            answer: "done".into(),
            metadata: Map::new(),
            created_at: 5,
            conversation_id: None,
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "event": "message",
                "task_id": "t1",
                "id": "m1",
                "mode": "completion",
                "answer": "done",
                "metadata": {},
                "created_at": 5,
            })
        );
    }
}
