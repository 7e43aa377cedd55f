//! OpenAI Assistants v2 request and response bodies.
//!
//! Only the fields Threadline reads are modelled; everything else in the
//! responses is ignored by serde.

use serde::{Deserialize, Serialize};

use threadline_types::assistant::{
    Assistant, AssistantId, MessageId, MessageRole, RemoteMessage, Run, RunId, RunStatus, Thread,
    ThreadId,
};

/// Body of `POST /threads/{thread_id}/messages`.
#[derive(Debug, Serialize)]
pub struct CreateMessageBody<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

/// Body of `POST /threads/{thread_id}/runs`.
#[derive(Debug, Serialize)]
pub struct CreateRunBody<'a> {
    pub assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AssistantObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl From<AssistantObject> for Assistant {
    fn from(a: AssistantObject) -> Self {
        Assistant {
            id: AssistantId(a.id),
            name: a.name,
            model: a.model,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

impl From<ThreadObject> for Thread {
    fn from(t: ThreadObject) -> Self {
        Thread {
            id: ThreadId(t.id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
}

impl From<RunObject> for Run {
    fn from(r: RunObject) -> Self {
        Run {
            id: RunId(r.id),
            thread_id: ThreadId(r.thread_id),
            status: r.status,
        }
    }
}

/// A content block of a thread message. Non-text blocks (images, files)
/// deserialize as `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageObject {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub created_at: i64,
}

impl From<MessageObject> for RemoteMessage {
    fn from(m: MessageObject) -> Self {
        let text = m.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.value),
            ContentBlock::Other => None,
        });
        RemoteMessage {
            id: MessageId(m.id),
            run_id: m.run_id.map(RunId),
            role: m.role,
            text,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_takes_first_text_block() {
        let raw = json!({
            "id": "msg_1",
            "object": "thread.message",
            "created_at": 1_700_000_000,
            "thread_id": "thread_1",
            "role": "assistant",
            "run_id": "run_1",
            "assistant_id": "asst_1",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "file_1"}},
                {"type": "text", "text": {"value": "Hello there", "annotations": []}},
                {"type": "text", "text": {"value": "ignored", "annotations": []}}
            ]
        });
        let msg: RemoteMessage = serde_json::from_value::<MessageObject>(raw).unwrap().into();
        assert_eq!(msg.text.as_deref(), Some("Hello there"));
        assert_eq!(msg.run_id.unwrap().as_str(), "run_1");
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.created_at, 1_700_000_000);
    }

    #[test]
    fn user_message_has_null_run_id() {
        let raw = json!({
            "id": "msg_2",
            "role": "user",
            "run_id": null,
            "created_at": 5,
            "content": [{"type": "text", "text": {"value": "hi", "annotations": []}}]
        });
        let msg: RemoteMessage = serde_json::from_value::<MessageObject>(raw).unwrap().into();
        assert!(msg.run_id.is_none());
        assert_eq!(msg.role, MessageRole::User);
    }

    #[test]
    fn run_status_reads_wire_name() {
        let raw = json!({
            "id": "run_1",
            "object": "thread.run",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "requires_action"
        });
        let run: Run = serde_json::from_value::<RunObject>(raw).unwrap().into();
        assert_eq!(run.status, RunStatus::RequiresAction);
    }

    #[test]
    fn unrecognized_run_status_still_decodes() {
        let raw = json!({
            "id": "run_2",
            "object": "thread.run",
            "thread_id": "thread_1",
            "status": "paused"
        });
        let run: Run = serde_json::from_value::<RunObject>(raw).unwrap().into();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_pending());
    }

    #[test]
    fn create_message_body_shape() {
        let body = CreateMessageBody {
            role: MessageRole::User,
            content: "hello",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
    }
}
