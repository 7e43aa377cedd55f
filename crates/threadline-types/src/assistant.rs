//! Remote assistant service types for Threadline.
//!
//! These model the resources of an Assistants-style API: an assistant,
//! a thread, a run of the assistant against a thread, and the messages
//! a thread accumulates. Identifiers are opaque strings issued by the
//! remote service and wrapped in newtypes so they cannot be mixed up.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

remote_id!(
    /// Opaque identifier of a remotely configured assistant (e.g. `asst_abc123`).
    AssistantId
);
remote_id!(
    /// Opaque identifier of a remote conversation thread (e.g. `thread_abc123`).
    ThreadId
);
remote_id!(
    /// Opaque identifier of one run of an assistant against a thread.
    RunId
);
remote_id!(
    /// Opaque identifier of a message within a thread.
    MessageId
);

/// Credentials supplied by the user to open a session.
///
/// Neither field is validated locally; the only validation is a
/// successful round-trip to the remote service. The API key is a
/// [`SecretString`] so it never shows up in `Debug` output or logs.
#[derive(Debug)]
pub struct Credentials {
    pub api_key: SecretString,
    pub assistant_id: AssistantId,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            assistant_id: AssistantId(assistant_id.into()),
        }
    }
}

/// Non-secret description of how a client is bound to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL the client talks to (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
}

/// Handles of an established session.
///
/// Created once by a successful initialization and never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandles {
    pub assistant_id: AssistantId,
    pub thread_id: ThreadId,
    pub client_config: ClientConfig,
}

/// An assistant resource as returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: AssistantId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// A conversation thread as returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
}

/// Role of a message within a remote thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Status of a run as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status this client does not know. Treated as terminal.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the run is still waiting to produce output.
    ///
    /// Only `queued` and `in_progress` keep the poller waiting; every
    /// other status ends the wait.
    pub fn is_pending(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(RunStatus::Queued),
            "in_progress" => Ok(RunStatus::InProgress),
            "requires_action" => Ok(RunStatus::RequiresAction),
            "cancelling" => Ok(RunStatus::Cancelling),
            "cancelled" => Ok(RunStatus::Cancelled),
            "failed" => Ok(RunStatus::Failed),
            "completed" => Ok(RunStatus::Completed),
            "incomplete" => Ok(RunStatus::Incomplete),
            "expired" => Ok(RunStatus::Expired),
            "unknown" => Ok(RunStatus::Unknown),
            other => Err(format!("invalid run status: '{other}'")),
        }
    }
}

/// A run of an assistant against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub status: RunStatus,
}

/// A message listed from a remote thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub id: MessageId,
    /// The run that produced this message; `None` for user-posted messages.
    pub run_id: Option<RunId>,
    pub role: MessageRole,
    /// Value of the first text content block, if the message has one.
    pub text: Option<String>,
    /// Creation time in Unix seconds.
    pub created_at: i64,
}
