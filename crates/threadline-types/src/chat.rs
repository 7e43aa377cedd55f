//! Local chat transcript types for Threadline.
//!
//! The transcript is what a user sees: the locally inserted greeting,
//! each message they typed, and each assistant reply that arrived.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assistant::{RunId, RunStatus};

/// A single entry in the local transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: true,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
        }
    }
}

/// Where a session is in its current send.
///
/// `Idle -> Sending -> Waiting -> {Delivered | NoReply | Failed}`. The
/// terminal states become the starting point of the next send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExchangeState {
    Idle,
    Sending,
    Waiting { run_id: RunId, polls: u32 },
    Delivered,
    NoReply,
    Failed,
}

impl ExchangeState {
    /// Whether a send is in flight (input should be disabled).
    pub fn is_busy(&self) -> bool {
        matches!(self, ExchangeState::Sending | ExchangeState::Waiting { .. })
    }
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeState::Idle => write!(f, "idle"),
            ExchangeState::Sending => write!(f, "sending"),
            ExchangeState::Waiting { polls, .. } => write!(f, "waiting ({polls} polls)"),
            ExchangeState::Delivered => write!(f, "delivered"),
            ExchangeState::NoReply => write!(f, "no_reply"),
            ExchangeState::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a send that reached a terminal run status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// The run produced an assistant reply; it was appended to the transcript.
    Delivered { run_id: RunId, reply: ChatMessage },
    /// The run ended without an assistant-authored text message.
    ///
    /// Nothing was appended. Typical causes are failed, cancelled or
    /// expired runs.
    NoReply { run_id: RunId, status: RunStatus },
}

impl ExchangeOutcome {
    pub fn run_id(&self) -> &RunId {
        match self {
            ExchangeOutcome::Delivered { run_id, .. } | ExchangeOutcome::NoReply { run_id, .. } => {
                run_id
            }
        }
    }

    pub fn reply(&self) -> Option<&ChatMessage> {
        match self {
            ExchangeOutcome::Delivered { reply, .. } => Some(reply),
            ExchangeOutcome::NoReply { .. } => None,
        }
    }
}
