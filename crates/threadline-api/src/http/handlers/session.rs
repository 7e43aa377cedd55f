//! Conversation session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions               - Initialize a session from credentials
//! - GET    /api/v1/sessions/{id}/messages - Transcript and waiting flag
//! - POST   /api/v1/sessions/{id}/messages - Send a message and wait for the reply
//! - DELETE /api/v1/sessions/{id}          - Drop a session, cancelling any wait

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use threadline_core::session::ConversationSession;
use threadline_types::assistant::{Assistant, Credentials, ThreadId};
use threadline_types::chat::{ChatMessage, ExchangeOutcome, ExchangeState};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::{AppState, SessionSlot};

/// Body of `POST /api/v1/sessions`.
///
/// Does NOT derive Debug: carries the API key.
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub api_key: String,
    pub assistant_id: String,
}

/// Body of `POST /api/v1/sessions/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub thread_id: ThreadId,
    pub assistant: Assistant,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeView {
    #[serde(flatten)]
    pub outcome: ExchangeOutcome,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptView {
    pub session_id: Uuid,
    pub thread_id: ThreadId,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub messages: Vec<ChatMessage>,
    pub waiting: bool,
    pub state: ExchangeState,
}

fn parse_session_id(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid session id: {s}")))
}

fn lookup(state: &AppState, id: &str) -> Result<(Uuid, std::sync::Arc<SessionSlot>), AppError> {
    let sid = parse_session_id(id)?;
    let slot = state.session(&sid).ok_or(AppError::SessionNotFound(sid))?;
    slot.touch();
    Ok((sid, slot))
}

/// POST /api/v1/sessions - Validate credentials, create a thread, return the greeting.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>), AppError> {
    let clock = RequestClock::start();

    // Passed through verbatim; the remote service is the only validator.
    let credentials = Credentials::new(body.api_key, body.assistant_id);
    let session = ConversationSession::initialize(&state.connector, &credentials, &state.config).await?;
    let messages = session.messages();
    let (session_id, slot) = state.insert_session(session);

    tracing::info!(%session_id, thread_id = %slot.thread_id, "session created");

    let resp = clock
        .finish(SessionView {
            session_id,
            thread_id: slot.thread_id.clone(),
            assistant: slot.assistant.clone(),
            messages,
        })
        .with_link("self", &format!("/api/v1/sessions/{session_id}"))
        .with_link("messages", &format!("/api/v1/sessions/{session_id}/messages"));

    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/v1/sessions/{id}/messages - Run one exchange.
///
/// Holds the session lock until the run settles; a concurrent send on the
/// same session gets 409 instead of queueing.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<ExchangeView>>, AppError> {
    let clock = RequestClock::start();
    let (session_id, slot) = lookup(&state, &id)?;

    let mut session = slot.session.try_lock().map_err(|_| AppError::SessionBusy)?;
    let result = session.send_message(&body.content, &slot.cancel).await;
    drop(session);
    slot.touch();
    let outcome = result?;

    let resp = clock
        .finish(ExchangeView {
            outcome,
            messages: slot.transcript.snapshot(),
        })
        .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id}/messages - Current transcript, readable mid-exchange.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TranscriptView>>, AppError> {
    let clock = RequestClock::start();
    let (session_id, slot) = lookup(&state, &id)?;

    let resp = clock
        .finish(TranscriptView {
            session_id,
            thread_id: slot.thread_id.clone(),
            created_at: slot.created_at,
            messages: slot.transcript.snapshot(),
            waiting: slot.is_waiting(),
            state: slot.exchange.borrow().clone(),
        })
        .with_link("self", &format!("/api/v1/sessions/{session_id}/messages"));

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Forget a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let clock = RequestClock::start();
    let sid = parse_session_id(&id)?;

    if !state.remove_session(&sid) {
        return Err(AppError::SessionNotFound(sid));
    }
    tracing::info!(session_id = %sid, "session deleted");

    Ok(Json(clock.finish(serde_json::json!({"deleted": true}))))
}
