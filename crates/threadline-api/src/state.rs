//! Application state for the REST API.
//!
//! Sessions live in memory, keyed by a server-issued UUID. Each slot keeps
//! a transcript handle and a state receiver next to the locked session so
//! reads never wait on an in-flight exchange.
//!
//! A widget that reloads never deletes its session, so slots left idle
//! past `session_idle_timeout_secs` are swept by a background task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use threadline_core::session::ConversationSession;
use threadline_core::transcript::Transcript;
use threadline_infra::assistant::{OpenAiAssistantClient, OpenAiConnector};
use threadline_types::assistant::{Assistant, ThreadId};
use threadline_types::chat::ExchangeState;
use threadline_types::config::ChatConfig;

pub type ApiSession = ConversationSession<OpenAiAssistantClient>;

/// One conversation held by the server.
pub struct SessionSlot {
    /// Locked for the duration of a send; `try_lock` failure means busy.
    pub session: Mutex<ApiSession>,
    pub transcript: Transcript,
    pub exchange: watch::Receiver<ExchangeState>,
    /// Cancelled when the session is deleted or the server shuts down.
    pub cancel: CancellationToken,
    pub thread_id: ThreadId,
    pub assistant: Assistant,
    pub created_at: DateTime<Utc>,
    opened: Instant,
    /// Milliseconds after `opened` of the last request that touched the slot.
    last_active_ms: AtomicU64,
}

impl SessionSlot {
    fn new(session: ApiSession, cancel: CancellationToken) -> Self {
        Self {
            opened: Instant::now(),
            last_active_ms: AtomicU64::new(0),
            transcript: session.transcript(),
            exchange: session.subscribe(),
            thread_id: session.handles().thread_id.clone(),
            assistant: session.assistant().clone(),
            session: Mutex::new(session),
            cancel,
            created_at: Utc::now(),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.exchange.borrow().is_busy()
    }

    /// Record activity on the session.
    pub fn touch(&self) {
        let ms = self.opened.elapsed().as_millis() as u64;
        self.last_active_ms.store(ms, Ordering::Relaxed);
    }

    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_active_ms.load(Ordering::Relaxed));
        self.opened.elapsed().saturating_sub(last)
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatConfig>,
    pub connector: OpenAiConnector,
    pub sessions: Arc<DashMap<Uuid, Arc<SessionSlot>>>,
    /// Parent of every session token; cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            connector: OpenAiConnector::from_config(&config),
            config: Arc::new(config),
            sessions: Arc::new(DashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a freshly initialized session and return its id.
    pub fn insert_session(&self, session: ApiSession) -> (Uuid, Arc<SessionSlot>) {
        let id = Uuid::now_v7();
        let slot = Arc::new(SessionSlot::new(session, self.shutdown.child_token()));
        self.sessions.insert(id, slot.clone());
        (id, slot)
    }

    pub fn session(&self, id: &Uuid) -> Option<Arc<SessionSlot>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a session and cancel any exchange still waiting on it.
    pub fn remove_session(&self, id: &Uuid) -> bool {
        match self.sessions.remove(id) {
            Some((_, slot)) => {
                slot.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop every session idle for at least `max_idle`. Sessions with a
    /// pending exchange are kept. Returns how many were removed.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let stale: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| !entry.is_waiting() && entry.idle_for() >= max_idle)
            .map(|entry| *entry.key())
            .collect();

        let removed = stale.iter().filter(|id| self.remove_session(id)).count();
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "idle sessions swept");
        }
        removed
    }

    /// Sweep idle sessions every `every` until shutdown.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = state.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        state.sweep_idle(max_idle);
                    }
                }
            }
            tracing::debug!("idle session sweeper stopped");
        })
    }
}
