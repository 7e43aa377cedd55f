//! Conversation session against a remote assistant.
//!
//! A [`ConversationSession`] is created by [`ConversationSession::initialize`]
//! (client bound to the API key, assistant looked up, thread created,
//! greeting inserted) and then drives one exchange per
//! [`ConversationSession::send_message`] call:
//!
//! 1. append the user message to the transcript (before any network call)
//! 2. post it to the thread
//! 3. start a run of the assistant
//! 4. poll the run until it settles (bounded and cancellable)
//! 5. list the thread and append the run's latest assistant reply, if any
//!
//! `send_message` takes `&mut self`, so one session never has two
//! exchanges in flight. Dropping the future before it settles marks the
//! exchange `Failed`, so the session never stays stuck waiting.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use threadline_types::assistant::{
    Assistant, Credentials, MessageRole, SessionHandles, Thread,
};
use threadline_types::chat::{ChatMessage, ExchangeOutcome, ExchangeState};
use threadline_types::config::ChatConfig;
use threadline_types::error::{AssistantApiError, ExchangeFailure, InitializationFailure};

use crate::assistant::client::{AssistantClient, AssistantConnector};
use crate::assistant::reply::select_reply;
use crate::run::{wait_for_run, PollSettings};
use crate::transcript::Transcript;

pub struct ConversationSession<C: AssistantClient> {
    client: C,
    handles: SessionHandles,
    assistant: Assistant,
    transcript: Transcript,
    state: watch::Sender<ExchangeState>,
    poll: PollSettings,
}

impl<C: AssistantClient> ConversationSession<C> {
    /// Establish a session from user-supplied credentials.
    ///
    /// Any failure (unknown key, unknown assistant, network) is reported as
    /// the generic [`InitializationFailure`]; the cause is logged and kept as
    /// the error source. Nothing is retried.
    pub async fn initialize<K>(
        connector: &K,
        credentials: &Credentials,
        config: &ChatConfig,
    ) -> Result<Self, InitializationFailure>
    where
        K: AssistantConnector<Client = C>,
    {
        let (client, assistant, thread) = match Self::establish(connector, credentials).await {
            Ok(parts) => parts,
            Err(cause) => {
                error!(
                    assistant_id = %credentials.assistant_id,
                    error = %cause,
                    "session initialization failed"
                );
                return Err(InitializationFailure { cause });
            }
        };

        let handles = SessionHandles {
            assistant_id: assistant.id.clone(),
            thread_id: thread.id,
            client_config: client.config().clone(),
        };
        info!(
            assistant_id = %handles.assistant_id,
            thread_id = %handles.thread_id,
            "session established"
        );

        let transcript = Transcript::new();
        transcript.push(ChatMessage::assistant(config.greeting.clone()));

        let (state, _) = watch::channel(ExchangeState::Idle);

        Ok(Self {
            client,
            handles,
            assistant,
            transcript,
            state,
            poll: PollSettings::from_config(config),
        })
    }

    async fn establish<K>(
        connector: &K,
        credentials: &Credentials,
    ) -> Result<(C, Assistant, Thread), AssistantApiError>
    where
        K: AssistantConnector<Client = C>,
    {
        let client = connector.connect(credentials)?;
        let assistant = client.retrieve_assistant(&credentials.assistant_id).await?;
        let thread = client.create_thread().await?;
        Ok((client, assistant, thread))
    }

    /// Run one exchange for `content`.
    ///
    /// The user message is appended before anything is sent and stays in
    /// the transcript whatever happens next. On success the assistant reply
    /// is appended and returned inside [`ExchangeOutcome::Delivered`]. A run
    /// that settles without an assistant-authored text message yields
    /// [`ExchangeOutcome::NoReply`] and appends nothing.
    pub async fn send_message(
        &mut self,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ExchangeFailure> {
        self.transcript.push(ChatMessage::user(content));
        let pending = PendingExchange::begin(&self.state);

        let result = self.exchange(content, cancel).await;

        let next = match &result {
            Ok(ExchangeOutcome::Delivered { .. }) => ExchangeState::Delivered,
            Ok(ExchangeOutcome::NoReply { .. }) => ExchangeState::NoReply,
            Err(e) => {
                warn!(thread_id = %self.handles.thread_id, error = %e, "exchange failed");
                ExchangeState::Failed
            }
        };
        pending.settle(next);

        result
    }

    async fn exchange(
        &self,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ExchangeFailure> {
        let thread_id = &self.handles.thread_id;

        self.client
            .create_message(thread_id, MessageRole::User, content)
            .await?;
        let run = self
            .client
            .create_run(thread_id, &self.handles.assistant_id)
            .await?;
        info!(thread_id = %thread_id, run_id = %run.id, "run started");

        self.state.send_replace(ExchangeState::Waiting {
            run_id: run.id.clone(),
            polls: 0,
        });
        let finished = wait_for_run(&self.client, &run, &self.poll, cancel, |polls| {
            self.state.send_replace(ExchangeState::Waiting {
                run_id: run.id.clone(),
                polls,
            });
        })
        .await?;

        let listing = self.client.list_messages(thread_id).await?;
        match select_reply(&listing, &finished.id).and_then(|m| m.text.clone()) {
            Some(text) => {
                let reply = ChatMessage::assistant(text);
                self.transcript.push(reply.clone());
                info!(run_id = %finished.id, "reply delivered");
                Ok(ExchangeOutcome::Delivered {
                    run_id: finished.id,
                    reply,
                })
            }
            None => {
                warn!(
                    run_id = %finished.id,
                    status = %finished.status,
                    "run settled without an assistant reply"
                );
                Ok(ExchangeOutcome::NoReply {
                    run_id: finished.id,
                    status: finished.status,
                })
            }
        }
    }

    pub fn handles(&self) -> &SessionHandles {
        &self.handles
    }

    /// The assistant resource retrieved at initialization.
    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Cloned transcript entries, in display order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.snapshot()
    }

    /// Shared read handle on the transcript.
    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    pub fn state(&self) -> ExchangeState {
        self.state.borrow().clone()
    }

    /// Whether a send is in flight and input should stay disabled.
    pub fn is_waiting(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// Watch the exchange state without holding the session.
    pub fn subscribe(&self) -> watch::Receiver<ExchangeState> {
        self.state.subscribe()
    }
}

/// Puts the state into `Sending` and guarantees it leaves the busy states,
/// even when the exchange future is dropped mid-await.
struct PendingExchange<'a> {
    state: &'a watch::Sender<ExchangeState>,
    settled: bool,
}

impl<'a> PendingExchange<'a> {
    fn begin(state: &'a watch::Sender<ExchangeState>) -> Self {
        state.send_replace(ExchangeState::Sending);
        Self { state, settled: false }
    }

    fn settle(mut self, next: ExchangeState) {
        self.settled = true;
        self.state.send_replace(next);
    }
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("exchange abandoned before the run settled");
            self.state.send_replace(ExchangeState::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{FailPoint, ScriptedClient, ScriptedConnector};
    use threadline_types::assistant::RunStatus;
    use threadline_types::config::DEFAULT_GREETING;

    fn creds() -> Credentials {
        Credentials::new("sk-test", "asst_test")
    }

    async fn session_with(client: ScriptedClient) -> ConversationSession<ScriptedClient> {
        ConversationSession::initialize(&ScriptedConnector::new(client), &creds(), &ChatConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn initialize_inserts_exactly_one_greeting() {
        let session = session_with(ScriptedClient::new()).await;

        let messages = session.messages();
        assert_eq!(messages, vec![ChatMessage::assistant(DEFAULT_GREETING)]);
        assert_eq!(session.handles().assistant_id.as_str(), "asst_test");
        assert_eq!(session.handles().thread_id.as_str(), "thread_scripted");
        assert_eq!(session.state(), ExchangeState::Idle);
    }

    #[tokio::test]
    async fn initialize_uses_configured_greeting() {
        let config = ChatConfig {
            greeting: "Welcome aboard.".to_string(),
            ..ChatConfig::default()
        };
        let session = ConversationSession::initialize(
            &ScriptedConnector::new(ScriptedClient::new()),
            &creds(),
            &config,
        )
        .await
        .unwrap();
        assert_eq!(session.messages()[0].content, "Welcome aboard.");
    }

    #[tokio::test]
    async fn initialize_failures_are_generic() {
        for point in [FailPoint::RetrieveAssistant, FailPoint::CreateThread] {
            let connector = ScriptedConnector::new(ScriptedClient::new().failing_at(point));
            let result = ConversationSession::initialize(&connector, &creds(), &ChatConfig::default()).await;
            let err = result.err().expect("initialization should fail");
            assert_eq!(err.to_string(), "invalid credentials");
            assert!(matches!(err.cause, AssistantApiError::Transport(_)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn send_delivers_reply_after_polling() {
        let client = ScriptedClient::new()
            .with_statuses([RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed])
            .with_reply("The answer is 42.");
        let mut session = session_with(client).await;

        let outcome = session
            .send_message("What is the answer?", &CancellationToken::new())
            .await
            .unwrap();

        let reply = ChatMessage::assistant("The answer is 42.");
        assert_eq!(outcome.reply(), Some(&reply));
        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::user("What is the answer?"));
        assert_eq!(messages[2], reply);
        assert_eq!(session.client().status_check_times().len(), 3);
        assert_eq!(session.client().posted(), vec!["What is the answer?".to_string()]);
        assert_eq!(session.state(), ExchangeState::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_run_without_reply_appends_nothing() {
        let client = ScriptedClient::new().with_statuses([RunStatus::Queued, RunStatus::Failed]);
        let mut session = session_with(client).await;

        let outcome = session
            .send_message("hello?", &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            ExchangeOutcome::NoReply { status: RunStatus::Failed, .. }
        ));
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_user);
        assert_eq!(session.state(), ExchangeState::NoReply);
    }

    #[tokio::test(start_paused = true)]
    async fn user_message_is_appended_even_when_exchange_fails() {
        for point in [
            FailPoint::CreateMessage,
            FailPoint::CreateRun,
            FailPoint::RetrieveRun,
            FailPoint::ListMessages,
        ] {
            let mut session = session_with(ScriptedClient::new().with_reply("hi").failing_at(point)).await;

            let err = session
                .send_message("are you there?", &CancellationToken::new())
                .await
                .unwrap_err();

            assert!(matches!(err, ExchangeFailure::Remote(_)), "{point:?}");
            let messages = session.messages();
            assert_eq!(messages.len(), 2, "{point:?}");
            assert_eq!(messages[1], ChatMessage::user("are you there?"));
            assert_eq!(session.state(), ExchangeState::Failed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn session_stays_usable_after_cancelled_exchange() {
        let client = ScriptedClient::new()
            .with_statuses([RunStatus::Completed])
            .with_reply("pong");
        let mut session = session_with(client).await;

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        let err = session.send_message("first", &cancelled).await.unwrap_err();
        assert!(matches!(err, ExchangeFailure::Cancelled));

        let outcome = session
            .send_message("second", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.reply().map(|m| m.content.as_str()), Some("pong"));

        let contents: Vec<String> = session.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec![DEFAULT_GREETING, "first", "second", "pong"]);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_send_does_not_leave_session_waiting() {
        let client = ScriptedClient::new()
            .with_statuses([RunStatus::InProgress])
            .with_reply("late");
        let mut session = session_with(client).await;
        let rx = session.subscribe();

        let abandoned = tokio::time::timeout(
            Duration::from_secs(20),
            session.send_message("hi", &CancellationToken::new()),
        )
        .await;
        assert!(abandoned.is_err(), "run should still be pending after 20s");

        assert!(!session.is_waiting());
        assert_eq!(session.state(), ExchangeState::Failed);
        assert_eq!(*rx.borrow(), ExchangeState::Failed);
        // The user message stays; nothing was delivered.
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_content_is_sent_as_is() {
        let mut session = session_with(ScriptedClient::new().with_reply("You said nothing.")).await;

        session.send_message("", &CancellationToken::new()).await.unwrap();

        assert_eq!(session.client().posted(), vec![String::new()]);
        assert_eq!(session.messages()[1], ChatMessage::user(""));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_waiting_state() {
        let client = ScriptedClient::new()
            .with_statuses([RunStatus::Queued, RunStatus::Completed])
            .with_reply("done");
        let mut session = session_with(client).await;
        let mut rx = session.subscribe();
        let transcript = session.transcript();

        let watcher = tokio::spawn(async move {
            let mut saw_waiting = false;
            while rx.changed().await.is_ok() {
                if matches!(*rx.borrow_and_update(), ExchangeState::Waiting { .. }) {
                    saw_waiting = true;
                }
            }
            saw_waiting
        });

        session.send_message("go", &CancellationToken::new()).await.unwrap();
        assert_eq!(transcript.len(), 3);
        drop(session);

        assert!(watcher.await.unwrap());
    }
}
