//! Scripted in-memory assistant service for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::time::Instant;

use threadline_types::assistant::{
    Assistant, AssistantId, ClientConfig, Credentials, MessageId, MessageRole, RemoteMessage, Run,
    RunId, RunStatus, Thread, ThreadId,
};
use threadline_types::error::AssistantApiError;

use crate::assistant::client::{AssistantClient, AssistantConnector};

/// Operation at which a [`ScriptedClient`] returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    RetrieveAssistant,
    CreateThread,
    CreateMessage,
    CreateRun,
    RetrieveRun,
    ListMessages,
}

#[derive(Default)]
struct Script {
    statuses: VecDeque<RunStatus>,
    reply: Option<String>,
    fail_at: Option<FailPoint>,
    runs_created: u32,
    posted: Vec<String>,
    status_checks: Vec<Instant>,
    history: Vec<RemoteMessage>,
}

pub struct ScriptedClient {
    config: ClientConfig,
    script: Mutex<Script>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            config: ClientConfig {
                base_url: "http://scripted.invalid/v1".to_string(),
            },
            script: Mutex::new(Script {
                statuses: VecDeque::from([RunStatus::Completed]),
                ..Script::default()
            }),
        }
    }

    /// Statuses returned by successive status checks. The last one repeats.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        self.script.lock().unwrap().statuses = statuses.into_iter().collect();
        self
    }

    /// Text of the assistant message each run produces.
    pub fn with_reply(self, text: &str) -> Self {
        self.script.lock().unwrap().reply = Some(text.to_string());
        self
    }

    pub fn failing_at(self, point: FailPoint) -> Self {
        self.script.lock().unwrap().fail_at = Some(point);
        self
    }

    pub fn status_check_times(&self) -> Vec<Instant> {
        self.script.lock().unwrap().status_checks.clone()
    }

    pub fn posted(&self) -> Vec<String> {
        self.script.lock().unwrap().posted.clone()
    }

    pub fn runs_created(&self) -> u32 {
        self.script.lock().unwrap().runs_created
    }

    fn check(&self, point: FailPoint) -> Result<(), AssistantApiError> {
        if self.script.lock().unwrap().fail_at == Some(point) {
            return Err(AssistantApiError::Transport(format!("scripted failure at {point:?}")));
        }
        Ok(())
    }
}

impl AssistantClient for ScriptedClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn retrieve_assistant(&self, assistant_id: &AssistantId) -> Result<Assistant, AssistantApiError> {
        self.check(FailPoint::RetrieveAssistant)?;
        Ok(Assistant {
            id: assistant_id.clone(),
            name: Some("Scripted".to_string()),
            model: Some("gpt-4o".to_string()),
        })
    }

    async fn create_thread(&self) -> Result<Thread, AssistantApiError> {
        self.check(FailPoint::CreateThread)?;
        Ok(Thread {
            id: ThreadId::from("thread_scripted"),
        })
    }

    async fn create_message(
        &self,
        _thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<RemoteMessage, AssistantApiError> {
        self.check(FailPoint::CreateMessage)?;
        let mut script = self.script.lock().unwrap();
        script.posted.push(content.to_string());
        let message = RemoteMessage {
            id: MessageId(format!("msg_user_{}", script.posted.len())),
            run_id: None,
            role,
            text: Some(content.to_string()),
            created_at: script.history.len() as i64,
        };
        script.history.push(message.clone());
        Ok(message)
    }

    async fn create_run(&self, thread_id: &ThreadId, _assistant_id: &AssistantId) -> Result<Run, AssistantApiError> {
        self.check(FailPoint::CreateRun)?;
        let mut script = self.script.lock().unwrap();
        script.runs_created += 1;
        Ok(Run {
            id: RunId(format!("run_{}", script.runs_created)),
            thread_id: thread_id.clone(),
            status: RunStatus::Queued,
        })
    }

    async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run, AssistantApiError> {
        let mut script = self.script.lock().unwrap();
        script.status_checks.push(Instant::now());
        drop(script);
        self.check(FailPoint::RetrieveRun)?;

        let mut script = self.script.lock().unwrap();
        let status = if script.statuses.len() > 1 {
            script.statuses.pop_front().unwrap_or(RunStatus::Completed)
        } else {
            script.statuses.front().copied().unwrap_or(RunStatus::Completed)
        };

        // A completed run leaves its reply in the thread.
        if status == RunStatus::Completed {
            if let Some(reply) = script.reply.clone() {
                let already = script
                    .history
                    .iter()
                    .any(|m| m.run_id.as_ref() == Some(run_id));
                if !already {
                    let created_at = script.history.len() as i64;
                    script.history.push(RemoteMessage {
                        id: MessageId(format!("msg_{run_id}")),
                        run_id: Some(run_id.clone()),
                        role: MessageRole::Assistant,
                        text: Some(reply),
                        created_at,
                    });
                }
            }
        }

        Ok(Run {
            id: run_id.clone(),
            thread_id: thread_id.clone(),
            status,
        })
    }

    async fn list_messages(&self, _thread_id: &ThreadId) -> Result<Vec<RemoteMessage>, AssistantApiError> {
        self.check(FailPoint::ListMessages)?;
        let script = self.script.lock().unwrap();
        Ok(script.history.iter().rev().cloned().collect())
    }
}

/// Hands out one prepared [`ScriptedClient`].
pub struct ScriptedConnector {
    client: Mutex<Option<ScriptedClient>>,
}

impl ScriptedConnector {
    pub fn new(client: ScriptedClient) -> Self {
        Self {
            client: Mutex::new(Some(client)),
        }
    }
}

impl AssistantConnector for ScriptedConnector {
    type Client = ScriptedClient;

    fn connect(&self, _credentials: &Credentials) -> Result<ScriptedClient, AssistantApiError> {
        self.client
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AssistantApiError::Transport("connector already used".to_string()))
    }
}
