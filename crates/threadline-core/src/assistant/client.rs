//! AssistantClient trait definition.
//!
//! The six remote operations a conversation needs, one method each. Uses
//! RPITIT so implementations can be plain `async fn`s.

use std::future::Future;

use threadline_types::assistant::{
    Assistant, AssistantId, ClientConfig, Credentials, MessageRole, RemoteMessage, Run, RunId,
    Thread, ThreadId,
};
use threadline_types::error::AssistantApiError;

/// Trait for assistant service backends.
///
/// Implementations live in threadline-infra (e.g. `OpenAiAssistantClient`).
/// A client is bound to one API key for its whole lifetime.
pub trait AssistantClient: Send + Sync {
    /// Non-secret description of where this client points.
    fn config(&self) -> &ClientConfig;

    /// Fetch an assistant by id. Fails with `NotFound` for unknown ids.
    fn retrieve_assistant(
        &self,
        assistant_id: &AssistantId,
    ) -> impl Future<Output = Result<Assistant, AssistantApiError>> + Send;

    /// Create a new, empty conversation thread.
    fn create_thread(&self) -> impl Future<Output = Result<Thread, AssistantApiError>> + Send;

    /// Post a message to a thread.
    fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> impl Future<Output = Result<RemoteMessage, AssistantApiError>> + Send;

    /// Start a run of `assistant_id` against the thread's messages.
    fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> impl Future<Output = Result<Run, AssistantApiError>> + Send;

    /// Read the current state of a run.
    fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, AssistantApiError>> + Send;

    /// List the messages of a thread, newest first.
    fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<Vec<RemoteMessage>, AssistantApiError>> + Send;
}

/// Opens an [`AssistantClient`] bound to a set of credentials.
pub trait AssistantConnector {
    type Client: AssistantClient;

    fn connect(&self, credentials: &Credentials) -> Result<Self::Client, AssistantApiError>;
}
