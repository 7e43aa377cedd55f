//! OpenAiAssistantClient -- concrete [`AssistantClient`] for the OpenAI
//! Assistants v2 API.
//!
//! Every request carries `Authorization: Bearer <key>` and the
//! `OpenAI-Beta: assistants=v2` header. The API key is wrapped in
//! [`secrecy::SecretString`] and is only exposed when building headers.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use threadline_core::assistant::client::{AssistantClient, AssistantConnector};
use threadline_types::assistant::{
    Assistant, AssistantId, ClientConfig, Credentials, MessageRole, RemoteMessage, Run, RunId,
    Thread, ThreadId,
};
use threadline_types::config::ChatConfig;
use threadline_types::error::AssistantApiError;

use super::wire::{
    AssistantObject, CreateMessageBody, CreateRunBody, ErrorEnvelope, ListResponse,
    MessageObject, RunObject, ThreadObject,
};

/// Largest page the list endpoint accepts.
const MESSAGE_PAGE_LIMIT: u32 = 100;

/// OpenAI Assistants API client bound to a single API key.
///
/// # API Key Security
///
/// Does NOT derive Debug. The key lives in a [`SecretString`] and never
/// appears in Debug output, Display output, or tracing logs.
pub struct OpenAiAssistantClient {
    http: reqwest::Client,
    api_key: SecretString,
    config: ClientConfig,
}

impl OpenAiAssistantClient {
    const BETA_HEADER: &'static str = "assistants=v2";

    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self, AssistantApiError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AssistantApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            config: ClientConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
            },
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", Self::BETA_HEADER)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AssistantApiError> {
        let request = self.authorized(self.http.get(self.url(path)));
        self.execute(path, request).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, AssistantApiError> {
        let request = self.authorized(self.http.post(self.url(path))).json(body);
        self.execute(path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, AssistantApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| AssistantApiError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "assistant API response");

        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AssistantApiError::Deserialization(format!("failed to parse response: {e}")))
    }
}

// OpenAiAssistantClient intentionally does NOT derive Debug.

impl AssistantClient for OpenAiAssistantClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn retrieve_assistant(&self, assistant_id: &AssistantId) -> Result<Assistant, AssistantApiError> {
        let assistant: AssistantObject = self.get(&format!("/assistants/{assistant_id}")).await?;
        Ok(assistant.into())
    }

    async fn create_thread(&self) -> Result<Thread, AssistantApiError> {
        let thread: ThreadObject = self.post("/threads", &serde_json::json!({})).await?;
        Ok(thread.into())
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<RemoteMessage, AssistantApiError> {
        let body = CreateMessageBody { role, content };
        let message: MessageObject = self
            .post(&format!("/threads/{thread_id}/messages"), &body)
            .await?;
        Ok(message.into())
    }

    async fn create_run(&self, thread_id: &ThreadId, assistant_id: &AssistantId) -> Result<Run, AssistantApiError> {
        let body = CreateRunBody {
            assistant_id: assistant_id.as_str(),
        };
        let run: RunObject = self.post(&format!("/threads/{thread_id}/runs"), &body).await?;
        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run, AssistantApiError> {
        let run: RunObject = self.get(&format!("/threads/{thread_id}/runs/{run_id}")).await?;
        Ok(run.into())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<RemoteMessage>, AssistantApiError> {
        let page: ListResponse<MessageObject> = self
            .get(&format!(
                "/threads/{thread_id}/messages?limit={MESSAGE_PAGE_LIMIT}&order=desc"
            ))
            .await?;
        Ok(page.data.into_iter().map(RemoteMessage::from).collect())
    }
}

/// Map a non-2xx response to an [`AssistantApiError`].
async fn error_from_response(response: Response) -> AssistantApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    match status {
        401 | 403 => AssistantApiError::Authentication,
        404 => AssistantApiError::NotFound(message),
        429 => AssistantApiError::RateLimited,
        _ => AssistantApiError::Api { status, message },
    }
}

/// Builds [`OpenAiAssistantClient`]s against a configured endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConnector {
    base_url: String,
    request_timeout: Duration,
}

impl OpenAiConnector {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.base_url.clone(), config.request_timeout())
    }
}

impl AssistantConnector for OpenAiConnector {
    type Client = OpenAiAssistantClient;

    fn connect(&self, credentials: &Credentials) -> Result<OpenAiAssistantClient, AssistantApiError> {
        OpenAiAssistantClient::new(
            SecretString::from(credentials.api_key.expose_secret().to_string()),
            &self.base_url,
            self.request_timeout,
        )
    }
}
