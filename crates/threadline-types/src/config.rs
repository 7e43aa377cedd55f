//! Chat configuration types for Threadline.
//!
//! `ChatConfig` represents the optional `config.toml` in the data
//! directory. Credentials are deliberately not part of it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Greeting inserted locally whenever a session becomes active.
pub const DEFAULT_GREETING: &str = "Hi, I'm your personal assistant. How can I help you?";

/// Base URL of the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Top-level configuration. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// API base URL for the assistant service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Delay between two run status checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on how long a single run may be waited for, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Greeting shown when a session starts.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// REST sessions untouched for this long are dropped, in seconds.
    /// `0` keeps them until deleted.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_run_timeout_secs() -> u64 {
    600
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_session_idle_timeout_secs() -> u64 {
    1800
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            greeting: default_greeting(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}

impl ChatConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_timeout_secs > 0).then(|| Duration::from_secs(self.session_idle_timeout_secs))
    }
}
