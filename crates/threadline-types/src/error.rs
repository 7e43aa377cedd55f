use std::time::Duration;

use thiserror::Error;

/// Errors from calls to the remote assistant service.
#[derive(Debug, Error)]
pub enum AssistantApiError {
    #[error("authentication failed")]
    Authentication,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Failure to establish a session.
///
/// Displays a generic message on purpose: the cause is kept as the error
/// source for logging but never shown to the user.
#[derive(Debug, Error)]
#[error("invalid credentials")]
pub struct InitializationFailure {
    #[source]
    pub cause: AssistantApiError,
}

/// Failure during one send/poll/fetch exchange.
///
/// Recoverable: the transcript is left intact and the session stays usable.
#[derive(Debug, Error)]
pub enum ExchangeFailure {
    #[error("assistant service error: {0}")]
    Remote(#[from] AssistantApiError),

    #[error("run did not finish within {}s", waited.as_secs())]
    TimedOut { waited: Duration },

    #[error("exchange cancelled")]
    Cancelled,
}
