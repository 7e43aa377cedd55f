//! One-shot exchange: `tline ask <message>`.

use std::process::ExitCode;

use anyhow::Result;
use console::style;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use threadline_core::assistant::client::AssistantConnector;
use threadline_core::session::ConversationSession;
use threadline_types::assistant::{Credentials, RunId, ThreadId};
use threadline_types::chat::ExchangeOutcome;
use threadline_types::config::ChatConfig;

use super::chat::renderer::{ChatRenderer, spinner};

/// JSON printed by `ask --json`.
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub thread_id: ThreadId,
    pub run_id: RunId,
    pub reply: Option<String>,
}

/// Run one exchange and print the reply.
///
/// Exits with 1 when the run ended without a reply. Errors propagate and
/// exit with 1 as well.
pub async fn ask<K: AssistantConnector>(
    connector: &K,
    config: &ChatConfig,
    credentials: &Credentials,
    message: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode> {
    let output = exchange_once(connector, config, credentials, message, !json && !quiet).await?;
    let delivered = output.reply.is_some();

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &output.reply {
            Some(reply) => println!("{}", ChatRenderer::new().render(reply)),
            None => eprintln!(
                "  {} The run ended without a reply ({})",
                style("!").yellow().bold(),
                style(&output.run_id).dim()
            ),
        }
    }

    Ok(if delivered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Initialize a session and send `message` on it. Ctrl+C cancels the wait.
pub async fn exchange_once<K: AssistantConnector>(
    connector: &K,
    config: &ChatConfig,
    credentials: &Credentials,
    message: &str,
    show_spinner: bool,
) -> Result<AskOutput> {
    let mut session = ConversationSession::initialize(connector, credentials, config).await?;
    let thread_id = session.handles().thread_id.clone();

    let waiting = show_spinner.then(|| spinner("waiting..."));
    let cancel = CancellationToken::new();
    let result = tokio::select! {
        result = session.send_message(message, &cancel) => result,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            Err(threadline_types::error::ExchangeFailure::Cancelled)
        }
    };
    if let Some(waiting) = waiting {
        waiting.finish_and_clear();
    }

    let outcome = result?;
    Ok(AskOutput {
        thread_id,
        run_id: outcome.run_id().clone(),
        reply: match outcome {
            ExchangeOutcome::Delivered { reply, .. } => Some(reply.content),
            ExchangeOutcome::NoReply { .. } => None,
        },
    })
}
