//! Main chat loop orchestration.
//!
//! Sets up a session (re-prompting on bad credentials), prints the banner
//! and greeting, then runs one exchange per submitted line until the user
//! exits.

use std::time::Instant;

use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use tokio_util::sync::CancellationToken;
use tracing::info;

use threadline_core::session::ConversationSession;
use threadline_infra::assistant::{OpenAiAssistantClient, OpenAiConnector};
use threadline_types::chat::{ExchangeOutcome, ExchangeState};
use threadline_types::config::ChatConfig;
use threadline_types::error::ExchangeFailure;

use crate::cli::CredentialArgs;
use crate::cli::credentials;

use super::banner::{print_init_error, print_welcome_banner};
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{ChatRenderer, spinner};

type Session = ConversationSession<OpenAiAssistantClient>;

/// Run the interactive chat loop.
pub async fn run_chat_loop(config: &ChatConfig, args: &CredentialArgs) -> Result<()> {
    let connector = OpenAiConnector::from_config(config);
    let mut session = establish_session(&connector, config, args).await?;

    let assistant = session.assistant().clone();
    let assistant_name = assistant
        .name
        .clone()
        .unwrap_or_else(|| "Assistant".to_string());
    print_welcome_banner(&assistant, &session.handles().thread_id);

    let renderer = ChatRenderer::new();
    for greeting in session.messages() {
        renderer.print_assistant(&assistant_name, &greeting);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("  {}", style("Press Ctrl+D or type /exit to leave.").dim());
                continue;
            }
            InputEvent::Line(text) if text.is_empty() => continue,
            InputEvent::Line(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::History => renderer.print_history(&assistant_name, &session.messages()),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        let started = Instant::now();
        let (result, polls) = send_with_spinner(&mut session, &mut chat_input, &text).await;
        match result {
            Ok(ExchangeOutcome::Delivered { run_id, reply }) => {
                renderer.print_assistant(&assistant_name, &reply);
                renderer.print_stats_footer(run_id.as_str(), polls, started.elapsed());
            }
            Ok(ExchangeOutcome::NoReply { run_id, status }) => {
                println!(
                    "\n  {} The run ended ({status}) without a reply. {}\n",
                    style("!").yellow().bold(),
                    style(run_id).dim()
                );
            }
            Err(ExchangeFailure::Cancelled) => {
                println!("\n  {}\n", style("Stopped waiting for a reply.").dim());
            }
            Err(e) => {
                eprintln!("\n  {} {e}", style("!").red().bold());
                eprintln!("  {}\n", style("Type a message to try again, /exit to quit.").dim());
            }
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    info!(thread_id = %session.handles().thread_id, messages = session.messages().len(), "chat session ended");
    Ok(())
}

/// Initialize a session, offering to re-enter credentials after a failure.
async fn establish_session(
    connector: &OpenAiConnector,
    config: &ChatConfig,
    args: &CredentialArgs,
) -> Result<Session> {
    let mut creds = credentials::resolve_interactive(args)?;
    loop {
        let connecting = spinner("connecting...");
        let result = ConversationSession::initialize(connector, &creds, config).await;
        connecting.finish_and_clear();

        match result {
            Ok(session) => return Ok(session),
            Err(err) => {
                print_init_error(&err);
                let retry = Confirm::new()
                    .with_prompt("Re-enter credentials?")
                    .default(true)
                    .interact()?;
                if !retry {
                    return Err(err.into());
                }
                creds = credentials::reenter(creds.assistant_id.as_str())?;
            }
        }
    }
}

/// What a prompt event means while a reply is pending.
#[derive(Debug, PartialEq, Eq)]
enum PendingInput {
    /// Stop waiting for the reply.
    Cancel,
    /// Typed ahead; dropped, never sent.
    Discard,
}

fn pending_input(event: &InputEvent) -> PendingInput {
    match event {
        InputEvent::Interrupted | InputEvent::Eof => PendingInput::Cancel,
        InputEvent::Line(_) => PendingInput::Discard,
    }
}

/// Drive one exchange while a spinner shows the polling progress. Returns
/// the result together with the number of status checks made.
///
/// Ctrl+C cancels the exchange. Raw-mode terminals deliver it through the
/// line editor, others as a signal, so both are watched. Lines submitted
/// during the wait are discarded.
async fn send_with_spinner(
    session: &mut Session,
    chat_input: &mut ChatInput,
    text: &str,
) -> (Result<ExchangeOutcome, ExchangeFailure>, u32) {
    let waiting = spinner("waiting...");
    let mut checks = 0;
    let cancel = CancellationToken::new();
    let mut states = session.subscribe();

    let send = session.send_message(text, &cancel);
    tokio::pin!(send);

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            Ok(()) = states.changed() => {
                if let ExchangeState::Waiting { polls, .. } = &*states.borrow() {
                    checks = *polls;
                    waiting.set_message(format!("waiting... ({polls} checks)"));
                }
            }
            event = chat_input.read_line(), if !cancel.is_cancelled() => match pending_input(&event) {
                PendingInput::Cancel => {
                    cancel.cancel();
                    waiting.set_message("cancelling...");
                }
                PendingInput::Discard => {
                    waiting.println("  A reply is still pending; input discarded. Ctrl+C stops waiting.");
                }
            },
            _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                cancel.cancel();
                waiting.set_message("cancelling...");
            }
        }
    };

    waiting.finish_and_clear();
    (result, checks)
}
