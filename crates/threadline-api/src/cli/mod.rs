//! CLI command definitions for the `tline` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod chat;
pub mod credentials;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Chat with an OpenAI assistant from the terminal, or serve sessions over HTTP.
#[derive(Parser)]
#[command(name = "tline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with an assistant.
    Chat {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Send a single message and print the assistant's reply.
    Ask {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// The message to send.
        message: String,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Credential flags shared by `chat` and `ask`.
///
/// Does NOT derive Debug: `api_key` must never reach log output.
#[derive(Args, Clone, Default)]
pub struct CredentialArgs {
    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Id of the assistant to talk to (asst_...).
    #[arg(long, env = "OPENAI_ASSISTANT_ID")]
    pub assistant_id: Option<String>,
}
