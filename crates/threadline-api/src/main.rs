//! Threadline CLI and REST API entry point.
//!
//! Binary name: `tline`
//!
//! Parses CLI arguments, loads configuration, then dispatches to the
//! interactive chat, a one-shot exchange, or the REST API server.

mod cli;
mod http;
mod state;

#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;

use threadline_infra::assistant::OpenAiConnector;
use threadline_infra::config::{load_chat_config, resolve_data_dir};
use threadline_types::config::ChatConfig;
use threadline_observe::tracing_setup::{default_filter, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(default_filter(cli.verbose, cli.quiet), cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    // Shell completions don't need configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "tline", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let data_dir = resolve_data_dir();
    let config = load_chat_config(&data_dir).await;

    let result = match cli.command {
        Commands::Chat { credentials } => cli::chat::loop_runner::run_chat_loop(&config, &credentials)
            .await
            .map(|()| ExitCode::SUCCESS),

        Commands::Ask {
            credentials,
            message,
        } => {
            let connector = OpenAiConnector::from_config(&config);
            match cli::credentials::from_args(&credentials) {
                Ok(creds) => {
                    cli::ask::ask(&connector, &config, &creds, &message, cli.json, cli.quiet).await
                }
                Err(e) => Err(e),
            }
        }

        Commands::Serve { port, host } => serve(config, &host, port, cli.quiet).await.map(|()| ExitCode::SUCCESS),

        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}

/// Run the REST API until Ctrl+C or SIGTERM.
async fn serve(config: ChatConfig, host: &str, port: u16, quiet: bool) -> anyhow::Result<()> {
    let idle_timeout = config.session_idle_timeout();
    let state = AppState::new(config);
    let shutdown = state.shutdown.clone();

    let sweeper = idle_timeout.map(|max_idle| {
        let every = max_idle.min(std::time::Duration::from_secs(60));
        state.spawn_idle_sweeper(max_idle, every)
    });

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!(
            "  {} Threadline API listening on {}",
            console::style(">").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Pending exchanges return immediately so open requests can finish.
            shutdown.cancel();
        })
        .await?;

    if let Some(sweeper) = sweeper {
        let _ = sweeper.await;
    }

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
