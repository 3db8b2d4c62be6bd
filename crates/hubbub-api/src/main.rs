//! Hubbub CLI and REST API entry point.
//!
//! Binary name: `hubbub`
//!
//! Parses CLI arguments, initializes services, then dispatches to a
//! command handler or starts the REST API server.

mod http;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hubbub_core::chat::prompt::EventAssistantPrompt;
use hubbub_core::events::client::EventSearchClient;
use hubbub_core::events::format::format_catalog;
use hubbub_types::retrieval::RetrievalMode;

use state::AppState;

#[derive(Parser)]
#[command(name = "hubbub", about = "Event-platform chat assistant", version)]
struct Cli {
    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(long)]
        port: Option<u16>,
        /// Host to bind (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Run a single chat turn from the command line.
    Chat {
        /// The message to send.
        message: String,
        /// Session id to continue.
        #[arg(long, default_value = "default")]
        session: String,
        /// Retrieval mode: combined, local, events, or none.
        #[arg(long, default_value = "combined")]
        mode: String,
    },

    /// Print the remote event catalog.
    Events,

    /// Index a text file into the local knowledge base
    /// (blank-line-separated chunks).
    Index {
        /// Path to the text file.
        file: PathBuf,
    },

    /// Inspect or reset session history.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show a summary of the recent conversation.
    Show {
        /// Session id.
        id: String,
    },
    /// Clear a session's history.
    Clear {
        /// Session id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    hubbub_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Hubbub API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Chat {
            message,
            session,
            mode,
        } => {
            let mode: RetrievalMode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            println!();
            println!("{}", console::style(EventAssistantPrompt::welcome_message()).dim());
            println!();

            let outcome = state.controller.respond(&session, &message, mode).await;

            println!("{}", outcome.reply);
            if !outcome.sources_used.is_empty() {
                let sources: Vec<String> =
                    outcome.sources_used.iter().map(|s| s.to_string()).collect();
                println!();
                println!(
                    "  {}",
                    console::style(format!("sources: {}", sources.join(", "))).dim()
                );
            }
        }

        Commands::Events => match state.events.get_all().await {
            Ok(catalog) => println!("{}", format_catalog(&catalog)),
            Err(err) => {
                eprintln!("{} {err}", console::style("✗").red());
                std::process::exit(1);
            }
        },

        Commands::Index { file } => {
            let Some(knowledge) = &state.knowledge else {
                anyhow::bail!("knowledge index is not available");
            };

            let content = tokio::fs::read_to_string(&file).await?;
            let chunks: Vec<String> = content
                .split("\n\n")
                .map(|chunk| chunk.trim().to_string())
                .filter(|chunk| !chunk.is_empty())
                .collect();

            let added = knowledge
                .index_documents(chunks)
                .await
                .map_err(|e| anyhow::anyhow!("indexing failed: {e}"))?;
            let total = knowledge
                .count()
                .await
                .map_err(|e| anyhow::anyhow!("count failed: {e}"))?;

            println!(
                "  {} Indexed {added} chunks ({total} total)",
                console::style("✓").green()
            );
        }

        Commands::Session { action } => match action {
            SessionAction::Show { id } => {
                println!("{}", state.controller.memory().summary(&id).await);
            }
            SessionAction::Clear { id } => {
                state
                    .controller
                    .memory()
                    .clear(&id)
                    .await
                    .map_err(|e| anyhow::anyhow!("failed to clear session: {e}"))?;
                println!("  {} Session '{id}' cleared", console::style("✓").green());
            }
        },
    }

    hubbub_observe::tracing_setup::shutdown_tracing();
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
}
