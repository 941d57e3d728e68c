//! SkyNet CLI and REST API entry point.
//!
//! Binary name: `skynet`
//!
//! Parses CLI arguments, initializes tracing, storage and services, then
//! dispatches to the command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use skynet_observe::{TracingOptions, init_tracing, shutdown_tracing, verbosity_filter};

use cli::{ChatsCommand, Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "skynet", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(&TracingOptions {
        default_filter: verbosity_filter(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    })?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            serve(state, &host, port).await?;
        }

        Commands::Personas => {
            cli::personas::list_personas(&state, cli.json)?;
        }

        Commands::Chats { action } => match action {
            ChatsCommand::List => cli::chats::list_chats(&state, cli.json).await?,
            ChatsCommand::Show { id } => cli::chats::show_chat(&state, id, cli.json).await?,
            ChatsCommand::Delete { id, force } => {
                cli::chats::delete_chat(&state, id, force, cli.json).await?
            }
        },

        Commands::Completions { .. } => {}
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "SkyNet API listening");
    println!(
        "  {} SkyNet API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
