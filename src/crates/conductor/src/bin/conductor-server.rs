//! Conductor server binary
//!
//! Loads configuration, connects the language model and tool provider, and
//! serves the conversation API until Ctrl-C or SIGTERM.

use anyhow::Context;
use clap::Parser;
use conductor::api::create_router;
use conductor::config::LoggingConfig;
use conductor::{build_chat_model, build_tool_catalog, ConfigLoader, ConversationOrchestrator, ModelClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "conductor-server", version, about = "Multi-turn tool invocation server")]
struct Args {
    /// Configuration file (TOML, or YAML by extension) applied after the user and project files
    #[arg(short, long, env = "CONDUCTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_explicit_path(path);
    }
    let mut config = loader.load().await.context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);

    let model = build_chat_model(&config.llm).context("failed to configure language model")?;
    tracing::info!(provider = model.provider_name(), model = %config.llm.model, "language model ready");
    let model = ModelClient::new(model, config.llm.timeout());
    if !model.is_available().await {
        tracing::warn!(provider = model.provider_name(), "language model is not reachable yet; turns will fail until it is");
    }

    let catalog = build_tool_catalog(&config.tools).context("failed to configure tool provider")?;
    let orchestrator = Arc::new(ConversationOrchestrator::new(catalog, model, &config.llm));
    let app = create_router(orchestrator);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Starting conductor server on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Conductor server shut down gracefully");
    Ok(())
}

/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format.as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL-C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
