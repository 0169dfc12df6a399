//! tabletop-tunes HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 8080)
//! - `AI_ENDPOINT_BASE`, `AI_ENDPOINT_PATH`, `AI_API_KEY`, `AI_MODEL` - language model
//! - `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` - needed for token refresh
//! - `BGG_API_BASE`, `SPOTIFY_API_BASE`, `SPOTIFY_ACCOUNTS_BASE` - upstream overrides
//! - `HTTP_TIMEOUT_SECS` - outbound request timeout (default: 30)
//! - `RUST_LOG` - Tracing filter (default: "info,tabletop_tunes=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use tabletop_tunes::server::{app_router, AppState};
use tabletop_tunes::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tabletop_tunes=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let bind_addr = config.bind_addr();

    if config.ai.api_key.is_none() {
        tracing::warn!("AI_API_KEY not set; requests to the language model are unauthenticated");
    }

    let state = AppState::new(config).context("Failed to build HTTP clients")?;
    let app = app_router(state);

    tracing::info!("tabletop-tunes server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                - liveness probe");
    tracing::info!("  POST /api/ai                - genre recommendation");
    tracing::info!("  POST /api/atmosphere/params - slider mapping");
    tracing::info!("  GET  /api/boardgames        - BoardGameGeek proxy");
    tracing::info!("  GET|POST /api/spotify       - Spotify proxy");
    tracing::info!("  POST /api/auth/refresh      - token refresh");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
