use std::error::Error;
use std::sync::Arc;

use taskdeck_server::{app_state::AppState, data_context::DataContext, map_routes, settings::Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskdeck_server=info,tower_http=info")),
        )
        .init();

    // ── Settings ───────────────────────────────────────────────
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "failed to load settings");
            std::process::exit(1);
        }
    };

    // ── Store ──────────────────────────────────────────────────
    let data_context = DataContext::open(&settings.database_path)?;
    tracing::info!(path = %settings.database_path, "database opened");

    // ── Router ─────────────────────────────────────────────────
    let address = settings.socket_address();
    let app = map_routes(Arc::new(AppState::new(data_context, settings)));

    // ── Start ──────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
