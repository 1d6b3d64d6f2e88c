mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use arena_common::config::{LanguageConfigManager, Settings};
use arena_judge::Assembler;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct AppState {
    pub assembler: Assembler,
    pub languages: LanguageConfigManager,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    info!("AlgoArena judge API booting...");

    let settings = Settings::from_env();

    let languages = LanguageConfigManager::load(&settings.languages_path)
        .map_err(|e| {
            error!("Failed to load language configurations: {}", e);
            error!("Make sure {} exists", settings.languages_path.display());
            e
        })?;

    info!("Loaded language configurations for: {:?}", languages.list_languages());

    let assembler = Assembler::new()
        .context("Failed to register driver templates")?
        .with_entry_point(settings.entry_point.clone());

    info!(entry_point = %settings.entry_point, "Assembler ready");

    let state = Arc::new(AppState {
        assembler,
        languages,
    });

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    // Start server
    let listener = TcpListener::bind(&settings.bind_addr).await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;

    info!("HTTP server listening on {}", settings.bind_addr);

    axum::serve(listener, app).await
        .context("Server error")?;

    Ok(())
}
