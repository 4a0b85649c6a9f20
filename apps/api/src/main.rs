mod config;
mod document;
mod errors;
mod generation;
mod llm_client;
mod render;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{BackendPair, GeminiBackend, GroqBackend};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docgen v{}", env!("CARGO_PKG_VERSION"));

    // Keys are not validated here; a missing key fails the first call to that provider.
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY is not set; primary backend calls will fail");
    }
    if config.google_api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; secondary backend calls will fail");
    }

    let policy = config.retry_policy();
    let primary = GroqBackend::new(
        config.groq_api_key.clone(),
        config.groq_model.clone(),
        config.groq_base_url.clone(),
        policy,
    )?;
    let secondary = GeminiBackend::new(
        config.google_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        policy,
    )?;
    info!(
        "LLM backends initialized (primary: {}, secondary: {}, timeout: {}s, attempts: {})",
        config.groq_model,
        config.gemini_model,
        policy.timeout.as_secs(),
        policy.max_retries
    );

    let state = AppState {
        backends: BackendPair::new(Arc::new(primary), Arc::new(secondary)),
        sessions: SessionStore::new(config.output_dir.clone()),
    };
    info!("Writing documents under {}", config.output_dir.display());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
