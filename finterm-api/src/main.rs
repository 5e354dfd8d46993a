//! AI Finance Terminal API Server
//!
//! Serves the financial news dashboard: nine news cards from RSS feeds,
//! per-article AI translation and insight, and a financial glossary.

use std::net::SocketAddr;
use std::time::Duration;

use finterm_api::{build_router, AppState};
use finterm_services::TerminalConfig;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How often stale glossary entries are dropped
const TERM_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,finterm_api=debug")),
        )
        .init();

    info!("Starting AI Finance Terminal API");

    let config = TerminalConfig::from_env()?;

    if config.llm.is_configured() {
        info!(
            "Text generation via {} using model {}",
            config.llm.base_url, config.llm.model
        );
    } else {
        warn!("OPENAI_API_KEY not set - enrichment and glossary lookups will report a configuration error");
    }
    info!(
        "News from {} feed(s), enrichment mode {:?}, cache window {:?}",
        config.feeds.len(),
        config.enrichment_mode,
        config.news_cache_ttl
    );

    let state = AppState::from_config(&config);

    // Periodically drop expired glossary entries
    let glossary = state.glossary.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TERM_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = glossary.cache().purge_expired();
            if purged > 0 {
                debug!("Purged {} expired glossary entries", purged);
            }
        }
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
