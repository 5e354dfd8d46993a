//! Health check endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

use finterm_services::{CacheStatus, EnrichmentMode, QuotaStats};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    enrichment_configured: bool,
    enrichment_mode: EnrichmentMode,
    news_cache: CacheStatus,
    term_cache_entries: usize,
    quota: QuotaStats,
}

/// Health check handler
///
/// News keeps flowing without the text-generation API, so a missing key or
/// a spent quota reports `degraded` but still answers 200.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let quota = state.quota.stats();
    let enrichment_configured = state.news_service.enrichment_configured();

    let status = if enrichment_configured && quota.remaining > 0 {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        enrichment_configured,
        enrichment_mode: state.news_service.mode(),
        news_cache: state.news_service.cache().status(),
        term_cache_entries: state.glossary.cache().len(),
        quota,
    })
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
