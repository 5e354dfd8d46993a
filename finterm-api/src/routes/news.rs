//! News endpoints
//!
//! Every outcome except a malformed single-article request is a 200 with a
//! `success` flag in the body.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use finterm_core::{PipelineError, ProcessSingleEnvelope, ProcessSingleRequest, TermEnvelope};

use crate::AppState;

const MISSING_ARTICLE: &str = "缺少新聞文章內容";

/// Query parameters for `GET /api/news`
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    /// Financial term to explain instead of listing news
    pub term: Option<String>,
    /// `true` or `1` drops the cached cards and rebuilds them
    pub refresh: Option<String>,
}

impl NewsQuery {
    fn wants_refresh(&self) -> bool {
        matches!(self.refresh.as_deref().map(str::trim), Some("true") | Some("1"))
    }
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(get_news).options(preflight))
        .route("/news/process-single", post(process_single).options(preflight))
}

/// GET /api/news - bulk cards, or a glossary lookup when `term` is present
///
/// A query string that does not deserialize (a repeated `term`, say) still
/// gets a 200 failure envelope rather than axum's plain-text rejection.
async fn get_news(
    State(state): State<AppState>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!("Unreadable news query: {}", rejection.body_text());
            return Json(state.news_service.failed_envelope(rejection.body_text())).into_response();
        }
    };

    let refresh = params.wants_refresh();
    if let Some(term) = params.term.filter(|t| !t.trim().is_empty()) {
        return Json(lookup_term(&state, &term).await).into_response();
    }

    let envelope = if refresh {
        state.news_service.refresh_envelope().await
    } else {
        state.news_service.news_envelope().await
    };
    Json(envelope).into_response()
}

async fn lookup_term(state: &AppState, term: &str) -> TermEnvelope {
    match state.glossary.lookup(term).await {
        Ok(explanation) => TermEnvelope::explained(explanation),
        Err(e) => {
            warn!("Term lookup for '{}' failed: {}", term.trim(), e);
            TermEnvelope::failed(e.user_message())
        }
    }
}

/// POST /api/news/process-single - enrich one article
async fn process_single(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ProcessSingleRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unreadable process-single body: {}", e);
            return bad_request(MISSING_ARTICLE);
        }
    };

    let article = match request.into_article() {
        Ok(article) => article,
        Err(e) => return bad_request(&e.user_message()),
    };

    let envelope = match state.news_service.process_single(article).await {
        Ok(fields) => {
            info!("Processed single article as '{}'", fields.title);
            ProcessSingleEnvelope::processed(fields)
        }
        Err(e @ PipelineError::ConfigurationMissing(_)) => ProcessSingleEnvelope::failed(e.user_message()),
        Err(e) => {
            warn!("Single-article enrichment failed: {}", e);
            ProcessSingleEnvelope::failed(format!("AI 處理失敗: {}", e.user_message()))
        }
    };

    Json(envelope).into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ProcessSingleEnvelope::failed(message))).into_response()
}

/// Bare OPTIONS without CORS preflight headers
async fn preflight() -> StatusCode {
    StatusCode::OK
}
