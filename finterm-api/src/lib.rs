//! AI Finance Terminal API
//!
//! Router and shared state, split from the binary so the HTTP surface can be
//! exercised in tests without binding a socket.

pub mod routes;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use finterm_news::{ArticleProvider, FeedFetcher};
use finterm_services::{
    ChatCompletionClient, DailyQuota, Enricher, GlossaryService, NewsCache, NewsService,
    SharedClock, SystemClock, TermCache, TerminalConfig, TextGenerator,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub news_service: Arc<NewsService>,
    pub glossary: Arc<GlossaryService>,
    pub quota: Arc<DailyQuota>,
}

impl AppState {
    /// Wire the production collaborators described by `config`
    pub fn from_config(config: &TerminalConfig) -> Self {
        let provider = Arc::new(FeedFetcher::with_feeds(
            config.feeds.clone(),
            config.fetcher.clone(),
        ));
        let generator = ChatCompletionClient::from_config(&config.llm)
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);

        Self::assemble(config, provider, generator, SystemClock::shared())
    }

    /// Wire the services around arbitrary article and text providers
    pub fn assemble(
        config: &TerminalConfig,
        provider: Arc<dyn ArticleProvider>,
        generator: Option<Arc<dyn TextGenerator>>,
        clock: SharedClock,
    ) -> Self {
        let quota = Arc::new(DailyQuota::new(config.max_daily_requests, clock.clone()));
        let enricher = generator
            .clone()
            .map(|generator| Arc::new(Enricher::new(generator, quota.clone())));

        let news_service = NewsService::new(
            provider,
            enricher,
            Arc::new(NewsCache::new(config.news_cache_ttl, clock.clone())),
            config.enrichment_mode,
            clock.clone(),
        );
        let glossary = GlossaryService::new(
            Arc::new(TermCache::new(config.term_cache_ttl, clock)),
            generator,
            quota.clone(),
            config.term_retry,
        );

        Self {
            news_service: Arc::new(news_service),
            glossary: Arc::new(glossary),
            quota,
        }
    }
}

/// Build the full router with CORS for the dashboard
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
}
