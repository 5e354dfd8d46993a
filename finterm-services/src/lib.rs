//! Services for the AI Finance Terminal
//!
//! This crate provides the layer between the HTTP boundary and the feeds:
//! the news and glossary caches, the daily LLM quota, the chat-completions
//! client and Enrichment Stage, bulk news orchestration, and the
//! dashboard-side client that consumes the API.

pub mod clock;
pub mod config;
pub mod dashboard_client;
pub mod enrichment;
pub mod glossary;
pub mod llm_client;
pub mod news_cache;
pub mod news_service;
pub mod quota;
pub mod retry;
pub mod term_cache;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{ConfigError, TerminalConfig, DEFAULT_PORT};
pub use dashboard_client::{ClientError, DashboardClient, NewsFetchOutcome, NewsOrigin};
pub use enrichment::{parse_enrichment, strip_code_fences, Enricher, EnrichmentMode};
pub use glossary::{GlossaryService, MISSING_API_KEY};
pub use llm_client::{normalize_base_url, ChatCompletionClient, LlmConfig, TextGenerator};
pub use news_cache::{CacheRead, CacheSnapshot, CacheStatus, NewsCache, NEWS_CACHE_TTL};
pub use news_service::{NewsService, BACKEND_ERROR_PREFIX};
pub use quota::{DailyQuota, QuotaStats, MAX_DAILY_REQUESTS};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use term_cache::{TermCache, TERM_CACHE_TTL};
