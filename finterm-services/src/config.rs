//! Runtime configuration from environment variables

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use finterm_news::{default_feeds, FeedFetcherConfig, FeedSource, MAX_ARTICLES};

use crate::enrichment::EnrichmentMode;
use crate::llm_client::{normalize_base_url, LlmConfig, DEFAULT_MODEL};
use crate::news_cache::NEWS_CACHE_TTL;
use crate::quota::MAX_DAILY_REQUESTS;
use crate::retry::RetryPolicy;
use crate::term_cache::TERM_CACHE_TTL;

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("ENRICHMENT_MODE must be 'lazy' or 'eager', got '{0}'")]
    InvalidMode(String),

    #[error("NEWS_FEEDS contains no usable URL")]
    NoFeeds,
}

#[derive(Debug, Clone)]
pub struct TerminalConfig {
    pub llm: LlmConfig,
    pub feeds: Vec<FeedSource>,
    pub fetcher: FeedFetcherConfig,
    pub enrichment_mode: EnrichmentMode,
    pub news_cache_ttl: Duration,
    pub term_cache_ttl: Duration,
    pub max_daily_requests: u64,
    pub term_retry: RetryPolicy,
    pub server_port: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            feeds: default_feeds(),
            fetcher: FeedFetcherConfig::default(),
            enrichment_mode: EnrichmentMode::default(),
            news_cache_ttl: NEWS_CACHE_TTL,
            term_cache_ttl: TERM_CACHE_TTL,
            max_daily_requests: MAX_DAILY_REQUESTS,
            term_retry: RetryPolicy::default(),
            server_port: DEFAULT_PORT,
        }
    }
}

impl TerminalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let secs = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            get(var)
                .map(|v| parse_number::<u64>(var, &v).map(Duration::from_secs))
                .unwrap_or(Ok(default))
        };

        let feeds = match get("NEWS_FEEDS") {
            Some(list) => {
                let feeds: Vec<FeedSource> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(FeedSource::from_url)
                    .collect();
                if feeds.is_empty() {
                    return Err(ConfigError::NoFeeds);
                }
                feeds
            }
            None => defaults.feeds,
        };

        let enrichment_mode = match get("ENRICHMENT_MODE") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidMode)?,
            None => defaults.enrichment_mode,
        };

        let llm = LlmConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: normalize_base_url(&get("API_BASE_URL").unwrap_or_default()),
            model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: secs("ENRICHMENT_TIMEOUT_SECS", defaults.llm.timeout)?,
        };

        let fetcher = FeedFetcherConfig {
            timeout: secs("FEED_TIMEOUT_SECS", defaults.fetcher.timeout)?,
            fallback_timeout: secs("FEED_FALLBACK_TIMEOUT_SECS", defaults.fetcher.fallback_timeout)?,
            max_articles: MAX_ARTICLES,
        };

        let max_daily_requests = match get("MAX_DAILY_REQUESTS") {
            Some(v) => parse_number("MAX_DAILY_REQUESTS", &v)?,
            None => defaults.max_daily_requests,
        };

        let term_retry = match get("TERM_LOOKUP_RETRIES") {
            Some(v) => RetryPolicy {
                max_attempts: parse_number("TERM_LOOKUP_RETRIES", &v)?,
                ..defaults.term_retry
            },
            None => defaults.term_retry,
        };

        let server_port = match get("SERVER_PORT") {
            Some(v) => parse_number("SERVER_PORT", &v)?,
            None => defaults.server_port,
        };

        Ok(Self {
            llm,
            feeds,
            fetcher,
            enrichment_mode,
            news_cache_ttl: secs("NEWS_CACHE_TTL_SECS", defaults.news_cache_ttl)?,
            term_cache_ttl: secs("TERM_CACHE_TTL_SECS", defaults.term_cache_ttl)?,
            max_daily_requests,
            term_retry,
            server_port,
        })
    }
}

fn parse_number<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
