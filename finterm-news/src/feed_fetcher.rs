//! RSS feed fetcher for the news dashboard
//!
//! Sources are tried strictly in priority order and the first one that
//! yields articles wins; results are never merged across sources. Each
//! source gets a structured RSS/Atom parse first and the permissive regex
//! extractor in [`crate::fallback_parser`] second.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use finterm_core::{Article, PipelineError, RawFeedItem};

use crate::error::FeedError;
use crate::fallback_parser;
use crate::normalizer::{normalize, MAX_ARTICLES};
use crate::text::{non_blank, strip_html};

/// A feed source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Display name, used for logging
    pub name: String,
    /// RSS feed URL
    pub url: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Source named after the URL's host
    pub fn from_url(url: &str) -> Self {
        let name = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());
        Self {
            name,
            url: url.to_string(),
        }
    }
}

/// Financial feeds in priority order
pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("Yahoo Finance", "https://finance.yahoo.com/news/rss"),
        FeedSource::new("Investing.com", "https://www.investing.com/rss/news_25.rss"),
    ]
}

/// Timeouts and limits for [`FeedFetcher`]
#[derive(Debug, Clone)]
pub struct FeedFetcherConfig {
    /// Timeout for the structured fetch
    pub timeout: Duration,
    /// Timeout for the raw re-fetch after a transport failure
    pub fallback_timeout: Duration,
    /// Articles kept from the winning source
    pub max_articles: usize,
}

impl Default for FeedFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            fallback_timeout: Duration::from_secs(3),
            max_articles: MAX_ARTICLES,
        }
    }
}

/// Anything that can produce a list of normalized articles
#[async_trait]
pub trait ArticleProvider: Send + Sync {
    /// Fetch the current article list
    ///
    /// `Ok(vec![])` is a legitimate answer (sources reachable but empty).
    /// `Err(FetchExhausted)` means every source failed.
    async fn fetch_articles(&self) -> Result<Vec<Article>, PipelineError>;
}

/// RSS feed fetcher
pub struct FeedFetcher {
    client: Client,
    feeds: Vec<FeedSource>,
    config: FeedFetcherConfig,
}

impl FeedFetcher {
    /// Create a fetcher over the default financial feeds
    pub fn new() -> Self {
        Self::with_feeds(default_feeds(), FeedFetcherConfig::default())
    }

    /// Create with custom feeds
    pub fn with_feeds(feeds: Vec<FeedSource>, config: FeedFetcherConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (compatible; FinanceTerminal/1.0)")
                .build()
                .unwrap_or_else(|_| Client::new()),
            feeds,
            config,
        }
    }

    /// Try each source in order; return the first non-empty article list
    #[instrument(skip(self), fields(sources = self.feeds.len()))]
    pub async fn fetch_first_available(&self) -> Result<Vec<Article>, PipelineError> {
        let mut failures = 0;
        let mut last_error = None;

        for feed in &self.feeds {
            match self.fetch_source(feed).await {
                Ok(items) => {
                    let articles = normalize(items, &feed.url, self.config.max_articles);
                    if !articles.is_empty() {
                        info!("Fetched {} articles from {}", articles.len(), feed.name);
                        return Ok(articles);
                    }
                    debug!("{} returned no usable items, trying next source", feed.name);
                }
                Err(e) => {
                    warn!("Failed to fetch or parse from {}: {}", feed.url, e);
                    failures += 1;
                    last_error = Some(PipelineError::source_unavailable(&feed.url, e.to_string()));
                }
            }
        }

        match last_error {
            Some(err) if failures == self.feeds.len() => {
                Err(PipelineError::fetch_exhausted(err.to_string()))
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Fetch one source: structured parse, then the regex extractor
    ///
    /// A body that downloaded fine but failed structured parsing goes straight
    /// to the extractor. A transport failure triggers one raw re-fetch with
    /// the shorter fallback timeout.
    async fn fetch_source(&self, feed: &FeedSource) -> Result<Vec<RawFeedItem>, FeedError> {
        let body = match self.fetch_body(&feed.url, self.config.timeout).await {
            Ok(body) => {
                match parse_structured(&body) {
                    Ok(items) => return Ok(items),
                    Err(e) => {
                        warn!("Structured parse failed for {}, falling back to extractor: {}", feed.url, e)
                    }
                }
                body
            }
            Err(e) => {
                warn!("Fetch failed for {}, retrying raw: {}", feed.url, e);
                self.fetch_body(&feed.url, self.config.fallback_timeout).await?
            }
        };

        let xml = String::from_utf8_lossy(&body);
        Ok(fallback_parser::parse_items(&xml, Utc::now()))
    }

    async fn fetch_body(&self, url: &str, timeout: Duration) -> Result<Bytes, FeedError> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::ApiError {
                status: response.status().as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleProvider for FeedFetcher {
    async fn fetch_articles(&self) -> Result<Vec<Article>, PipelineError> {
        self.fetch_first_available().await
    }
}

/// Parse a feed body as RSS, then Atom
pub fn parse_structured(content: &[u8]) -> Result<Vec<RawFeedItem>, FeedError> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Ok(channel.items().iter().map(raw_from_rss).collect());
    }

    match atom_syndication::Feed::read_from(content) {
        Ok(feed) => Ok(feed.entries().iter().map(raw_from_atom).collect()),
        Err(e) => Err(FeedError::ParseError(e.to_string())),
    }
}

fn raw_from_rss(item: &rss::Item) -> RawFeedItem {
    let creator = item
        .dublin_core_ext()
        .and_then(|dc| dc.creators().first().cloned())
        .or_else(|| item.author().map(str::to_string));

    RawFeedItem {
        title: item.title().map(str::to_string),
        link: item.link().map(str::to_string),
        pub_date: item.pub_date().map(str::to_string),
        content_snippet: item.description().or(item.content()).map(strip_html),
        summary: None,
        content: item.content().map(str::to_string),
        creator: non_blank(creator.as_deref()),
    }
}

fn raw_from_atom(entry: &atom_syndication::Entry) -> RawFeedItem {
    let summary = entry.summary().map(|s| s.as_str());
    let content = entry.content().and_then(|c| c.value());

    RawFeedItem {
        title: Some(entry.title().as_str().to_string()),
        link: entry.links().first().map(|l| l.href().to_string()),
        pub_date: Some(
            entry
                .published()
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| entry.updated().to_rfc3339()),
        ),
        content_snippet: content.map(strip_html),
        summary: summary.map(strip_html),
        content: content.map(str::to_string),
        creator: entry.authors().first().map(|p| p.name().to_string()),
    }
}
