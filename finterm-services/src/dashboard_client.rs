//! Dashboard Client
//!
//! Consumer side of the news API, as the dashboard uses it: bulk fetch with
//! retries and a local fallback, then per-card enrichment merged back in
//! place.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use finterm_core::{
    EnrichedFields, NewsCardItem, NewsEnvelope, ProcessSingleEnvelope, TermEnvelope,
};
use finterm_news::local_fallback_cards;

use crate::retry::{retry_with_backoff, RetryPolicy};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("服務器返回非 JSON 格式數據")]
    NotJson,

    #[error("{0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::NotJson
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Where the cards of a bulk fetch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsOrigin {
    Server,
    LocalFallback,
}

#[derive(Debug, Clone)]
pub struct NewsFetchOutcome {
    pub news: Vec<NewsCardItem>,
    pub origin: NewsOrigin,
    pub attempts: u32,
    pub from_cache: bool,
}

pub struct DashboardClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the bulk cards. Never fails: once retries are spent the local
    /// preset cards are returned without an error.
    #[instrument(skip(self))]
    pub async fn fetch_news(&self) -> NewsFetchOutcome {
        let mut attempts = 0;
        let result = retry_with_backoff(&self.retry, "news fetch", |attempt| {
            attempts = attempt + 1;
            self.fetch_news_once()
        })
        .await;

        match result {
            Ok(envelope) => NewsFetchOutcome {
                news: envelope.news,
                origin: NewsOrigin::Server,
                attempts,
                from_cache: envelope.from_cache.unwrap_or(false),
            },
            Err(e) => {
                warn!("News fetch gave up after {} attempts, using local news: {}", attempts, e);
                NewsFetchOutcome {
                    news: local_fallback_cards(),
                    origin: NewsOrigin::LocalFallback,
                    attempts,
                    from_cache: false,
                }
            }
        }
    }

    async fn fetch_news_once(&self) -> Result<NewsEnvelope, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/news", self.base_url))
            .timeout(self.timeout)
            .send()
            .await?;

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if !is_json {
            return Err(ClientError::NotJson);
        }

        let envelope: NewsEnvelope = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| "新聞加載失敗".to_string()),
            ));
        }
        Ok(envelope)
    }

    /// Ask the server to enrich one card
    pub async fn process_card(&self, card: &NewsCardItem) -> Result<EnrichedFields, ClientError> {
        let body = json!({
            "article": {
                "title": card.title,
                "description": card.summary,
                "source": { "name": card.source },
            }
        });

        let envelope: ProcessSingleEnvelope = self
            .client
            .post(format!("{}/api/news/process-single", self.base_url))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        match envelope.processed_article {
            Some(fields) if envelope.success => Ok(fields),
            _ => Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| "AI 處理失敗".to_string()),
            )),
        }
    }

    /// Enrich every pending card and merge results at the card's own index.
    /// Failed cards keep their pending state. Returns the number merged.
    #[instrument(skip_all, fields(cards = cards.len()))]
    pub async fn enrich_pending(&self, cards: &mut [NewsCardItem]) -> usize {
        let pending: Vec<usize> = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_pending())
            .map(|(index, _)| index)
            .collect();

        let results = join_all(pending.iter().map(|&index| self.process_card(&cards[index]))).await;

        let mut merged = 0;
        for (index, result) in pending.into_iter().zip(results) {
            match result {
                Ok(fields) => {
                    cards[index].apply_enrichment(&fields);
                    merged += 1;
                }
                Err(e) => debug!("Card {} stays pending: {}", index + 1, e),
            }
        }

        info!("Merged enrichment into {} cards", merged);
        merged
    }

    /// Look up a financial term
    pub async fn lookup_term(&self, term: &str) -> Result<String, ClientError> {
        let envelope: TermEnvelope = self
            .client
            .get(format!("{}/api/news", self.base_url))
            .query(&[("term", term)])
            .timeout(self.timeout)
            .send()
            .await?
            .json()
            .await?;

        match envelope.explanation {
            Some(explanation) if envelope.success => Ok(explanation),
            _ => Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| "查詢失敗".to_string()),
            )),
        }
    }
}
