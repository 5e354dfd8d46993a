//! News Service
//!
//! Bulk retrieval of the nine dashboard cards and single-article enrichment.
//! Bulk requests are served from the news cache when fresh; otherwise one
//! refresh runs fetch, normalize, optional eager enrichment and store. The
//! refresh runs on its own task so a departing client never cancels it.

use std::sync::Arc;

use chrono::SecondsFormat;
use tracing::{debug, info, instrument, warn};

use finterm_core::{
    build_cards, Article, EnrichedFields, NewsCardItem, NewsEnvelope, PipelineError,
    NEWS_CARD_COUNT,
};
use finterm_news::{fallback_articles, fallback_cards, ArticleProvider};

use crate::clock::SharedClock;
use crate::enrichment::{Enricher, EnrichmentMode};
use crate::glossary::MISSING_API_KEY;
use crate::news_cache::NewsCache;

/// Prefix of the error carried by the outer failure envelope
pub const BACKEND_ERROR_PREFIX: &str = "後端 API 錯誤";

/// Everything a refresh needs, shareable with a spawned task
struct NewsPipeline {
    provider: Arc<dyn ArticleProvider>,
    enricher: Option<Arc<Enricher>>,
    mode: EnrichmentMode,
    clock: SharedClock,
}

impl NewsPipeline {
    async fn assemble(&self) -> Vec<NewsCardItem> {
        let now = self.clock.now();
        let articles = match self.provider.fetch_articles().await {
            Ok(articles) if !articles.is_empty() => articles,
            Ok(_) => {
                warn!("No articles from any source, serving preset news");
                fallback_articles(now)
            }
            Err(e) => {
                warn!("Fetching news failed, serving preset news: {}", e);
                fallback_articles(now)
            }
        };

        let mut cards = build_cards(&articles, now);
        if self.mode == EnrichmentMode::Eager {
            self.enrich_cards(&articles, &mut cards).await;
        }

        info!("Assembled {} news cards from {} articles", cards.len(), articles.len());
        cards
    }

    /// Overlay enrichment on the cards backed by real articles. Placeholders
    /// stay pending.
    async fn enrich_cards(&self, articles: &[Article], cards: &mut [NewsCardItem]) {
        let real = articles.len().min(NEWS_CARD_COUNT);

        let Some(enricher) = &self.enricher else {
            for card in cards.iter_mut().take(real) {
                card.mark_enrichment_failed(MISSING_API_KEY);
            }
            return;
        };

        let results = enricher.enrich_all(&articles[..real]).await;
        for (card, result) in cards.iter_mut().zip(results) {
            match result {
                Ok(fields) => card.apply_enrichment(&fields),
                Err(e) => card.mark_enrichment_failed(&e.to_string()),
            }
        }
    }
}

pub struct NewsService {
    pipeline: Arc<NewsPipeline>,
    cache: Arc<NewsCache>,
    clock: SharedClock,
}

impl NewsService {
    pub fn new(
        provider: Arc<dyn ArticleProvider>,
        enricher: Option<Arc<Enricher>>,
        cache: Arc<NewsCache>,
        mode: EnrichmentMode,
        clock: SharedClock,
    ) -> Self {
        Self {
            pipeline: Arc::new(NewsPipeline {
                provider,
                enricher,
                mode,
                clock: Arc::clone(&clock),
            }),
            cache,
            clock,
        }
    }

    pub fn mode(&self) -> EnrichmentMode {
        self.pipeline.mode
    }

    pub fn enrichment_configured(&self) -> bool {
        self.pipeline.enricher.is_some()
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    /// The bulk response: fresh cache hit or one refresh
    #[instrument(skip(self))]
    pub async fn get_news(&self) -> Result<NewsEnvelope, PipelineError> {
        if let Some(hit) = self.cache.fresh() {
            debug!("Serving {} cached news cards", hit.items.len());
            return Ok(NewsEnvelope::delivered(hit.items, timestamp(hit.stored_at), true));
        }

        let pipeline = Arc::clone(&self.pipeline);
        let cache = Arc::clone(&self.cache);
        let read = tokio::spawn(async move {
            cache
                .get_or_refresh(|| async move { pipeline.assemble().await })
                .await
        })
        .await
        .map_err(|e| PipelineError::internal(format!("news refresh task failed: {}", e)))?;

        Ok(NewsEnvelope::delivered(read.items, timestamp(read.stored_at), read.from_cache))
    }

    /// Like [`Self::get_news`] but never fails: internal errors become the
    /// outer failure envelope carrying the last cached or preset cards
    pub async fn news_envelope(&self) -> NewsEnvelope {
        match self.get_news().await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Bulk news request failed: {}", e);
                self.failed_envelope(e)
            }
        }
    }

    /// Drop the cached cards and rebuild them before answering
    pub async fn refresh_envelope(&self) -> NewsEnvelope {
        info!("Forced news refresh requested");
        self.cache.invalidate();
        self.news_envelope().await
    }

    /// Outer failure envelope for a request the handler could not read
    pub fn failed_envelope(&self, message: impl std::fmt::Display) -> NewsEnvelope {
        NewsEnvelope::failed(format!("{}: {}", BACKEND_ERROR_PREFIX, message), self.best_effort_news())
    }

    /// Last cached cards regardless of age, else the preset cards
    pub fn best_effort_news(&self) -> Vec<NewsCardItem> {
        self.cache
            .get()
            .map(|snapshot| snapshot.items)
            .unwrap_or_else(|| fallback_cards(self.clock.now()))
    }

    /// One enrichment call for a dashboard-submitted article
    #[instrument(skip(self, article), fields(title = %article.title))]
    pub async fn process_single(&self, article: Article) -> Result<EnrichedFields, PipelineError> {
        let enricher = self
            .pipeline
            .enricher
            .clone()
            .ok_or_else(|| PipelineError::config_missing(MISSING_API_KEY))?;

        tokio::spawn(async move { enricher.enrich_article(&article, 0).await })
            .await
            .map_err(|e| PipelineError::internal(format!("enrichment task failed: {}", e)))?
    }
}

fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use finterm_core::{ArticleSource, PENDING_INSIGHT, PRESET_SOURCE};

    use super::*;
    use crate::clock::ManualClock;
    use crate::llm_client::TextGenerator;
    use crate::news_cache::NEWS_CACHE_TTL;
    use crate::quota::DailyQuota;

    struct FixedProvider {
        articles: Result<Vec<Article>, PipelineError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArticleProvider for FixedProvider {
        async fn fetch_articles(&self) -> Result<Vec<Article>, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.articles.clone()
        }
    }

    /// Fails for the article titled "Story 4", translates the rest
    struct SelectiveGenerator;

    #[async_trait]
    impl TextGenerator for SelectiveGenerator {
        async fn generate_json(&self, _system: &str, user: &str) -> Result<String, PipelineError> {
            if user.contains("標題: Story 4\n") {
                return Err(PipelineError::enrichment("AI API 錯誤 (500): upstream"));
            }
            Ok(r#"{"title":"已翻譯","summary":"中文摘要","aiInsight":"投資解讀","category":"股市"}"#.to_string())
        }
    }

    fn articles(count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                title: format!("Story {}", i),
                description: format!("Body {}", i),
                url: format!("https://example.com/{}", i),
                published_at: Utc::now().to_rfc3339(),
                source: ArticleSource::new("Example"),
                url_to_image: None,
            })
            .collect()
    }

    fn build_service(
        result: Result<Vec<Article>, PipelineError>,
        mode: EnrichmentMode,
        with_key: bool,
    ) -> (NewsService, Arc<FixedProvider>, Arc<ManualClock>) {
        let clock = ManualClock::new(Utc::now());
        let provider = Arc::new(FixedProvider {
            articles: result,
            calls: AtomicUsize::new(0),
        });
        let enricher = with_key.then(|| {
            Arc::new(Enricher::new(
                Arc::new(SelectiveGenerator),
                Arc::new(DailyQuota::new(50, clock.clone())),
            ))
        });
        let service = NewsService::new(
            provider.clone(),
            enricher,
            Arc::new(NewsCache::new(NEWS_CACHE_TTL, clock.clone())),
            mode,
            clock.clone(),
        );
        (service, provider, clock)
    }

    #[tokio::test]
    async fn test_lazy_mode_returns_pending_cards_then_cache() {
        let (service, provider, clock) = build_service(Ok(articles(12)), EnrichmentMode::Lazy, true);

        let first = service.get_news().await.unwrap();
        assert!(first.success);
        assert_eq!(first.from_cache, Some(false));
        assert_eq!(first.news.len(), NEWS_CARD_COUNT);
        assert!(first.news.iter().all(|c| c.ai_insight == PENDING_INSIGHT));

        clock.advance(ChronoDuration::minutes(5));
        let second = service.get_news().await.unwrap();
        assert_eq!(second.from_cache, Some(true));
        assert_eq!(second.news, first.news);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        clock.advance(ChronoDuration::minutes(30));
        let third = service.get_news().await.unwrap();
        assert_eq!(third.from_cache, Some(false));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_serves_preset_cards() {
        let (service, _, _) = build_service(
            Err(PipelineError::fetch_exhausted("HTTP error! status: 503")),
            EnrichmentMode::Lazy,
            true,
        );

        let envelope = service.get_news().await.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.news.len(), NEWS_CARD_COUNT);
        assert!(envelope.news.iter().all(|c| c.source == PRESET_SOURCE));
    }

    #[tokio::test]
    async fn test_few_articles_padded_with_placeholders() {
        let (service, _, _) = build_service(Ok(articles(3)), EnrichmentMode::Lazy, true);
        let envelope = service.get_news().await.unwrap();

        assert_eq!(envelope.news.len(), NEWS_CARD_COUNT);
        assert_eq!(envelope.news[3].title, "Placeholder 4");
        assert_eq!(envelope.news[8].url, "#");
    }

    #[tokio::test]
    async fn test_eager_failure_is_isolated_to_one_card() {
        let (service, _, _) = build_service(Ok(articles(9)), EnrichmentMode::Eager, true);
        let envelope = service.get_news().await.unwrap();

        for (i, card) in envelope.news.iter().enumerate() {
            assert_eq!(card.id, i + 1);
            if i == 4 {
                assert!(card.ai_insight.starts_with("💡 AI 處理失敗: "));
                assert_eq!(card.category.as_deref(), Some("系統提示"));
                assert_eq!(card.title, "Story 4");
            } else {
                assert_eq!(card.title, "已翻譯");
                assert_eq!(card.ai_insight, "投資解讀");
                assert_eq!(card.original_title, format!("Story {}", i));
            }
        }
    }

    #[tokio::test]
    async fn test_eager_without_key_marks_real_cards() {
        let (service, _, _) = build_service(Ok(articles(2)), EnrichmentMode::Eager, false);
        let envelope = service.get_news().await.unwrap();

        assert_eq!(envelope.news[0].ai_insight, "💡 AI 處理失敗: 缺少 OPENAI_API_KEY");
        assert_eq!(envelope.news[1].ai_insight, "💡 AI 處理失敗: 缺少 OPENAI_API_KEY");
        assert_eq!(envelope.news[2].ai_insight, PENDING_INSIGHT);
    }

    #[tokio::test]
    async fn test_process_single() {
        let (service, _, _) = build_service(Ok(vec![]), EnrichmentMode::Lazy, true);
        let fields = service.process_single(articles(1).remove(0)).await.unwrap();
        assert_eq!(fields.ai_insight, "投資解讀");

        let (no_key, _, _) = build_service(Ok(vec![]), EnrichmentMode::Lazy, false);
        let err = no_key.process_single(articles(1).remove(0)).await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_API_KEY);
    }

    #[tokio::test]
    async fn test_best_effort_prefers_stale_cache() {
        let (service, _, clock) = build_service(Ok(articles(9)), EnrichmentMode::Lazy, true);
        assert!(service.best_effort_news().iter().all(|c| c.source == PRESET_SOURCE));

        service.get_news().await.unwrap();
        clock.advance(ChronoDuration::hours(2));
        assert_eq!(service.best_effort_news()[0].title, "Story 0");
    }

    #[tokio::test]
    async fn test_forced_refresh_bypasses_fresh_cache() {
        let (service, provider, clock) = build_service(Ok(articles(9)), EnrichmentMode::Lazy, true);

        service.get_news().await.unwrap();
        clock.advance(ChronoDuration::minutes(1));
        let refreshed = service.refresh_envelope().await;

        assert!(refreshed.success);
        assert_eq!(refreshed.from_cache, Some(false));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.get_news().await.unwrap().from_cache, Some(true));
    }

    #[tokio::test]
    async fn test_failed_envelope_carries_cards() {
        let (service, _, _) = build_service(Ok(articles(9)), EnrichmentMode::Lazy, true);
        let envelope = service.failed_envelope("bad query");

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("後端 API 錯誤: bad query"));
        assert_eq!(envelope.news.len(), NEWS_CARD_COUNT);
    }
}
