//! News data structures for the dashboard pipeline
//!
//! A fetch cycle moves data through three shapes:
//! [`RawFeedItem`] (whatever a feed gave us) → [`Article`] (normalized) →
//! [`NewsCardItem`] (the fixed-width list the dashboard renders).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::relative_time_label;

/// Number of cards in every bulk response. The front end lays out a fixed grid.
pub const NEWS_CARD_COUNT: usize = 9;

/// Insight text meaning "enrichment has not happened yet"
pub const PENDING_INSIGHT: &str = "AI 正在解讀中...";

/// Creator used by the fallback feed parser when an item has none
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Source name attached to canned fallback articles
pub const PRESET_SOURCE: &str = "系統預置";

/// Card summary when an article has no description
pub const SUMMARY_FALLBACK: &str = "點擊查看原文";

/// Card summary when enrichment failed and there is no description
pub const FAILED_SUMMARY_FALLBACK: &str = "請點擊閱讀原文查看詳情";

/// Category attached to cards whose enrichment failed
pub const FAILED_CATEGORY: &str = "系統提示";

/// Insight used by the consumer when enrichment returned an empty insight
pub const INSIGHT_UNAVAILABLE: &str = "💡 AI 解讀暫時不可用";

/// One entry as parsed from a feed, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Publication timestamp in whatever format the source uses
    pub pub_date: Option<String>,
    /// HTML-stripped description
    pub content_snippet: Option<String>,
    pub summary: Option<String>,
    /// Raw (possibly HTML) content
    pub content: Option<String>,
    pub creator: Option<String>,
}

/// Source attribution of an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
}

impl ArticleSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A normalized news article
///
/// `title` and `url` are never empty; the normalizer drops items that would
/// violate this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    /// RFC 3339 when the source date could be parsed, otherwise the raw value
    pub published_at: String,
    pub source: ArticleSource,
    pub url_to_image: Option<String>,
}

impl Article {
    /// Filler article used to pad a cycle that produced fewer than nine articles
    pub fn placeholder(index: usize, now: DateTime<Utc>) -> Self {
        Self {
            title: format!("Placeholder {}", index + 1),
            description: format!("No content for placeholder {}", index + 1),
            url: "#".to_string(),
            published_at: now.to_rfc3339(),
            source: ArticleSource::new("System"),
            url_to_image: None,
        }
    }
}

/// Fields produced by one text-generation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub ai_insight: String,
    #[serde(default)]
    pub category: String,
}

/// The unit the dashboard renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsCardItem {
    /// 1-based position
    pub id: usize,
    pub title: String,
    pub source: String,
    /// Relative label such as `3小時前`
    pub time: String,
    pub summary: String,
    pub ai_insight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    pub original_title: String,
}

impl NewsCardItem {
    /// Build the unenriched card for the article at `index` (zero-based)
    pub fn from_article(index: usize, article: &Article, now: DateTime<Utc>) -> Self {
        let summary = if article.description.is_empty() {
            SUMMARY_FALLBACK.to_string()
        } else {
            article.description.clone()
        };

        Self {
            id: index + 1,
            title: article.title.clone(),
            source: article.source.name.clone(),
            time: relative_time_label(&article.published_at, now),
            summary,
            ai_insight: PENDING_INSIGHT.to_string(),
            category: None,
            url: article.url.clone(),
            image: article.url_to_image.clone(),
            original_title: article.title.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.ai_insight == PENDING_INSIGHT
    }

    /// Overlay enrichment output. Empty fields keep the current value, except
    /// the insight which degrades to [`INSIGHT_UNAVAILABLE`].
    pub fn apply_enrichment(&mut self, fields: &EnrichedFields) {
        if !fields.title.is_empty() {
            self.title = fields.title.clone();
        }
        if !fields.summary.is_empty() {
            self.summary = fields.summary.clone();
        }
        self.ai_insight = if fields.ai_insight.is_empty() {
            INSIGHT_UNAVAILABLE.to_string()
        } else {
            fields.ai_insight.clone()
        };
        if !fields.category.is_empty() {
            self.category = Some(fields.category.clone());
        }
    }

    /// Mark this card as having failed enrichment
    pub fn mark_enrichment_failed(&mut self, message: &str) {
        if self.summary == SUMMARY_FALLBACK {
            self.summary = FAILED_SUMMARY_FALLBACK.to_string();
        }
        self.ai_insight = format!("💡 AI 處理失敗: {}", message);
        self.category = Some(FAILED_CATEGORY.to_string());
    }
}

/// Build exactly [`NEWS_CARD_COUNT`] unenriched cards, padding with placeholders
pub fn build_cards(articles: &[Article], now: DateTime<Utc>) -> Vec<NewsCardItem> {
    (0..NEWS_CARD_COUNT)
        .map(|i| match articles.get(i) {
            Some(article) => NewsCardItem::from_article(i, article, now),
            None => NewsCardItem::from_article(i, &Article::placeholder(i, now), now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: &str) -> Article {
        Article {
            title: title.to_string(),
            description: description.to_string(),
            url: format!("https://example.com/{}", title),
            published_at: "2026-10-16T08:00:00+00:00".to_string(),
            source: ArticleSource::new("Example"),
            url_to_image: None,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-16T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_build_cards_pads_to_nine() {
        let articles = vec![article("a", "first"), article("b", "second")];
        let cards = build_cards(&articles, now());

        assert_eq!(cards.len(), NEWS_CARD_COUNT);
        assert_eq!(cards[0].title, "a");
        assert_eq!(cards[1].id, 2);
        assert_eq!(cards[2].title, "Placeholder 3");
        assert_eq!(cards[8].source, "System");
        assert_eq!(cards[8].url, "#");
        assert!(cards.iter().all(NewsCardItem::is_pending));
    }

    #[test]
    fn test_build_cards_truncates_extra_articles() {
        let articles: Vec<_> = (0..12).map(|i| article(&i.to_string(), "x")).collect();
        let cards = build_cards(&articles, now());
        assert_eq!(cards.len(), NEWS_CARD_COUNT);
        assert_eq!(cards[8].title, "8");
    }

    #[test]
    fn test_empty_description_uses_summary_sentinel() {
        let card = NewsCardItem::from_article(0, &article("a", ""), now());
        assert_eq!(card.summary, SUMMARY_FALLBACK);
        assert_eq!(card.time, "2小時前");
    }

    #[test]
    fn test_apply_enrichment_keeps_original_title() {
        let mut card = NewsCardItem::from_article(0, &article("Fed holds rates", "desc"), now());
        card.apply_enrichment(&EnrichedFields {
            title: "聯準會維持利率".to_string(),
            summary: String::new(),
            ai_insight: String::new(),
            category: "貨幣政策".to_string(),
        });

        assert_eq!(card.title, "聯準會維持利率");
        assert_eq!(card.original_title, "Fed holds rates");
        assert_eq!(card.summary, "desc");
        assert_eq!(card.ai_insight, INSIGHT_UNAVAILABLE);
        assert_eq!(card.category.as_deref(), Some("貨幣政策"));
    }

    #[test]
    fn test_mark_enrichment_failed() {
        let mut card = NewsCardItem::from_article(0, &article("a", ""), now());
        card.mark_enrichment_failed("timeout");
        assert_eq!(card.ai_insight, "💡 AI 處理失敗: timeout");
        assert_eq!(card.summary, FAILED_SUMMARY_FALLBACK);
        assert_eq!(card.category.as_deref(), Some(FAILED_CATEGORY));
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let card = NewsCardItem::from_article(0, &article("a", "b"), now());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["aiInsight"], PENDING_INSIGHT);
        assert_eq!(json["originalTitle"], "a");
        assert!(json["image"].is_null());
        assert!(json.get("category").is_none());
    }
}
