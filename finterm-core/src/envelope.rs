//! Request and response bodies exchanged with the dashboard
//!
//! All responses carry an explicit `success` flag. Transport status is 200
//! for everything except a malformed single-article request.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::news::{Article, ArticleSource, EnrichedFields, NewsCardItem, UNKNOWN_SOURCE};

/// Body of the bulk news endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub news: Vec<NewsCardItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NewsEnvelope {
    pub fn delivered(news: Vec<NewsCardItem>, timestamp: String, from_cache: bool) -> Self {
        Self {
            success: true,
            news,
            timestamp: Some(timestamp),
            from_cache: Some(from_cache),
            error: None,
        }
    }

    /// Failure envelope that still carries the best news available
    pub fn failed(error: impl Into<String>, news: Vec<NewsCardItem>) -> Self {
        Self {
            success: false,
            news,
            timestamp: None,
            from_cache: None,
            error: Some(error.into()),
        }
    }
}

/// Article as posted by the dashboard for single-article enrichment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArticlePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
}

/// Body of `POST /api/news/process-single`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProcessSingleRequest {
    #[serde(default)]
    pub article: Option<ArticlePayload>,
}

impl ProcessSingleRequest {
    /// Validate the payload and turn it into an [`Article`]
    ///
    /// Title and description are required and must be non-blank.
    pub fn into_article(self) -> Result<Article, PipelineError> {
        let missing = || PipelineError::validation("missing_article", "缺少新聞文章內容");

        let payload = self.article.ok_or_else(missing)?;
        let title = payload
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(missing)?;
        let description = payload
            .description
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(missing)?;
        let source = payload
            .source
            .filter(|s| !s.name.is_empty())
            .unwrap_or_else(|| ArticleSource::new(UNKNOWN_SOURCE));

        Ok(Article {
            title,
            description,
            url: String::new(),
            published_at: String::new(),
            source,
            url_to_image: None,
        })
    }
}

/// Body returned by single-article enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSingleEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_article: Option<EnrichedFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessSingleEnvelope {
    pub fn processed(fields: EnrichedFields) -> Self {
        Self {
            success: true,
            processed_article: Some(fields),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            processed_article: None,
            error: Some(error.into()),
        }
    }
}

/// Body returned by glossary lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TermEnvelope {
    pub fn explained(explanation: impl Into<String>) -> Self {
        Self {
            success: true,
            explanation: Some(explanation.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            explanation: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_single_request() {
        let json = r#"{"article":{"title":"Oil jumps","description":"Brent up 3%","source":{"name":"Reuters"}}}"#;
        let request: ProcessSingleRequest = serde_json::from_str(json).unwrap();
        let article = request.into_article().unwrap();
        assert_eq!(article.title, "Oil jumps");
        assert_eq!(article.source.name, "Reuters");
    }

    #[test]
    fn test_missing_description_is_validation_error() {
        let json = r#"{"article":{"title":"Oil jumps"}}"#;
        let request: ProcessSingleRequest = serde_json::from_str(json).unwrap();
        let err = request.into_article().unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
    }

    #[test]
    fn test_missing_article_is_validation_error() {
        let request: ProcessSingleRequest = serde_json::from_str("{}").unwrap();
        assert!(request.into_article().is_err());
    }

    #[test]
    fn test_missing_source_defaults() {
        let json = r#"{"article":{"title":"t","description":"d"}}"#;
        let request: ProcessSingleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.into_article().unwrap().source.name, UNKNOWN_SOURCE);
    }

    #[test]
    fn test_failed_news_envelope_shape() {
        let envelope = NewsEnvelope::failed("後端 API 錯誤: boom", vec![]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "後端 API 錯誤: boom");
        assert!(json.get("fromCache").is_none());
    }
}
