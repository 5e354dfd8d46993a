//! Enrichment Stage
//!
//! Turns an English article into Traditional-Chinese card fields plus an
//! investor-oriented insight with one text-generation call per article.

use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use finterm_core::{Article, EnrichedFields, PipelineError};
use finterm_news::text::truncate_chars;

use crate::llm_client::TextGenerator;
use crate::quota::DailyQuota;

/// Description characters sent to the model
pub const DESCRIPTION_PROMPT_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = "你是一個專業的財經翻譯和分析助手。請將新聞翻譯成繁體中文，並提供針對普通投資者的投資解讀。解讀應包含對市場影響、潛在機會或風險的分析。請以 JSON 格式回應，不要包含 markdown 標記。";

const QUOTA_EXHAUSTED: &str = "daily request quota exhausted";

/// When enrichment happens relative to the bulk news request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentMode {
    /// Cards go out pending; the dashboard enriches them one by one
    #[default]
    Lazy,
    /// All cards are enriched before the bulk response is sent
    Eager,
}

impl FromStr for EnrichmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(other.to_string()),
        }
    }
}

pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
    quota: Arc<DailyQuota>,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>, quota: Arc<DailyQuota>) -> Self {
        Self { generator, quota }
    }

    /// One generation call for one article. `index` is only used for tracing.
    #[instrument(skip(self, article), fields(title = %article.title))]
    pub async fn enrich_article(
        &self,
        article: &Article,
        index: usize,
    ) -> Result<EnrichedFields, PipelineError> {
        if !self.quota.try_acquire() {
            return Err(PipelineError::enrichment(QUOTA_EXHAUSTED));
        }

        let prompt = build_user_prompt(article);
        let text = self.generator.generate_json(SYSTEM_PROMPT, &prompt).await?;
        let fields = parse_enrichment(&text)?;

        debug!("Enriched article {} as '{}'", index, fields.title);
        Ok(fields)
    }

    /// Enrich every article concurrently. Output order matches input order
    /// and one failure never affects the others.
    pub async fn enrich_all(&self, articles: &[Article]) -> Vec<Result<EnrichedFields, PipelineError>> {
        let results = join_all(
            articles
                .iter()
                .enumerate()
                .map(|(index, article)| self.enrich_article(article, index)),
        )
        .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!("{} of {} articles failed enrichment", failed, articles.len());
        }
        results
    }
}

fn build_user_prompt(article: &Article) -> String {
    format!(
        "請將以下財經新聞翻譯成繁體中文，並提供針對普通投資者的投資解讀。解讀應包含對市場影響、潛在機會或風險的分析。\
         回應格式：{{\"title\":\"[繁體中文標題]\",\"summary\":\"[繁體中文摘要]\",\"aiInsight\":\"[繁體中文投資解讀]\",\"category\":\"[繁體中文類別]\"}}。\
         新聞內容:\n標題: {}\n摘要: {}\n來源: {}",
        article.title,
        truncate_chars(&article.description, DESCRIPTION_PROMPT_CHARS),
        article.source.name
    )
}

/// Remove markdown code fences some models wrap around JSON
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Decode model output into card fields
pub fn parse_enrichment(text: &str) -> Result<EnrichedFields, PipelineError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned)
        .map_err(|e| PipelineError::enrichment(format!("JSON 解析失敗: {}.", e)))
}
