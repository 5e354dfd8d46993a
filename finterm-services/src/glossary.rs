//! Glossary lookups
//!
//! Resolution order: built-in table, fresh cache entry, then the
//! text-generation API with bounded retries. Only model answers are cached.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use finterm_core::PipelineError;
use finterm_news::static_term_definition;

use crate::enrichment::strip_code_fences;
use crate::llm_client::TextGenerator;
use crate::quota::DailyQuota;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::term_cache::TermCache;

pub const MISSING_API_KEY: &str = "缺少 OPENAI_API_KEY";

const SYSTEM_PROMPT: &str = "你是一個專業的財經術語解釋助手。請用繁體中文向普通投資者簡潔地解釋財經術語，必要時舉例說明。請以 JSON 格式回應，不要包含 markdown 標記。";

#[derive(Debug, Deserialize)]
struct TermExplanation {
    #[serde(default)]
    explanation: String,
}

pub struct GlossaryService {
    cache: Arc<TermCache>,
    generator: Option<Arc<dyn TextGenerator>>,
    quota: Arc<DailyQuota>,
    retry: RetryPolicy,
}

impl GlossaryService {
    pub fn new(
        cache: Arc<TermCache>,
        generator: Option<Arc<dyn TextGenerator>>,
        quota: Arc<DailyQuota>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            generator,
            quota,
            retry,
        }
    }

    #[instrument(skip(self))]
    pub async fn lookup(&self, term: &str) -> Result<String, PipelineError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(PipelineError::validation("missing_term", "請輸入要查詢的術語"));
        }

        if let Some(definition) = static_term_definition(term) {
            debug!("Term '{}' served from the built-in glossary", term);
            return Ok(definition.to_string());
        }

        if let Some(cached) = self.cache.get(term) {
            debug!("Term '{}' served from cache", term);
            return Ok(cached);
        }

        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| PipelineError::config_missing(MISSING_API_KEY))?;

        let explanation = self
            .cache
            .get_or_try_insert_with(term, || async {
                if !self.quota.try_acquire() {
                    return Err(PipelineError::enrichment("daily request quota exhausted"));
                }
                retry_with_backoff(&self.retry, "term lookup", |_| {
                    explain_once(generator.as_ref(), term)
                })
                .await
            })
            .await?;

        info!("Explained term '{}' via text generation", term);
        Ok(explanation)
    }

    pub fn cache(&self) -> &TermCache {
        &self.cache
    }
}

async fn explain_once(generator: &dyn TextGenerator, term: &str) -> Result<String, PipelineError> {
    let prompt = format!(
        "請解釋以下財經術語：「{}」。回應格式：{{\"explanation\":\"[繁體中文解釋]\"}}",
        term
    );
    let text = generator.generate_json(SYSTEM_PROMPT, &prompt).await?;

    let parsed: TermExplanation = serde_json::from_str(&strip_code_fences(&text))
        .map_err(|e| PipelineError::enrichment(format!("JSON 解析失敗: {}.", e)))?;

    if parsed.explanation.trim().is_empty() {
        return Err(PipelineError::enrichment("AI 未提供術語解釋"));
    }
    Ok(parsed.explanation)
}
