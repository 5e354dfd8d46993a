//! Error types for the news pipeline

use thiserror::Error;

/// Pipeline-wide error type
///
/// Every stage of the pipeline reports failures through this enum. None of
/// these variants are allowed to escape the HTTP boundary: the request
/// handler converts each of them into a well-formed response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// One feed source failed (network, timeout, parse). Non-fatal.
    #[error("Source unavailable ({source_url}): {reason}")]
    SourceUnavailable { source_url: String, reason: String },

    /// Every configured feed source failed.
    #[error("All news sources failed. Last error: {0}")]
    FetchExhausted(String),

    /// One article's text-generation call failed or returned unusable content.
    #[error("{0}")]
    EnrichmentFailed(String),

    /// Malformed inbound request.
    #[error("Validation error ({code}): {message}")]
    Validation { code: String, message: String },

    /// A required credential is absent.
    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn source_unavailable(source_url: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::SourceUnavailable {
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch_exhausted(msg: impl Into<String>) -> Self {
        PipelineError::FetchExhausted(msg.into())
    }

    pub fn enrichment(msg: impl Into<String>) -> Self {
        PipelineError::EnrichmentFailed(msg.into())
    }

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Validation {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn config_missing(msg: impl Into<String>) -> Self {
        PipelineError::ConfigurationMissing(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PipelineError::Internal(msg.into())
    }

    /// Message shown to the consumer inside a `{success: false}` envelope
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
