//! Core types for the AI Finance Terminal
//!
//! This crate defines the shared data structures used across the terminal:
//! feed items, normalized articles, dashboard news cards, the request and
//! response bodies of the news API, and the pipeline error taxonomy.

pub mod envelope;
pub mod error;
pub mod news;
pub mod time;

pub use envelope::{
    ArticlePayload, NewsEnvelope, ProcessSingleEnvelope, ProcessSingleRequest, TermEnvelope,
};
pub use error::{PipelineError, PipelineResult};
pub use news::{
    build_cards, Article, ArticleSource, EnrichedFields, NewsCardItem, RawFeedItem,
    FAILED_CATEGORY, FAILED_SUMMARY_FALLBACK, INSIGHT_UNAVAILABLE, NEWS_CARD_COUNT,
    PENDING_INSIGHT, PRESET_SOURCE, SUMMARY_FALLBACK, UNKNOWN_SOURCE,
};
pub use time::{parse_timestamp, relative_time_label, UNKNOWN_TIME};
