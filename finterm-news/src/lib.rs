//! News acquisition for the AI Finance Terminal
//!
//! This crate provides:
//! - Feed fetching: ordered RSS/Atom sources with a regex extractor fallback
//! - Normalization: heterogeneous feed items to canonical articles
//! - Fallback content: preset articles and the built-in glossary

pub mod error;
pub mod fallback;
pub mod fallback_parser;
pub mod feed_fetcher;
pub mod normalizer;
pub mod text;

pub use error::FeedError;
pub use fallback::{fallback_articles, fallback_cards, local_fallback_cards, static_term_definition};
pub use feed_fetcher::{
    default_feeds, parse_structured, ArticleProvider, FeedFetcher, FeedFetcherConfig, FeedSource,
};
pub use normalizer::{normalize, MAX_ARTICLES};
