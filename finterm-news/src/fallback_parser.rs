//! Permissive RSS extractor used when structured parsing fails
//!
//! This is deliberately not an XML parser. It finds repeated `<item>` blocks
//! and pulls fields out of each one by literal delimiter matching, which
//! copes with feeds that are malformed enough for the `rss` crate to reject.

use chrono::{DateTime, Utc};
use regex::Regex;

use finterm_core::{RawFeedItem, UNKNOWN_SOURCE};

use crate::text::{decode_entities, non_blank, strip_html, truncate_chars};

/// Maximum length of the description snippet, in characters
pub const SNIPPET_MAX_CHARS: usize = 250;

/// Extract feed items from a raw RSS document
///
/// Missing publication dates default to `now`, missing creators to
/// [`UNKNOWN_SOURCE`]. Items without a title or link are still returned;
/// the normalizer decides what to drop.
pub fn parse_items(xml: &str, now: DateTime<Utc>) -> Vec<RawFeedItem> {
    let Some(patterns) = ItemPatterns::compile() else {
        return Vec::new();
    };

    patterns
        .item
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|block| patterns.extract(block.as_str(), now))
        .collect()
}

struct ItemPatterns {
    item: Regex,
    title: Regex,
    link: Regex,
    pub_date: Regex,
    description: Regex,
    creator: Regex,
}

impl ItemPatterns {
    fn compile() -> Option<Self> {
        Some(Self {
            item: Regex::new(r"(?s)<item(?:\s[^>]*)?>(.*?)</item>").ok()?,
            title: tag_pattern("title")?,
            link: tag_pattern("link")?,
            pub_date: tag_pattern("pubDate")?,
            description: tag_pattern("description")?,
            creator: tag_pattern("dc:creator")?,
        })
    }

    fn extract(&self, block: &str, now: DateTime<Utc>) -> RawFeedItem {
        let description = tag_value(&self.description, block)
            .map(|d| truncate_chars(&strip_html(&d), SNIPPET_MAX_CHARS));

        RawFeedItem {
            title: tag_value(&self.title, block).map(|t| decode_entities(&t)),
            link: tag_value(&self.link, block),
            pub_date: Some(tag_value(&self.pub_date, block).unwrap_or_else(|| now.to_rfc2822())),
            content_snippet: Some(description.unwrap_or_default()),
            summary: None,
            content: None,
            creator: Some(
                tag_value(&self.creator, block).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            ),
        }
    }
}

/// Matches `<tag ...>value</tag>` where value may be wrapped in CDATA
fn tag_pattern(tag: &str) -> Option<Regex> {
    let tag = regex::escape(tag);
    Regex::new(&format!(
        r"(?s)<{tag}(?:\s[^>]*)?>\s*(?:<!\[CDATA\[(.*?)\]\]>|(.*?))\s*</{tag}>"
    ))
    .ok()
}

fn tag_value(pattern: &Regex, block: &str) -> Option<String> {
    let caps = pattern.captures(block)?;
    non_blank(caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()))
}
