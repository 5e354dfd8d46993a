//! Maps feed items of any shape onto the canonical [`Article`]

use finterm_core::{parse_timestamp, Article, ArticleSource, RawFeedItem};

use crate::text::non_blank;

/// Maximum number of articles kept from one source
pub const MAX_ARTICLES: usize = 12;

/// Normalize the items fetched from `source_url`
///
/// - description: content snippet, then summary, then raw content
/// - source name: item creator, then the hostname of `source_url`
/// - items without a title or link are dropped
/// - at most `max_articles` articles are returned, in feed order
pub fn normalize(items: Vec<RawFeedItem>, source_url: &str, max_articles: usize) -> Vec<Article> {
    let fallback_source = source_hostname(source_url);

    items
        .into_iter()
        .filter_map(|item| {
            let title = non_blank(item.title.as_deref())?;
            let url = non_blank(item.link.as_deref())?;

            let description = non_blank(item.content_snippet.as_deref())
                .or_else(|| non_blank(item.summary.as_deref()))
                .or_else(|| non_blank(item.content.as_deref()))
                .unwrap_or_default();

            let published_at = match item.pub_date {
                Some(raw) => parse_timestamp(&raw)
                    .map(|d| d.to_rfc3339())
                    .unwrap_or(raw),
                None => String::new(),
            };

            let source_name =
                non_blank(item.creator.as_deref()).unwrap_or_else(|| fallback_source.clone());

            Some(Article {
                title,
                description,
                url,
                published_at,
                source: ArticleSource::new(source_name),
                url_to_image: None,
            })
        })
        .take(max_articles)
        .collect()
}

fn source_hostname(source_url: &str) -> String {
    url::Url::parse(source_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| source_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://finance.yahoo.com/news/rss";

    fn raw(title: Option<&str>, link: Option<&str>) -> RawFeedItem {
        RawFeedItem {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
            pub_date: Some("Fri, 16 Oct 2026 09:00:00 GMT".to_string()),
            content_snippet: Some("snippet".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_items_missing_title_or_link() {
        let items = vec![
            raw(Some("a"), Some("https://x/a")),
            raw(None, Some("https://x/b")),
            raw(Some("c"), None),
            raw(Some("   "), Some("https://x/d")),
            raw(Some("e"), Some("https://x/e")),
        ];
        let articles = normalize(items, SOURCE, MAX_ARTICLES);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "a");
        assert_eq!(articles[1].title, "e");
    }

    #[test]
    fn test_description_priority() {
        let mut item = raw(Some("a"), Some("https://x/a"));
        item.content_snippet = Some(String::new());
        item.summary = Some("summary".to_string());
        item.content = Some("content".to_string());
        assert_eq!(normalize(vec![item.clone()], SOURCE, 12)[0].description, "summary");

        item.summary = None;
        assert_eq!(normalize(vec![item.clone()], SOURCE, 12)[0].description, "content");

        item.content = None;
        assert_eq!(normalize(vec![item], SOURCE, 12)[0].description, "");
    }

    #[test]
    fn test_source_name_falls_back_to_hostname() {
        let mut item = raw(Some("a"), Some("https://x/a"));
        assert_eq!(normalize(vec![item.clone()], SOURCE, 12)[0].source.name, "finance.yahoo.com");

        item.creator = Some("Reuters".to_string());
        assert_eq!(normalize(vec![item], SOURCE, 12)[0].source.name, "Reuters");
    }

    #[test]
    fn test_truncates_to_max() {
        let items: Vec<_> = (0..20)
            .map(|i| raw(Some(format!("t{}", i).as_str()), Some(format!("https://x/{}", i).as_str())))
            .collect();
        let articles = normalize(items, SOURCE, MAX_ARTICLES);
        assert_eq!(articles.len(), MAX_ARTICLES);
        assert_eq!(articles[11].title, "t11");
    }

    #[test]
    fn test_published_at_is_normalized() {
        let articles = normalize(vec![raw(Some("a"), Some("https://x/a"))], SOURCE, 12);
        assert_eq!(articles[0].published_at, "2026-10-16T09:00:00+00:00");

        let mut item = raw(Some("a"), Some("https://x/a"));
        item.pub_date = Some("sometime".to_string());
        assert_eq!(normalize(vec![item], SOURCE, 12)[0].published_at, "sometime");
    }

    #[test]
    fn test_normalizing_own_output_is_identity() {
        let mut items = vec![
            raw(Some("a"), Some("https://x/a")),
            raw(Some("b"), Some("https://x/b")),
        ];
        items[1].creator = Some("Bloomberg".to_string());
        items[1].content_snippet = None;

        let first = normalize(items, SOURCE, MAX_ARTICLES);
        let round: Vec<RawFeedItem> = first
            .iter()
            .map(|a| RawFeedItem {
                title: Some(a.title.clone()),
                link: Some(a.url.clone()),
                pub_date: Some(a.published_at.clone()),
                content_snippet: Some(a.description.clone()),
                creator: Some(a.source.name.clone()),
                ..Default::default()
            })
            .collect();

        assert_eq!(normalize(round, SOURCE, MAX_ARTICLES), first);
    }
}
