use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use finterm_core::{Article, ArticleSource, PipelineError};
use finterm_services::{ChatCompletionClient, DailyQuota, Enricher, SystemClock, TextGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn article() -> Article {
    Article {
        title: "Fed holds rates steady".to_string(),
        description: "The Federal Reserve left rates unchanged.".to_string(),
        url: "https://example.com/fed".to_string(),
        published_at: Utc::now().to_rfc3339(),
        source: ArticleSource::new("Example Wire"),
        url_to_image: None,
    }
}

#[tokio::test]
async fn sends_chat_request_and_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.5,
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"ok\":true}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new("sk-test", &server.uri(), "gpt-4o-mini");
    let text = client.generate_json("system", "user").await.unwrap();

    assert_eq!(text, "{\"ok\":true}");
}

#[tokio::test]
async fn error_status_reports_truncated_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("x".repeat(500)))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new("sk-test", &server.uri(), "gpt-4o-mini");
    let err = client.generate_json("system", "user").await.unwrap_err();

    let expected = format!("AI API 錯誤 (429): {}", "x".repeat(100));
    assert_eq!(err, PipelineError::enrichment(expected));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("{}"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new("sk-test", &server.uri(), "gpt-4o-mini")
        .with_timeout(Duration::from_millis(100));

    assert!(matches!(
        client.generate_json("system", "user").await,
        Err(PipelineError::EnrichmentFailed(_))
    ));
}

#[tokio::test]
async fn enricher_decodes_fenced_model_output() {
    let server = MockServer::start().await;
    let fenced = "```json\n{\"title\":\"聯準會按兵不動\",\"summary\":\"利率維持不變\",\"aiInsight\":\"短期利好債市\",\"category\":\"央行\"}\n```";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(fenced)))
        .mount(&server)
        .await;

    let generator = Arc::new(ChatCompletionClient::new("sk-test", &server.uri(), "gpt-4o-mini"));
    let enricher = Enricher::new(generator, Arc::new(DailyQuota::new(50, SystemClock::shared())));

    let fields = enricher.enrich_article(&article(), 0).await.unwrap();
    assert_eq!(fields.title, "聯準會按兵不動");
    assert_eq!(fields.ai_insight, "短期利好債市");
    assert_eq!(fields.category, "央行");
}

#[tokio::test]
async fn enricher_reports_unparseable_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("not json at all")))
        .mount(&server)
        .await;

    let generator = Arc::new(ChatCompletionClient::new("sk-test", &server.uri(), "gpt-4o-mini"));
    let enricher = Enricher::new(generator, Arc::new(DailyQuota::new(50, SystemClock::shared())));

    let err = enricher.enrich_article(&article(), 0).await.unwrap_err();
    assert!(err.to_string().starts_with("JSON 解析失敗"));
}
