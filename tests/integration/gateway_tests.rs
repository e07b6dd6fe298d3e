//! HTTP gateway tests against mock servers

use chrono::{TimeZone, Utc};
use kibitz::config::{Config, Credentials, GeneratorConfig, OAuthCredentials};
use kibitz::gateway::{
    FetchOutcome, GatewayError, ItemSource, PublishGateway, PublishOutcome, Publisher,
    SearchGateway, TrendGateway,
};
use kibitz::generator::{ChatCompletionsClient, GenerationError, TextGenerator};
use kibitz::queue::FetchedItem;
use kibitz::{Agent, TickOutcome};
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn test_oauth() -> OAuthCredentials {
    OAuthCredentials {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "at".to_string(),
        access_token_secret: "ats".to_string(),
    }
}

fn search_gateway(server: &MockServer) -> SearchGateway {
    SearchGateway::new(
        format!("{}/2/tweets/search/recent", server.uri()),
        Some("test-token".to_string()),
        TIMEOUT,
    )
    .expect("Failed to build search gateway")
}

fn publish_gateway(server: &MockServer) -> PublishGateway {
    let url = Url::parse(&format!("{}/2/tweets", server.uri())).expect("Failed to parse URL");
    PublishGateway::new(url, Some(test_oauth()), TIMEOUT).expect("Failed to build publish gateway")
}

fn chat_client(server: &MockServer) -> ChatCompletionsClient {
    let config = GeneratorConfig {
        endpoint: format!("{}/openai/v1/chat/completions", server.uri()),
        ..GeneratorConfig::default()
    };
    ChatCompletionsClient::new(&config, Some("groq-key".to_string()))
        .expect("Failed to build chat client")
}

#[tokio::test]
async fn test_search_returns_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("query", "a lang:tr"))
        .and(query_param("max_results", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-rate-limit-remaining", "179")
                .set_body_json(json!({
                    "data": [
                        {"id": "1", "text": "ilk"},
                        {"id": "2", "text": "ikinci"}
                    ],
                    "meta": {"result_count": 2}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = search_gateway(&server).fetch("a lang:tr", 10).await;

    assert_eq!(
        outcome,
        FetchOutcome::Items(vec![
            FetchedItem::post("1", "ilk"),
            FetchedItem::post("2", "ikinci"),
        ])
    );
}

#[tokio::test]
async fn test_search_without_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})),
        )
        .mount(&server)
        .await;

    assert_eq!(
        search_gateway(&server).fetch("q", 10).await,
        FetchOutcome::Empty
    );
}

#[tokio::test]
async fn test_search_rate_limited_with_reset() {
    let server = MockServer::start().await;
    let reset = Utc::now().timestamp() + 120;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-rate-limit-remaining", "0")
                .insert_header("x-rate-limit-reset", reset.to_string().as_str()),
        )
        .mount(&server)
        .await;

    let expected = Utc.timestamp_opt(reset, 0).single().unwrap();
    assert_eq!(
        search_gateway(&server).fetch("q", 10).await,
        FetchOutcome::RateLimited { reset_at: expected }
    );
}

#[tokio::test]
async fn test_search_rate_limited_without_reset_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    assert_eq!(
        search_gateway(&server).fetch("q", 10).await,
        FetchOutcome::Error(GatewayError::MissingResetMetadata { status: 429 })
    );
}

#[tokio::test]
async fn test_search_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    assert_eq!(
        search_gateway(&server).fetch("q", 10).await,
        FetchOutcome::Error(GatewayError::UpstreamRejected {
            status: 401,
            body: "Unauthorized".to_string()
        })
    );
}

#[tokio::test]
async fn test_search_undecodable_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        search_gateway(&server).fetch("q", 10).await,
        FetchOutcome::Error(GatewayError::Decode(_))
    ));
}

#[tokio::test]
async fn test_search_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let gateway = SearchGateway::new(
        format!("{}/2/tweets/search/recent", server.uri()),
        Some("test-token".to_string()),
        Duration::from_millis(200),
    )
    .unwrap();

    assert_eq!(
        gateway.fetch("q", 10).await,
        FetchOutcome::Error(GatewayError::Transport("Request timeout".to_string()))
    );
}

#[tokio::test]
async fn test_publish_reply_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_exists("authorization"))
        .and(body_partial_json(json!({
            "text": "merhaba",
            "reply": {"in_reply_to_tweet_id": "42"}
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({
                "data": {"id": "99", "text": "merhaba"}
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        publish_gateway(&server).publish(Some("42"), "merhaba").await,
        PublishOutcome::Success {
            new_id: Some("99".to_string())
        }
    );
}

#[tokio::test]
async fn test_publish_success_with_unreadable_body_keeps_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
        .mount(&server)
        .await;

    assert_eq!(
        publish_gateway(&server).publish(None, "gündem").await,
        PublishOutcome::Success { new_id: None }
    );
}

#[tokio::test]
async fn test_publish_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "60"))
        .mount(&server)
        .await;

    let before = Utc::now();
    match publish_gateway(&server).publish(Some("1"), "x").await {
        PublishOutcome::RateLimited { reset_at } => {
            let secs = (reset_at - before).num_seconds();
            assert!((59..=61).contains(&secs), "unexpected reset in {}s", secs);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_publish_rate_limited_without_reset_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    assert_eq!(
        publish_gateway(&server).publish(Some("1"), "x").await,
        PublishOutcome::Error(GatewayError::MissingResetMetadata { status: 429 })
    );
}

#[tokio::test]
async fn test_publish_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/2/tweets", server.uri())).unwrap();
    let gateway = PublishGateway::new(url, Some(test_oauth()), Duration::from_millis(200)).unwrap();

    assert_eq!(
        gateway.publish(None, "x").await,
        PublishOutcome::Error(GatewayError::Transport("Request timeout".to_string()))
    );
}

#[tokio::test]
async fn test_publish_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"detail": "You are not allowed to create a Tweet"})),
        )
        .mount(&server)
        .await;

    match publish_gateway(&server).publish(Some("1"), "x").await {
        PublishOutcome::Error(GatewayError::UpstreamRejected { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("not allowed"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_completion_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer groq-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "prompt"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Karpuz kestim"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        chat_client(&server).complete("sys", "prompt").await,
        Ok("Karpuz kestim".to_string())
    );
}

#[tokio::test]
async fn test_chat_completion_blank_is_empty_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "   "}}]
        })))
        .mount(&server)
        .await;

    assert_eq!(
        chat_client(&server).complete("sys", "prompt").await,
        Err(GenerationError::EmptyOutput)
    );
}

#[tokio::test]
async fn test_chat_completion_upstream_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "Service overloaded", "type": "server_error"}
        })))
        .mount(&server)
        .await;

    assert_eq!(
        chat_client(&server).complete("sys", "prompt").await,
        Err(GenerationError::Upstream {
            status: 503,
            message: "Service overloaded".to_string()
        })
    );
}

#[tokio::test]
async fn test_chat_completion_bad_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"choices\": ["))
        .mount(&server)
        .await;

    assert!(matches!(
        chat_client(&server).complete("sys", "prompt").await,
        Err(GenerationError::Decode(_))
    ));
}

const TRENDS24_PAGE: &str = r#"
    <html><body>
      <div class="trend-card"><ol>
        <li><a>#Derbi</a><span>120K</span></li>
        <li><a>Ankara</a><span>8K</span></li>
      </ol></div>
    </body></html>
"#;

const TWITTER_TRENDING_PAGE: &str = r#"
    <html><head>
      <script type="application/ld+json">
        {"itemListElement":[{"name":"Ankara"},{"name":"Yeni Dizi"}]}
      </script>
    </head><body></body></html>
"#;

fn trend_gateway(server: &MockServer) -> TrendGateway {
    TrendGateway::new(
        format!("{}/turkey/", server.uri()),
        format!("{}/turkey/tr", server.uri()),
        "Mozilla/5.0 (test)",
        TIMEOUT,
    )
    .expect("Failed to build trend gateway")
}

#[tokio::test]
async fn test_trends_merge_and_rank() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/turkey/"))
        .and(header("user-agent", "Mozilla/5.0 (test)"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRENDS24_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/turkey/tr"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWITTER_TRENDING_PAGE))
        .mount(&server)
        .await;

    assert_eq!(
        trend_gateway(&server).fetch("", 10).await,
        FetchOutcome::Items(vec![
            FetchedItem::trend("Ankara"),
            FetchedItem::trend("#Derbi"),
            FetchedItem::trend("Yeni Dizi"),
        ])
    );
}

#[tokio::test]
async fn test_trends_one_listing_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/turkey/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRENDS24_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/turkey/tr"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(
        trend_gateway(&server).fetch("", 1).await,
        FetchOutcome::Items(vec![FetchedItem::trend("#Derbi")])
    );
}

#[tokio::test]
async fn test_trends_both_listings_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    assert!(matches!(
        trend_gateway(&server).fetch("", 10).await,
        FetchOutcome::Error(GatewayError::UpstreamRejected { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_trends_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "300"))
        .mount(&server)
        .await;

    assert!(matches!(
        trend_gateway(&server).fetch("", 10).await,
        FetchOutcome::RateLimited { .. }
    ));
}

#[tokio::test]
async fn test_trends_empty_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    assert_eq!(trend_gateway(&server).fetch("", 10).await, FetchOutcome::Empty);
}

#[tokio::test]
async fn test_agent_end_to_end_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "1", "text": "Bugün deprem oldu"},
                {"id": "2", "text": "Milli takım sahada"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "\"Ay-yıldızlılar sahada!\""}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_partial_json(json!({
            "text": "Ay-yıldızlılar sahada!",
            "reply": {"in_reply_to_tweet_id": "2"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "77"}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.source.search_url = format!("{}/2/tweets/search/recent", server.uri());
    config.publish.url = format!("{}/2/tweets", server.uri());
    config.generator.endpoint = format!("{}/openai/v1/chat/completions", server.uri());

    let credentials = Credentials::from_lookup(|name| {
        Some(
            match name {
                "TWITTER_BEARER_TOKEN" => "bearer",
                "TWITTER_API_KEY" => "ck",
                "TWITTER_API_SECRET" => "cs",
                "TWITTER_ACCESS_TOKEN" => "at",
                "TWITTER_ACCESS_TOKEN_SECRET" => "ats",
                "GROQ_API_KEY" => "groq",
                _ => return None,
            }
            .to_string(),
        )
    });

    let mut agent = Agent::from_config(&config, &credentials).expect("Failed to build agent");
    let report = agent.tick().await;

    assert_eq!(
        report.outcome,
        TickOutcome::Published {
            item_id: "2".to_string(),
            new_id: Some("77".to_string())
        }
    );
    assert_eq!(report.queue_len, 0);
    assert_eq!(agent.stats().blocked, 1);
}
