//! Wire-level tests for the render client and the retry wrapper around it.

use placardb_scraper::{retry_with_backoff, AdaptiveThrottle, RenderClient, ScraperError};
use wiremock::matchers::{body_json_string, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(render_endpoint: Option<String>) -> RenderClient {
    RenderClient::new(5, "placardb-test/1.0", render_endpoint, AdaptiveThrottle::disabled())
        .unwrap()
}

#[tokio::test]
async fn plain_get_returns_the_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jogo/2025-07-13-palmeiras-sao-paulo/123"))
        .and(headers(
            "accept-language",
            vec!["pt-BR", "pt;q=0.9", "en;q=0.8"],
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/jogo/2025-07-13-palmeiras-sao-paulo/123", server.uri());
    let doc = client(None).fetch_document(&url).await.unwrap();
    assert_eq!(doc.status, 200);
    assert_eq!(doc.html, "<html>ok</html>");
    assert_eq!(doc.url, url);
}

#[tokio::test]
async fn render_endpoint_posts_the_target_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(body_json_string(
            r#"{"url":"https://example.com/jogo/1"}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rendered</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(Some(format!("{}/content", server.uri())));
    let doc = client
        .fetch_document("https://example.com/jogo/1")
        .await
        .unwrap();
    assert_eq!(doc.html, "<html>rendered</html>");
    // The document keeps the target URL, not the renderer's.
    assert_eq!(doc.url, "https://example.com/jogo/1");
}

#[tokio::test]
async fn not_found_is_fatal_and_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jogo/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(None);
    let url = format!("{}/jogo/missing", server.uri());
    let result = retry_with_backoff(3, 1, || client.fetch_document(&url)).await;

    match result {
        Err(ScraperError::NotFound { url: u }) => assert_eq!(u, url),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn soft_404_body_is_treated_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jogo/ghost"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Página não encontrada</body></html>"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/jogo/ghost", server.uri());
    let err = client(None).fetch_document(&url).await.unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }));
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jogo/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jogo/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>late</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(None);
    let url = format!("{}/jogo/flaky", server.uri());
    let doc = retry_with_backoff(2, 1, || client.fetch_document(&url))
        .await
        .unwrap();
    assert_eq!(doc.html, "<html>late</html>");
}

#[tokio::test]
async fn rate_limit_carries_the_retry_after_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jogo/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let url = format!("{}/jogo/limited", server.uri());
    let err = client(None).fetch_document(&url).await.unwrap_err();
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 7),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn renderer_503_maps_to_renderer_busy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client(Some(format!("{}/content", server.uri())));
    let err = client
        .fetch_document("https://example.com/jogo/1")
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::RendererBusy { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn exhausted_budget_reports_total_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jogo/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(None);
    let url = format!("{}/jogo/down", server.uri());
    let err = retry_with_backoff(2, 1, || client.fetch_document(&url))
        .await
        .unwrap_err();
    match err {
        ScraperError::FetchExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                *source,
                ScraperError::UnexpectedStatus { status: 503, .. }
            ));
        }
        other => panic!("expected FetchExhausted, got {other:?}"),
    }
}
