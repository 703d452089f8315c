use std::time::Duration;

use pagemate_engine::{FetchSettings, HttpPageFetcher, PageFetcher, TransportKind};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_page_bytes_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(FetchSettings::default());
    let url = format!("{}/doc", server.uri());

    let page = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(page.bytes, b"<html>ok</html>");
    assert_eq!(page.final_url, url);
    assert_eq!(page.redirect_count, 0);
    assert!(page.content_type.unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, TransportKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_rejects_invalid_urls() {
    let fetcher = HttpPageFetcher::new(FetchSettings::default());
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert_eq!(err.kind, TransportKind::InvalidUrl);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = HttpPageFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, TransportKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = HttpPageFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        TransportKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_rejects_unexpected_content_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"a\":1}", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(FetchSettings::default());
    let url = format!("{}/feed", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        TransportKind::UnsupportedContentType {
            content_type: "application/json".to_string(),
        }
    );
}
