//! Integration tests for `NaverClient` using wiremock HTTP mocks.

use batnews_collect::{NaverClient, RecencyWindow};
use batnews_core::{reference_offset, Provider};
use chrono::{Duration, TimeZone};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NaverClient {
    NaverClient::with_base_url("test-id", "test-secret", 5, "batnews-test", base_url)
        .expect("client construction should not fail")
}

fn window() -> RecencyWindow {
    RecencyWindow {
        now: reference_offset()
            .with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
            .unwrap(),
        hours: 24,
    }
}

fn item(n: usize, hours_ago: i64) -> serde_json::Value {
    let published = window().now - Duration::hours(hours_ago);
    serde_json::json!({
        "title": format!("<b>배터리</b> 소식 {n}"),
        "originallink": format!("https://www.etnews.com/{n}?utm_source=naver"),
        "link": format!("https://n.news.naver.com/{n}"),
        "description": "양극재 &quot;수주&quot;",
        "pubDate": published.to_rfc2822(),
    })
}

fn page(range: std::ops::Range<usize>, hours_ago: i64) -> serde_json::Value {
    serde_json::json!({ "items": range.map(|n| item(n, hours_ago)).collect::<Vec<_>>() })
}

#[tokio::test]
async fn collect_sends_credentials_and_normalizes_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search/news.json"))
        .and(header("X-Naver-Client-Id", "test-id"))
        .and(header("X-Naver-Client-Secret", "test-secret"))
        .and(query_param("sort", "date"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..3, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let report = client.collect(&["배터리".to_string()], 10, window()).await;

    assert_eq!(report.items.len(), 3);
    let first = &report.items[0];
    assert_eq!(first.title, "배터리 소식 0");
    assert_eq!(first.link, "https://www.etnews.com/0");
    assert_eq!(first.description, "양극재 \"수주\"");
    assert_eq!(first.source, "etnews.com");
    assert_eq!(first.provider, Provider::Naver);
    assert_eq!(first.rank, 0);
}

#[tokio::test]
async fn collect_pages_until_stale_item_seen() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("start", "1"))
        .and(query_param("display", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..100, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let mut second = page(100..150, 2);
    second["items"]
        .as_array_mut()
        .unwrap()
        .extend((150..200).map(|n| item(n, 30)));
    Mock::given(method("GET"))
        .and(query_param("start", "101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(second))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("start", "201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(200..300, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let report = client.collect(&["배터리".to_string()], 500, window()).await;

    assert_eq!(report.items.len(), 150);
    assert_eq!(report.stale, 50);
}

#[tokio::test]
async fn collect_ranks_monotonically_and_dedupes_across_queries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query", "전고체"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..3, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("query", "분리막"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(2..5, 1)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let queries = vec!["전고체".to_string(), "분리막".to_string()];
    let report = client.collect(&queries, 50, window()).await;

    let ranks: Vec<u32> = report.items.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    assert_eq!(report.duplicates, 1);
}

#[tokio::test]
async fn collect_stops_at_max_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("display", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..5, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let queries = vec!["a".to_string(), "b".to_string()];
    let report = client.collect(&queries, 5, window()).await;
    assert_eq!(report.items.len(), 5);
}

#[tokio::test]
async fn server_error_yields_empty_report_not_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let queries = vec!["a".to_string(), "b".to_string()];
    let report = client.collect(&queries, 50, window()).await;
    assert!(report.items.is_empty());
    assert_eq!(report.failed_requests, 2);
}

#[tokio::test]
async fn malformed_json_is_counted_as_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_page("a", 1, 10).await.unwrap_err();
    assert!(matches!(err, batnews_collect::CollectError::Deserialize { .. }));

    let report = client.collect(&["a".to_string()], 50, window()).await;
    assert_eq!(report.failed_requests, 1);
}
