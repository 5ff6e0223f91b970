//! HTTP fetcher tests against a local mock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazylist::{
    ElementId, FetchError, Filters, Footer, ListController, ListOptions, LoadOutcome, Node,
    ObserverHost, PageFetcher, PageRequest, RenderSurface, RenderedItem, ScrollMetrics, Watch,
    WatchOptions,
};
use lazylist_adapter::HttpFetcher;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(url: String, page: usize) -> PageRequest {
    PageRequest {
        page,
        limit: 10,
        filters: Filters::new(),
        url: Some(url),
    }
}

#[tokio::test]
async fn sends_json_get_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [{ "id": 11 }],
            "total": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().with_bearer("secret");
    let url = lazylist::default_url(
        &format!("{}/api/notifications", server.uri()),
        2,
        10,
        &Filters::new(),
    );
    let body = fetcher.fetch(request(url, 2)).await.unwrap();
    assert_eq!(body["total"], 11);
}

#[tokio::test]
async fn omits_authorization_without_a_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    HttpFetcher::new()
        .with_token_provider(|| None)
        .fetch(request(format!("{}/rows", server.uri()), 1))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn token_provider_is_consulted_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let issued = Arc::new(AtomicUsize::new(0));
    let fetcher = HttpFetcher::new().with_token_provider({
        let issued = Arc::clone(&issued);
        move || Some(format!("token-{}", issued.fetch_add(1, Ordering::SeqCst)))
    });
    for page in 1..=2 {
        fetcher
            .fetch(request(format!("{}/rows", server.uri()), page))
            .await
            .unwrap();
    }

    let received = server.received_requests().await.unwrap();
    let tokens: Vec<_> = received
        .iter()
        .map(|r| r.headers.get("authorization").unwrap().to_str().unwrap().to_owned())
        .collect();
    assert_eq!(tokens, vec!["Bearer token-0", "Bearer token-1"]);
}

#[tokio::test]
async fn non_success_status_carries_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })),
        )
        .mount(&server)
        .await;

    let err = HttpFetcher::new()
        .fetch(request(format!("{}/rows", server.uri()), 1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            status: 503,
            message: "maintenance".into(),
        }
    );
    assert_eq!(err.to_string(), "HTTP 503: maintenance");
}

#[tokio::test]
async fn malformed_body_is_an_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = HttpFetcher::new()
        .fetch(request(format!("{}/rows", server.uri()), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Unknown(_)), "{err:?}");
}

#[tokio::test]
async fn missing_url_fails_without_a_request() {
    let err = HttpFetcher::new()
        .fetch(PageRequest {
            page: 1,
            limit: 10,
            filters: Filters::new(),
            url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Unknown(_)));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let err = HttpFetcher::new()
        .fetch(request("http://127.0.0.1:1/rows".to_owned(), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
}

struct CountingSurface {
    items: Arc<AtomicUsize>,
    next_id: u64,
}

impl RenderSurface for CountingSurface {
    fn append_items(&mut self, items: Vec<RenderedItem>) -> Vec<ElementId> {
        self.items.fetch_add(items.len(), Ordering::SeqCst);
        items
            .iter()
            .map(|_| {
                self.next_id += 1;
                ElementId(self.next_id)
            })
            .collect()
    }

    fn clear(&mut self) {
        self.items.store(0, Ordering::SeqCst);
    }

    fn set_loading(&mut self, _indicator: Option<&Node>) {}

    fn set_footer(&mut self, footer: &Footer) -> Option<ElementId> {
        footer.is_sentinel().then(|| {
            self.next_id += 1;
            ElementId(self.next_id)
        })
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics::default()
    }

    fn set_scroll_top(&mut self, _top: u64) {}
}

struct NoopHost;

impl ObserverHost for NoopHost {
    fn observe(&mut self, _target: ElementId, _watch: Watch, _options: WatchOptions) {}
    fn unobserve(&mut self, _target: ElementId, _watch: Watch) {}
    fn disconnect(&mut self, _watch: Watch) {}
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
struct LogEntry {
    id: u32,
    level: String,
}

#[tokio::test]
async fn controller_pages_and_filters_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("page", "1"))
        .and(query_param("level", "error"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{ "id": 7, "level": "error" }],
            "pagination": { "total": 1 }
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{ "id": 1, "level": "info" }, { "id": 2, "level": "error" }],
            "pagination": { "total": 3 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{ "id": 3, "level": "warn" }],
            "pagination": { "total": 3 }
        })))
        .mount(&server)
        .await;

    let rendered = Arc::new(AtomicUsize::new(0));
    let surface = CountingSurface {
        items: Arc::clone(&rendered),
        next_id: 0,
    };
    let options = ListOptions::new(|entry: &LogEntry, _| {
        Node::element("li").text_child(entry.level.clone())
    })
    .with_page_size(2)
    .with_endpoint(format!("{}/api/logs", server.uri()));
    let list = ListController::new(options, HttpFetcher::new(), surface, NoopHost);

    assert_eq!(list.mount().await, LoadOutcome::Loaded { page: 1, count: 2 });
    assert_eq!(list.load_more().await, LoadOutcome::Loaded { page: 2, count: 1 });
    assert!(!list.state().has_more);
    assert_eq!(rendered.load(Ordering::SeqCst), 3);

    let outcome = list
        .apply_filters(Filters::new().with("level", "error"))
        .await;
    assert_eq!(outcome, LoadOutcome::Loaded { page: 1, count: 1 });
    assert_eq!(
        list.items(),
        vec![LogEntry {
            id: 7,
            level: "error".into()
        }]
    );
    assert_eq!(rendered.load(Ordering::SeqCst), 1);
}
