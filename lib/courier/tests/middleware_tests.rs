//! Integration tests for custom layers and built-in logging.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use courier::middleware::{Layer, LogLevel};
use courier::{Error, HttpClient, Method, NetworkClient, Request, Response};
use tower::Service;
use tower::limit::ConcurrencyLimitLayer;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

/// Adds a header and records the order in which layers see the request.
#[derive(Clone)]
struct TagLayer {
    name: &'static str,
    journal: Arc<Mutex<Vec<&'static str>>>,
}

#[derive(Clone)]
struct Tag<S> {
    inner: S,
    name: &'static str,
    journal: Arc<Mutex<Vec<&'static str>>>,
}

impl<S> Layer<S> for TagLayer {
    type Service = Tag<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Tag {
            inner,
            name: self.name,
            journal: Arc::clone(&self.journal),
        }
    }
}

impl<S> Service<Request<Bytes>> for Tag<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = courier::Result<Response<Bytes>>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<courier::Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        self.journal.lock().expect("journal").push(self.name);
        request
            .headers_mut()
            .insert(format!("X-Layer-{}", self.name), "seen".to_string());

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(request).await })
    }
}

#[tokio::test]
async fn test_custom_layers_run_in_registration_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tagged"))
        .and(header("X-Layer-outer", "seen"))
        .and(header("X-Layer-inner", "seen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let journal = Arc::new(Mutex::new(Vec::new()));
    let client = NetworkClient::builder()
        .base_url(mock_server.uri())
        .debug(true)
        .layer(TagLayer {
            name: "outer",
            journal: Arc::clone(&journal),
        })
        .with(TagLayer {
            name: "inner",
            journal: Arc::clone(&journal),
        })
        .build()
        .expect("client");

    let body: serde_json::Value = client.get("/tagged").await.expect("response");

    assert_eq!(body["ok"], true);
    assert_eq!(*journal.lock().expect("journal"), vec!["outer", "inner"]);
}

#[tokio::test]
async fn test_layers_see_failing_responses_before_classification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let journal = Arc::new(Mutex::new(Vec::new()));
    let client = NetworkClient::builder()
        .base_url(mock_server.uri())
        .layer(TagLayer {
            name: "only",
            journal: Arc::clone(&journal),
        })
        .build()
        .expect("client");

    let err = client
        .get::<serde_json::Value>("/missing")
        .await
        .expect_err("404 must fail");

    assert!(err.is_unknown_api_error());
    assert_eq!(journal.lock().expect("journal").len(), 1);
}

#[tokio::test]
async fn test_logging_levels_do_not_alter_exchange() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logged"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"done\""))
        .expect(3)
        .mount(&mock_server)
        .await;

    for level in [LogLevel::None, LogLevel::Body, LogLevel::All] {
        let client = NetworkClient::builder()
            .base_url(mock_server.uri())
            .log_level(level)
            .build()
            .expect("client");

        let request = client
            .request(courier::Method::Post, "logged")
            .expect("request")
            .header("Authorization", "Bearer secret")
            .json(client.codec(), &serde_json::json!({"large": "x".repeat(20_000)}))
            .expect("json body")
            .build();
        let response = client.send(request).await.expect("response");

        assert_eq!(response.text(), "\"done\"");
    }
}

#[tokio::test]
async fn test_readiness_gated_layer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .and(header("X-Layer-tag", "seen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(5)
        .mount(&mock_server)
        .await;

    let journal = Arc::new(Mutex::new(Vec::new()));
    let client = NetworkClient::builder()
        .base_url(mock_server.uri())
        .debug(true)
        .layer(TagLayer {
            name: "tag",
            journal: Arc::clone(&journal),
        })
        .layer(ConcurrencyLimitLayer::new(1))
        .build()
        .expect("client");

    for _ in 0..2 {
        let body: serde_json::Value = client.get("/limited").await.expect("response");
        assert_eq!(body["ok"], true);
    }

    let request = client
        .request(Method::Get, "limited")
        .expect("request")
        .build();
    let response = client.engine().execute(request).await.expect("response");
    assert_eq!(response.status(), 200);

    let (first, second) = tokio::join!(
        client.get::<serde_json::Value>("/limited"),
        client.get::<serde_json::Value>("/limited"),
    );
    first.expect("first concurrent response");
    second.expect("second concurrent response");
    assert_eq!(journal.lock().expect("journal").len(), 5);
}
