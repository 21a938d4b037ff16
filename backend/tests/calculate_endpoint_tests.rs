//! End-to-end tests for the `/calculate` and `/health` endpoints, driven
//! through the axum router with in-process publishers.

#![cfg(feature = "http-server")]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use calc_service::evaluator::{ArithmeticEvaluator, EvalError, EvalResult, Evaluator};
use calc_service::http::dto::HealthResponse;
use calc_service::http::{create_router, AppState};
use calc_service::models::LogEvent;
use calc_service::publisher::{EventDispatcher, EventPublisher, MemoryPublisher, PublishResult};
use calc_service::services::ServerIdentity;

struct Harness {
    router: Router,
    publisher: Arc<MemoryPublisher>,
    dispatcher: EventDispatcher,
}

impl Harness {
    fn new() -> Self {
        Self::with_evaluator(Arc::new(ArithmeticEvaluator::new()))
    }

    fn with_evaluator(evaluator: Arc<dyn Evaluator>) -> Self {
        Self::build(evaluator, usize::MAX)
    }

    fn build(evaluator: Arc<dyn Evaluator>, max_body_bytes: usize) -> Self {
        let publisher = Arc::new(MemoryPublisher::new());
        let dispatcher = EventDispatcher::new(publisher.clone());
        let state = AppState::new(evaluator, dispatcher.clone())
            .with_identity(Arc::new(ServerIdentity::with_server_id("test-server")))
            .with_max_body_bytes(max_body_bytes);

        Self {
            router: create_router(state),
            publisher,
            dispatcher,
        }
    }

    async fn send(&self, method: Method, body: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder()
            .method(method)
            .uri("/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes)
    }

    async fn post(&self, body: &str) -> (StatusCode, serde_json::Value) {
        let (status, headers, bytes) = self.send(Method::POST, body).await;
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn events(&self) -> Vec<LogEvent> {
        self.dispatcher.wait_idle().await;
        self.publisher.events()
    }
}

fn fixed(value: f64) -> Arc<dyn Evaluator> {
    Arc::new(move |_: &str| -> EvalResult<f64> { Ok(value) })
}

#[tokio::test]
async fn test_valid_expression() {
    let harness = Harness::new();
    let (status, body) = harness
        .post(r#"{"problem":"6/2","id":"1234","username":"user1"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["error"], "");
    assert_eq!(body["answer"].as_f64(), Some(3.0));
    assert_eq!(body["id"], "1234");

    let events = harness.events().await;
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.username, "user1");
    assert_eq!(event.problem, "6/2");
    assert_eq!(event.id, "1234");
    assert_eq!(event.server, "test-server");
    assert_eq!(event.request_num, 1);
    assert!(event.success);
    assert_eq!(event.answer, 3.0);
    assert_eq!(event.http_return_code, 200);
    assert!(event.duration_ms >= 0);
}

#[tokio::test]
async fn test_valid_expression_response_bytes() {
    let harness = Harness::new();
    let (status, _, bytes) = harness
        .send(
            Method::POST,
            r#"{"problem":"6/2","id":"1234","username":"user1"}"#,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"success":true,"error":"","answer":3,"id":"1234"}"#
    );

    harness.dispatcher.wait_idle().await;
    assert_eq!(harness.publisher.payloads()[0]["answer"], serde_json::json!(3));
}

#[tokio::test]
async fn test_division_by_zero_response_bytes() {
    let harness = Harness::new();
    let (status, headers, bytes) = harness
        .send(Method::POST, r#"{"problem":"1/0","id":"x"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"success":false,"error":"+infinity","answer":0,"id":"x"}"#
    );

    let events = harness.events().await;
    assert_eq!(events[0].error, "+infinity");
    assert_eq!(events[0].http_return_code, 200);
    assert!(!events[0].success);
}

#[tokio::test]
async fn test_non_finite_results_are_classified() {
    let cases = [
        (f64::INFINITY, "+infinity"),
        (f64::NEG_INFINITY, "-infinity"),
        (f64::NAN, "NaN"),
    ];

    for (value, expected) in cases {
        let harness = Harness::with_evaluator(fixed(value));
        let (status, body) = harness.post(r#"{"problem":"anything","id":"c"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], expected);
        assert_eq!(body["answer"].as_f64(), Some(0.0));
        assert_eq!(body["id"], "c");
    }
}

#[tokio::test]
async fn test_evaluator_error_is_reported() {
    let harness = Harness::with_evaluator(Arc::new(|_: &str| -> EvalResult<f64> {
        Err(EvalError::Custom("division by banana".to_string()))
    }));
    let (status, body) = harness.post(r#"{"problem":"1/banana","id":"e"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "division by banana");
    assert_eq!(body["answer"].as_f64(), Some(0.0));

    let events = harness.events().await;
    assert_eq!(events[0].error, "division by banana");
    assert_eq!(events[0].http_return_code, 200);
}

#[tokio::test]
async fn test_syntax_error_from_default_evaluator() {
    let harness = Harness::new();
    let (status, body) = harness.post(r#"{"problem":"2 +","id":"s"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_is_rejected_without_reading_body() {
    let harness = Harness::with_evaluator(Arc::new(|_: &str| -> EvalResult<f64> {
        panic!("evaluator must not run for rejected methods")
    }));
    let (status, headers, bytes) = harness.send(Method::GET, "not json").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers[header::ALLOW], "POST");
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(&bytes[..], b"Invalid request method\n");

    let events = harness.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].error, "Invalid request method");
    assert_eq!(events[0].http_return_code, 405);
    assert_eq!(events[0].problem, "");
}

#[tokio::test]
async fn test_head_is_rejected_and_logged_once() {
    let harness = Harness::new();
    let (status, _, bytes) = harness.send(Method::HEAD, "").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(bytes.is_empty());

    let events = harness.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].http_return_code, 405);
}

#[tokio::test]
async fn test_malformed_bodies_are_rejected() {
    let harness = Harness::new();

    for body in ["not json", "", "[1, 2]", r#"{"problem": 5}"#] {
        let (status, _, bytes) = harness.send(Method::POST, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(&bytes[..], b"Invalid request body\n");
    }

    let events = harness.events().await;
    assert_eq!(events.len(), 4);
    assert!(events
        .iter()
        .all(|e| e.http_return_code == 400 && e.error == "Invalid request body"));
}

#[tokio::test]
async fn test_null_body_is_an_empty_request() {
    let harness = Harness::new();
    let (status, body) = harness.post("null").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "empty expression");
    assert_eq!(body["id"], "");

    let events = harness.events().await;
    assert_eq!(events[0].http_return_code, 200);
    assert_eq!(events[0].error, "empty expression");
}

#[tokio::test]
async fn test_field_names_match_any_case() {
    let harness = Harness::new();
    let (status, body) = harness
        .post(r#"{"Problem":"6/2","ID":"1","USERNAME":"ada"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["answer"], 3);
    assert_eq!(body["id"], "1");

    let events = harness.events().await;
    assert_eq!(events[0].username, "ada");
    assert_eq!(events[0].problem, "6/2");
}

#[tokio::test]
async fn test_data_after_first_value_is_ignored() {
    let harness = Harness::new();
    let (status, body) = harness.post(r#"{"problem":"6/2","id":"1"}{}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], 3);
    assert_eq!(body["id"], "1");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let harness = Harness::build(Arc::new(ArithmeticEvaluator::new()), 16);
    let (status, _, _) = harness
        .send(Method::POST, r#"{"problem":"1+1+1+1+1+1+1","id":"big"}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let events = harness.events().await;
    assert_eq!(events[0].http_return_code, 400);
}

#[tokio::test]
async fn test_missing_fields_decode_as_empty() {
    let harness = Harness::new();
    let (status, body) = harness.post(r#"{"problem":"2^10"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"].as_f64(), Some(1024.0));
    assert_eq!(body["id"], "");
}

#[tokio::test]
async fn test_dropped_response_is_logged_as_write_failure() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/calculate")
        .body(Body::from(r#"{"problem":"1+1","id":"gone"}"#))
        .unwrap();

    let response = harness.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    drop(response);

    let events = harness.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "gone");
    assert_eq!(events[0].http_return_code, 500);
    assert!(!events[0].success);
    assert_eq!(events[0].answer, 0.0);
    assert!(events[0].error.starts_with("Error writing response: "));
}

#[tokio::test]
async fn test_publish_failure_does_not_affect_response() {
    let harness = Harness::new();
    harness.publisher.fail_with("broker unreachable");

    let (status, body) = harness.post(r#"{"problem":"2*21","id":"p"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"].as_f64(), Some(42.0));

    harness.dispatcher.wait_idle().await;
    assert!(harness.publisher.is_empty());
    assert_eq!(harness.dispatcher.stats().failed, 1);
}

struct StalledPublisher;

#[async_trait]
impl EventPublisher for StalledPublisher {
    fn kind(&self) -> &'static str {
        "stalled"
    }

    async fn publish(&self, _event: &LogEvent) -> PublishResult<()> {
        std::future::pending().await
    }

    async fn close(&self) -> PublishResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_stalled_publisher_does_not_delay_response() {
    let dispatcher = EventDispatcher::new(Arc::new(StalledPublisher));
    let state = AppState::new(Arc::new(ArithmeticEvaluator::new()), dispatcher.clone());
    let router = create_router(state);

    let exchange = async {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/calculate")
            .body(Body::from(r#"{"problem":"6/2","id":"slow"}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    };

    let (status, bytes) = tokio::time::timeout(Duration::from_secs(2), exchange)
        .await
        .expect("response waited on the publisher");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"success":true,"error":"","answer":3,"id":"slow"}"#
    );

    let stats = dispatcher.stats();
    assert_eq!(stats.published + stats.failed, 0);
}

#[tokio::test]
async fn test_disabled_publisher_still_serves() {
    let dispatcher = EventDispatcher::disabled();
    let state = AppState::new(Arc::new(ArithmeticEvaluator::new()), dispatcher.clone());
    let router = create_router(state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/calculate")
        .body(Body::from(r#"{"problem":"7-2","id":"d"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["answer"].as_f64(), Some(5.0));

    dispatcher.wait_idle().await;
    assert_eq!(dispatcher.stats().dropped, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_distinct_consecutive_numbers() {
    let harness = Arc::new(Harness::new());
    let total = 50u64;

    let mut handles = Vec::new();
    for i in 0..total {
        let harness = Arc::clone(&harness);
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"problem":"{}+1","id":"{}"}}"#, i, i);
            let (status, _) = harness.post(&body).await;
            assert_eq!(status, StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let events = harness.events().await;
    assert_eq!(events.len() as u64, total);

    let mut nums: Vec<u64> = events.iter().map(|e| e.request_num).collect();
    nums.sort_unstable();
    assert_eq!(nums, (1..=total).collect::<Vec<_>>());
    assert!(events.iter().all(|e| e.http_return_code == 200));
}

#[tokio::test]
async fn test_published_payload_field_names() {
    let harness = Harness::new();
    harness.post(r#"{"problem":"1+2","id":"j","username":"u"}"#).await;
    harness.dispatcher.wait_idle().await;

    let payload = &harness.publisher.payloads()[0];
    for field in [
        "username",
        "problem",
        "id",
        "server",
        "request_num",
        "start_time",
        "start_time_ms",
        "duration_ms",
        "success",
        "error",
        "answer",
        "http_return_code",
    ] {
        assert!(payload.get(field).is_some(), "missing {}", field);
    }
    assert_eq!(payload["http_return_code"], 200);
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = Harness::new();
    harness.post(r#"{"problem":"1","id":"h"}"#).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = harness.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.server, "test-server");
    assert_eq!(health.requests, 1);
    assert_eq!(health.publisher, "memory");

    // Health checks are not calculation requests.
    assert_eq!(harness.events().await.len(), 1);
}
