//! Router-level tests for the flaky ASR endpoint

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use flaky_asr_config::{FlakyAsrConfig, ServerConfig, SimulationConfig};
use flaky_asr_core::{AdmissionController, ScriptedRandom, TranscriptRecord, TranscriptStore};
use flaky_asr_server::{build_router, RequestHandler, Server};
use flaky_asr_web::REQUEST_ID_HEADER;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tower::ServiceExt;

fn store() -> TranscriptStore {
    TranscriptStore::from_records(vec![
        TranscriptRecord::new("ok-item", "the quick brown fox", false),
        TranscriptRecord::new("always-fail-item", "never served", true),
    ])
}

fn simulation(delay_ms: u64, failure_probability: f64, max_concurrent_requests: usize) -> SimulationConfig {
    SimulationConfig {
        base_delay: Duration::from_millis(delay_ms),
        delay_jitter: Duration::ZERO,
        failure_probability,
        max_concurrent_requests,
        seed: None,
    }
}

struct TestApp {
    router: Router,
    admission: Arc<AdmissionController>,
}

fn test_app(config: SimulationConfig) -> TestApp {
    test_app_with_server(config, &ServerConfig::default())
}

fn test_app_with_server(config: SimulationConfig, server: &ServerConfig) -> TestApp {
    let admission = Arc::new(AdmissionController::new(config.max_concurrent_requests));
    let handler = RequestHandler::with_random(&config, Arc::new(store()), Arc::new(ScriptedRandom::constant(0.5)));
    let router = build_router(handler, admission.clone(), server);
    TestApp { router, admission }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router.clone().oneshot(get(uri)).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn wait_for_in_flight(admission: &AdmissionController, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while admission.in_flight() != expected {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("in-flight count never reached expected value");
}

#[tokio::test]
async fn test_success_echoes_path_and_transcript() {
    let app = test_app(simulation(5, 0.0, 10));

    let (status, body) = send(&app.router, "/get-asr-output?path=ok-item").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "path": "ok-item", "transcript": "the quick brown fox" }));
    assert_eq!(app.admission.in_flight(), 0);
}

#[tokio::test]
async fn test_always_fail_item_returns_internal_error() {
    let app = test_app(simulation(1, 0.0, 10));

    for _ in 0..5 {
        let (status, body) = send(&app.router, "/get-asr-output?path=always-fail-item").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
    assert_eq!(app.admission.in_flight(), 0);
}

#[tokio::test]
async fn test_random_failure_returns_internal_error() {
    // Constant draw of 0.5 is below a 0.6 failure probability
    let app = test_app(simulation(1, 0.6, 10));

    let (status, body) = send(&app.router, "/get-asr-output?path=ok-item").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_missing_item_is_not_found_regardless_of_failure_settings() {
    let app = test_app(simulation(1, 1.0, 10));

    for _ in 0..5 {
        let (status, body) = send(&app.router, "/get-asr-output?path=missing-item").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "File not found" }));
    }
}

#[tokio::test]
async fn test_missing_path_parameter_is_not_found() {
    let app = test_app(simulation(1, 0.0, 10));

    let (status, body) = send(&app.router, "/get-asr-output").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "File not found" }));
    assert_eq!(app.admission.in_flight(), 0);
}

#[tokio::test]
async fn test_repeated_path_parameter_is_delayed_then_not_found() {
    let app = test_app(simulation(100, 1.0, 10));

    let started = Instant::now();
    let (status, body) = send(&app.router, "/get-asr-output?path=ok-item&path=ok-item").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "File not found" }));
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(app.admission.in_flight(), 0);
}

#[tokio::test]
async fn test_undecodable_path_is_not_found() {
    let app = test_app(simulation(1, 0.0, 10));

    let (status, body) = send(&app.router, "/get-asr-output?path=%FF").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "File not found" }));
}

#[tokio::test]
async fn test_serves_without_request_id_middleware() {
    let server = ServerConfig {
        enable_request_id: false,
        ..ServerConfig::default()
    };
    let app = test_app_with_server(simulation(1, 0.0, 10), &server);

    let response = app
        .router
        .clone()
        .oneshot(get("/get-asr-output?path=ok-item"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_saturated_service_rejects_immediately_then_recovers() {
    let app = test_app(simulation(500, 0.0, 1));

    // Request A occupies the only slot during its delay
    let router = app.router.clone();
    let first = tokio::spawn(async move { send(&router, "/get-asr-output?path=ok-item").await });
    wait_for_in_flight(&app.admission, 1).await;

    // Request B is turned away without waiting for any delay
    let started = Instant::now();
    let (status, body) = send(&app.router, "/get-asr-output?path=ok-item").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Too many requests" }));
    assert!(started.elapsed() < Duration::from_millis(250), "rejection took {:?}", started.elapsed());
    assert_eq!(app.admission.in_flight(), 1);

    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.admission.in_flight(), 0);

    // Request C is admitted normally
    let (status, _) = send(&app.router, "/get-asr-output?path=ok-item").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_client_abort_during_delay_releases_slot() {
    let app = test_app(simulation(60_000, 0.0, 1));

    let router = app.router.clone();
    let pending = tokio::spawn(async move { send(&router, "/get-asr-output?path=ok-item").await });
    wait_for_in_flight(&app.admission, 1).await;

    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    assert_eq!(app.admission.in_flight(), 0);
    assert!(app.admission.try_admit());
    assert!(app.admission.release());
}

#[tokio::test]
async fn test_released_slots_are_reusable_after_mixed_outcomes() {
    let app = test_app(simulation(50, 0.0, 3));
    let paths = ["ok-item", "always-fail-item", "missing-item"];

    for _ in 0..2 {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| {
                let router = app.router.clone();
                let uri = format!("/get-asr-output?path={}", path);
                tokio::spawn(async move { send(&router, &uri).await.0 })
            })
            .collect();

        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap());
        }

        assert_eq!(
            statuses,
            vec![StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR, StatusCode::NOT_FOUND]
        );
        assert_eq!(app.admission.in_flight(), 0);
    }

    let stats = app.admission.stats();
    assert_eq!(stats.admitted_total, 6);
    assert_eq!(stats.rejected_total, 0);
}

#[tokio::test]
async fn test_rejected_responses_carry_request_id() {
    let app = test_app(simulation(1, 0.0, 1));
    let held = app.admission.try_admit();
    assert!(held);

    let response = app
        .router
        .clone()
        .oneshot(get("/get-asr-output?path=ok-item"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert!(app.admission.release());
}

#[tokio::test]
async fn test_server_serves_over_tcp() {
    let config = FlakyAsrConfig {
        simulation: SimulationConfig {
            seed: Some(7),
            ..simulation(5, 0.0, 4)
        },
        ..Default::default()
    };
    let server = Server::with_store(config, store());
    let admission = server.admission();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve(listener));

    let response = reqwest::get(format!("http://{}/get-asr-output?path=ok-item", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["transcript"], "the quick brown fox");
    wait_for_in_flight(&admission, 0).await;
}

#[tokio::test]
async fn test_closing_tcp_connection_mid_delay_releases_slot() {
    let config = FlakyAsrConfig {
        simulation: simulation(60_000, 0.0, 1),
        ..Default::default()
    };
    let server = Server::with_store(config, store());
    let admission = server.admission();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve(listener));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /get-asr-output?path=ok-item HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    wait_for_in_flight(&admission, 1).await;

    drop(stream);

    wait_for_in_flight(&admission, 0).await;
    assert!(admission.try_admit());
    assert!(admission.release());
}
