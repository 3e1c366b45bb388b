//! Exercises the HTTP surface without binding a socket

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::host_with;
use http_body_util::BodyExt;
use lexiflow::api::build_router;
use lexiflow::fetch::InMemoryFetcher;
use lexiflow::workflow::InMemoryHistoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router_with_text(text: &str) -> axum::Router {
    let fetcher = Arc::new(InMemoryFetcher::new().with_document("mem://a", text));
    build_router(host_with(fetcher, 5, Arc::new(InMemoryHistoryStore::new())))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn start_request(name: &str, books: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/orchestrators/{name}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "books": books }).to_string()))
        .unwrap()
}

fn status_request(id: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/runs/{id}"))
        .body(Body::empty())
        .unwrap()
}

/// Poll the status endpoint until the run is terminal.
async fn poll_terminal(app: &axum::Router, id: &str) -> Value {
    for _ in 0..500 {
        let response = app.clone().oneshot(status_request(id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let status = body_json(response).await;
        let stage = status["runtime_status"].as_str().unwrap().to_string();
        if stage == "COMPLETE" || stage == "FAILED" {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run {id} did not reach a terminal stage");
}

#[tokio::test]
async fn unknown_orchestration_name_is_not_found() {
    let app = router_with_text("irrelevant");
    let response = app
        .oneshot(start_request("sentiment", json!({"a": "mem://a"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_run_id_is_not_found() {
    let app = router_with_text("irrelevant");
    let response = app
        .oneshot(status_request("00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_returns_a_status_handle() {
    let app = router_with_text("fox jumps");
    let response = app
        .oneshot(start_request("word-frequency", json!({"a": "mem://a"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let handle = body_json(response).await;
    let id = handle["id"].as_str().unwrap();
    assert_eq!(
        handle["status_query_get_uri"].as_str().unwrap(),
        format!("/runs/{id}")
    );
}

#[tokio::test]
async fn completed_run_reports_the_frequency_table() {
    let app = router_with_text("The quick brown fox jumps over the lazy dog fox fox");
    let response = app
        .clone()
        .oneshot(start_request("word-frequency", json!({"a": "mem://a"})))
        .await
        .unwrap();
    let handle = body_json(response).await;
    let id = handle["id"].as_str().unwrap().to_string();

    let status = poll_terminal(&app, &id).await;
    assert_eq!(status["runtime_status"], "COMPLETE");
    assert_eq!(status["work_items"], 3);
    assert_eq!(status["output"]["fox"]["count"], 3);
    assert!(status.get("failure").is_none());
}

#[tokio::test]
async fn failed_run_reports_stage_and_cause() {
    let app = router_with_text("irrelevant");
    let response = app
        .clone()
        .oneshot(start_request(
            "word-frequency",
            json!({"missing": "mem://missing"}),
        ))
        .await
        .unwrap();
    let handle = body_json(response).await;
    let id = handle["id"].as_str().unwrap().to_string();

    let status = poll_terminal(&app, &id).await;
    assert_eq!(status["runtime_status"], "FAILED");
    assert!(status.get("output").is_none());
    assert_eq!(status["failure"]["stage"], "GATHERING");
    assert_eq!(status["failure"]["error"]["kind"], "fetch_failed");
    assert_eq!(status["failure"]["error"]["document"], "missing");
}
