//! tests/error_responses/server_errors.rs
//! Raw errors: resolved by plugins, deferred, or answered with a default 500.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

const QUIET: (&str, &str) = ("ERROR_STACK", "false");

#[tokio::test]
async fn io_plugin_maps_missing_files_to_404() {
    let base_url: String = common::spawn_app(&[QUIET, ("ERROR_PLUGINS", "io")]);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/demo/config", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["name"], "NotFound");
}

#[tokio::test]
async fn unresolved_errors_are_deferred_untouched() {
    let base_url: String = common::spawn_app(&[QUIET]);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/demo/crash", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    // the handler's own 500, without an envelope
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn default_500_wraps_unresolved_errors() {
    let base_url: String = common::spawn_app(&[QUIET, ("ERROR_DEFAULT_500", "true")]);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/demo/crash", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["name"], "InternalServerError");
    assert_eq!(json["error"]["message"], "unexpected state in widget cache");
    assert_eq!(json["error"]["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["meta"]["status"], 500);
}

#[tokio::test]
async fn returns_408_when_request_times_out() {
    let base_url: String = common::spawn_app(&[
        QUIET,
        ("ERROR_PLUGINS", "timeout"),
        ("DEFAULT_TIMEOUT_SECONDS", "1"),
    ]);

    let resp_result: Result<Result<reqwest::Response, reqwest::Error>, tokio::time::error::Elapsed> = timeout(
        Duration::from_secs(5),
        async {
            reqwest::Client::new()
                .get(format!("{}/demo/slow", base_url))
                .send()
                .await
        }
    )
    .await;

    assert!(resp_result.is_ok(), "Client timed out waiting for server.");

    let resp: reqwest::Response = resp_result.unwrap().expect("Request failed unexpectedly.");
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["name"], "RequestTimeout");
    assert_eq!(json["meta"]["status"], 408);
}

#[tokio::test]
async fn unresolved_timeouts_reach_the_global_handler() {
    let base_url: String = common::spawn_app(&[QUIET, ("DEFAULT_TIMEOUT_SECONDS", "1")]);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/demo/slow", base_url))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Request failed unexpectedly.");

    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["meta"]["status"], 408);
}
