//! tests/error_responses/client_errors.rs
//! Canonical 4xx errors and the plugins that produce them.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

const QUIET: (&str, &str) = ("ERROR_STACK", "false");

#[tokio::test]
async fn returns_404_envelope_for_missing_widget() {
    let base_url: String = common::spawn_app(&[QUIET]);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/demo/widgets/42", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(
        json,
        json!({
            "error": {
                "message": "Widget 42 does not exist",
                "name": "NotFound",
                "code": "WIDGET_NOT_FOUND"
            },
            "meta": { "status": 404 }
        })
    );
}

#[tokio::test]
async fn returns_422_with_one_entry_per_invalid_property() {
    let base_url: String = common::spawn_app(&[QUIET]);

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/demo/widgets", base_url))
        .json(&json!({ "name": "  ", "quantity": 0 }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["message"], "Invalid widget");
    assert_eq!(json["meta"]["status"], 422);

    let errors: &Vec<Value> = json["error"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["name"], "BadRequest");
    assert_eq!(errors[0]["meta"], json!({ "property": "name", "value": "  " }));
    assert_eq!(errors[1]["meta"], json!({ "property": "quantity", "value": 0 }));
}

#[tokio::test]
async fn valid_widgets_are_created() {
    let base_url: String = common::spawn_app(&[QUIET]);

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/demo/widgets", base_url))
        .json(&json!({ "name": "sprocket", "quantity": 3 }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn returns_400_for_malformed_json_with_json_plugin() {
    let base_url: String = common::spawn_app(&[QUIET, ("ERROR_PLUGINS", "json")]);

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/demo/widgets", base_url))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["name"], "BadRequest");
    assert_eq!(json["error"]["meta"]["line"], 1);
    assert_eq!(json["meta"]["status"], 400);
}

#[tokio::test]
async fn returns_413_when_payload_exceeds_limit() {
    let base_url: String = common::spawn_app(&[
        QUIET,
        ("ERROR_PLUGINS", "body_limit"),
        ("MAX_REQUEST_BODY_SIZE", "1024"),
    ]);

    let oversized_payload: Vec<u8> = vec![b'X'; 4096];

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/demo/widgets", base_url))
        .body(oversized_payload)
        .send()
        .await
        .expect("Failed to send large request.");

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["name"], "PayloadTooLarge");
    assert_eq!(json["meta"]["status"], 413);
}
