//! tests/error_responses/stack.rs
//! Traces show up outside production only.

#[path = "../mod.rs"]
mod common;

use serde_json::Value;

async fn widget_error(base_url: String) -> Value {
    reqwest::Client::new()
        .get(format!("{}/demo/widgets/7", base_url))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn development_includes_the_stack() {
    let json: Value = widget_error(common::spawn_app(&[("ENVIRONMENT", "development")])).await;

    let stack: &str = json["error"]["stack"].as_str().unwrap();
    assert!(stack.starts_with("NotFound: Widget 7 does not exist"));
}

#[tokio::test]
async fn production_omits_the_stack() {
    let json: Value = widget_error(common::spawn_app(&[("ENVIRONMENT", "production")])).await;

    assert!(json["error"].get("stack").is_none());
    assert_eq!(json["error"]["name"], "NotFound");
}
