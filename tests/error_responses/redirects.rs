//! tests/error_responses/redirects.rs
//! Redirect-class and empty-class statuses carry no JSON body.

#[path = "../mod.rs"]
mod common;

use reqwest::{header::LOCATION, redirect::Policy, StatusCode};

#[tokio::test]
async fn redirect_errors_set_location() {
    let base_url: String = common::spawn_app(&[]);

    let client: reqwest::Client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    let resp: reqwest::Response = client
        .get(format!("{}/demo/legacy", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()[LOCATION], "/demo/widgets");
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn not_modified_has_an_empty_body() {
    let base_url: String = common::spawn_app(&[]);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/demo/cached", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert!(resp.text().await.unwrap().is_empty());
}
