// Start of file: /src/api/demo/handler.rs

// Demo endpoints; each one fails in a different way

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::errors::{HttpError, HttpErrorKind, RawError};

const DEMO_CONFIG_PATH: &str = "demo-config.missing.toml";

pub async fn hello_handler() -> Json<Value> {
    Json(json!({ "message": "Hello from Axum!" }))
}

#[instrument]
pub async fn widget_handler(Path(id): Path<u64>) -> Result<Json<Value>, RawError> {
    info!(id, "Looking up widget");

    Err(HttpError::not_found(format!("Widget {id} does not exist"))
        .with_code("WIDGET_NOT_FOUND")
        .into())
}

#[instrument(skip_all)]
pub async fn create_widget_handler(
    State(state): State<AppState>,
    body: Body,
) -> Result<(StatusCode, Json<Value>), RawError> {
    // Reading by hand so the length limit surfaces as an error
    let bytes: Bytes = to_bytes(body, state.environment.max_request_body_size).await?;
    let payload: Value = serde_json::from_slice(&bytes)?;

    let mut problems: Vec<HttpError> = Vec::new();

    match payload.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => {}
        _ => problems.push(HttpError::invalid_property(
            "name must be a non-empty string",
            "name",
            payload.get("name").cloned().unwrap_or(Value::Null),
        )),
    }

    match payload.get("quantity").and_then(Value::as_i64) {
        Some(quantity) if quantity > 0 => {}
        _ => problems.push(HttpError::invalid_property(
            "quantity must be a positive integer",
            "quantity",
            payload.get("quantity").cloned().unwrap_or(Value::Null),
        )),
    }

    if !problems.is_empty() {
        return Err(HttpError::unprocessable_entity("Invalid widget", problems).into());
    }

    Ok((StatusCode::CREATED, Json(payload)))
}

pub async fn legacy_handler() -> Result<Json<Value>, RawError> {
    Err(HttpError::redirect(HttpErrorKind::MovedPermanently, "/demo/widgets").into())
}

pub async fn cached_handler() -> Result<Json<Value>, RawError> {
    Err(HttpError::new(HttpErrorKind::NotModified, "Widget list unchanged").into())
}

pub async fn config_handler() -> Result<String, RawError> {
    Ok(tokio::fs::read_to_string(DEMO_CONFIG_PATH).await?)
}

pub async fn crash_handler() -> Result<Json<Value>, RawError> {
    Err(RawError::msg("unexpected state in widget cache"))
}

pub async fn slow_handler(State(state): State<AppState>) -> Json<Value> {
    let sleep_seconds: u64 = state.environment.default_timeout_seconds + 2;
    info!("Sleeping for {sleep_seconds} seconds, past the request timeout");

    tokio::time::sleep(std::time::Duration::from_secs(sleep_seconds)).await;

    Json(json!({ "message": "This should not be reached due to timeout" }))
}

// End of file: /src/api/demo/handler.rs
