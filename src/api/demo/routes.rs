// Start of file: /src/api/demo/routes.rs

// Routes exercising every path of the error handler

use axum::{routing::{get, post}, Router};
use crate::api::demo::handler::{
    cached_handler, config_handler, crash_handler, create_widget_handler, hello_handler,
    legacy_handler, slow_handler, widget_handler,
};
use crate::config::state::AppState;

// Build a Router with all demo endpoints
pub fn demo_routes() -> Router<AppState> {
    Router::new()
        .route("/hello", get(hello_handler))

        // Canonical 404 with an error code
        .route("/demo/widgets/{id}", get(widget_handler))

        // Body limit, malformed JSON and validation failures
        .route("/demo/widgets", post(create_widget_handler))

        // Redirect-class and empty-class statuses
        .route("/demo/legacy", get(legacy_handler))
        .route("/demo/cached", get(cached_handler))

        // Raw errors only plugins (or default 500) can resolve
        .route("/demo/config", get(config_handler))
        .route("/demo/crash", get(crash_handler))

        // Sleeps past the request timeout
        .route("/demo/slow", get(slow_handler))
}

// End of file: /src/api/demo/routes.rs
