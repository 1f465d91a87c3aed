//! tests/mod.rs
//! A shared test helper to spawn the demo app on an ephemeral port.

use std::collections::HashMap;

use axum::{serve, Router};
use error_envelope::config::{environment::EnvironmentVariables, state::AppState};
use error_envelope::core::server::create_app;
use tokio::net::TcpListener as TokioTcpListener;

/// Spawns the app on a random unused port and returns its base URL.
///
/// `vars` stand in for the process environment, so tests never race on
/// `std::env`.
pub fn spawn_app(vars: &[(&str, &str)]) -> String {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    // * Build state and router exactly like main() does.
    let env: EnvironmentVariables = EnvironmentVariables::from_lookup(|key| vars.get(key).cloned())
        .expect("Invalid test environment");
    let state: AppState = AppState::new(env).expect("Failed to build AppState");
    let app: Router = create_app(state);

    // * Bind an ephemeral port using std::net::TcpListener.
    let std_listener: std::net::TcpListener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    std_listener.set_nonblocking(true).unwrap();

    let tokio_listener: TokioTcpListener = TokioTcpListener::from_std(std_listener)
        .expect("Failed to convert to tokio listener");

    let addr: std::net::SocketAddr = tokio_listener.local_addr().unwrap();

    // * Spawn the server in a background task.
    tokio::spawn(async move {
        serve(tokio_listener, app)
            .await
            .expect("Server failed");
    });

    format!("http://{}", addr)
}
