// Start of file: src/main.rs

use axum::{serve, Router};
use tokio::net::TcpListener;

use error_envelope::config::state::AppState;
use error_envelope::core::{
    logging::init_tracing,
    server::{create_app, setup_listener, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let state: AppState = AppState::instance().clone();
    let listener: TcpListener = setup_listener(&state.environment).await?;
    let app: Router = create_app(state);

    tracing::info!("Server listening on: {}", listener.local_addr()?);

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// End of file: src/main.rs
