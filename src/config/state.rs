// Application state management with singleton pattern

use std::sync::Arc;
use once_cell::sync::Lazy;
use crate::config::environment::EnvironmentVariables;
use crate::errors::handler::ErrorHandler;

// AppState singleton
#[derive(Debug, Clone)]
pub struct AppState {
    pub environment: Arc<EnvironmentVariables>,
    pub error_handler: Arc<ErrorHandler>,
}

impl AppState {
    /// Builds the state from already-loaded environment variables
    pub fn new(environment: EnvironmentVariables) -> anyhow::Result<Self> {
        let error_handler: ErrorHandler = ErrorHandler::from_env(&environment)?;

        tracing::info!(
            plugins = error_handler.plugins().len(),
            stack = error_handler.config().stack,
            default_500 = error_handler.config().default_500,
            "Error handler configured"
        );

        Ok(Self {
            environment: Arc::new(environment),
            error_handler: Arc::new(error_handler),
        })
    }

    /// Returns the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: Lazy<AppState> = Lazy::new(|| {
            AppState::new(EnvironmentVariables::instance().clone())
                .expect("Failed to initialize AppState")
        });
        &INSTANCE
    }
}
