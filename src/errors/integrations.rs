// Start of file: /src/errors/integrations.rs

// * Side-effect callbacks run once the response shape is decided.

use axum::BoxError;
use tracing::{error, warn};

use crate::errors::dispatcher::ResponseSnapshot;
use crate::errors::raw::RequestContext;
use crate::errors::taxonomy::HttpError;

/// Observes a normalized error (logging, telemetry, ...).
///
/// Runs before the response is written; an `Err` aborts the response and
/// propagates to the caller's fault boundary.
pub trait Integration: Send + Sync {
    fn report(
        &self,
        error: &HttpError,
        request: &RequestContext,
        response: &ResponseSnapshot,
    ) -> Result<(), BoxError>;
}

impl<F> Integration for F
where
    F: Fn(&HttpError, &RequestContext, &ResponseSnapshot) -> Result<(), BoxError> + Send + Sync,
{
    fn report(
        &self,
        error: &HttpError,
        request: &RequestContext,
        response: &ResponseSnapshot,
    ) -> Result<(), BoxError> {
        self(error, request, response)
    }
}

/// Emits one structured event per normalized error.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingIntegration;

impl Integration for TracingIntegration {
    fn report(
        &self,
        error: &HttpError,
        request: &RequestContext,
        response: &ResponseSnapshot,
    ) -> Result<(), BoxError> {
        let status: u16 = response.status.as_u16();

        if response.status.is_server_error() {
            error!(
                request_id = %request.id,
                method = %request.method,
                uri = %request.uri,
                status,
                name = error.name(),
                "{}",
                error.message()
            );
        } else {
            warn!(
                request_id = %request.id,
                method = %request.method,
                uri = %request.uri,
                status,
                name = error.name(),
                "{}",
                error.message()
            );
        }

        Ok(())
    }
}

// End of file: /src/errors/integrations.rs
