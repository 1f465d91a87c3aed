// Outer fault boundary for the HTTP middleware stack

use axum::{
    BoxError,
    Json,
    response::{IntoResponse, Response},
};
use std::error::Error;
use tracing::error;

use crate::errors::{
    DefaultFormatter, ErrorCategory, ErrorEnvelope, FormattedError, Formatter, HttpError,
    HttpErrorKind, Unhandled, dispatcher::EnvelopeMeta,
};

/// Maps errors that escaped the error handler (deferred errors, failing
/// integrations, layer errors) to a JSON envelope
pub async fn handle_global_error(err: BoxError) -> Response {
    // Look through errors the normalizer handed back untouched
    let category: ErrorCategory = match err.downcast_ref::<Unhandled>() {
        Some(unhandled) => unhandled.error().category(),
        None => ErrorCategory::of(&*err),
    };

    let http_error: HttpError = match category {
        // 413 if the body was too large
        ErrorCategory::BodyLimit => HttpError::new(HttpErrorKind::PayloadTooLarge, "Request body too large"),
        // 408 if the request took too long
        ErrorCategory::Timeout => HttpError::new(HttpErrorKind::RequestTimeout, "Request timed out"),
        // Otherwise, 500
        _ => {
            error!("Unhandled internal error: {err}");
            HttpError::internal_server_error("Unhandled internal error")
        }
    };

    let formatted: FormattedError = DefaultFormatter
        .format(&http_error, 0)
        .unwrap_or_else(|_| FormattedError::new(http_error.message(), http_error.name()));

    let envelope: ErrorEnvelope = ErrorEnvelope {
        error: formatted,
        meta: EnvelopeMeta { status: http_error.status().as_u16() },
    };

    (http_error.status(), Json(envelope)).into_response()
}

/// Helper function to find specific error type in error chain
pub fn find_cause<T: Error + 'static>(err: &dyn Error) -> Option<&T> {
    let mut source: Option<&dyn Error> = err.source();

    while let Some(s) = source {
        if let Some(typed) = s.downcast_ref::<T>() {
            return Some(typed);
        }
        source = s.source();
    }

    None
}
