// Start of file: /src/errors/raw.rs

/*
    * Opaque upstream failures (`RawError`), the coarse type classifier used
    * for diagnostics, and the request context captured for plugins and
    * integrations.
*/

use std::{
    backtrace::{Backtrace, BacktraceStatus},
    error::Error,
    fmt, io,
    sync::Arc,
};

use axum::{
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    BoxError,
};
use chrono::{DateTime, Utc};
use http_body_util::LengthLimitError;
use tower::timeout::error::Elapsed;
use uuid::Uuid;

use crate::errors::taxonomy::HttpError;
use crate::utils::error_handler::find_cause;

/// Any failure raised upstream of the error handler.
///
/// Handlers return `Result<T, RawError>`; the `?` operator converts any
/// `std::error::Error` into one. Turning a `RawError` into a response stores
/// it in the response extensions, where `NormalizeErrors` picks it up.
#[derive(Clone)]
pub struct RawError {
    inner: Arc<dyn Error + Send + Sync>,
    backtrace: Arc<Backtrace>,
}

impl RawError {
    pub fn from_boxed(error: BoxError) -> Self {
        Self {
            inner: Arc::from(error),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }

    /// A raw error that is nothing more than a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::from(Message(message.to_string()))
    }

    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::of(self.as_error())
    }

    pub fn as_error(&self) -> &(dyn Error + 'static) {
        &*self.inner
    }

    pub fn shared(&self) -> Arc<dyn Error + Send + Sync> {
        Arc::clone(&self.inner)
    }

    pub fn downcast_ref<T: Error + 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Finds `T` either as the error itself or anywhere in its source chain.
    pub fn find<T: Error + 'static>(&self) -> Option<&T> {
        self.downcast_ref::<T>().or_else(|| find_cause::<T>(self.as_error()))
    }

    /// Label used for this error when it shows up in a rendered payload.
    pub fn name(&self) -> String {
        match self.downcast_ref::<HttpError>() {
            Some(error) => error.name().to_owned(),
            None => self.category().label().to_owned(),
        }
    }

    /// Trace representation: the error line, its cause chain, then the
    /// captured backtrace (only when `RUST_BACKTRACE` enabled capturing).
    pub fn stack(&self) -> String {
        let mut stack: String = format!("{}: {}", self.name(), self.inner);

        let mut source: Option<&dyn Error> = self.inner.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }

        if self.backtrace.status() == BacktraceStatus::Captured {
            stack.push('\n');
            stack.push_str(&self.backtrace.to_string());
        }

        stack
    }
}

impl<E> From<E> for RawError
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::from_boxed(Box::new(error))
    }
}

impl fmt::Debug for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawError")
            .field("category", &self.category())
            .field("error", &self.inner)
            .finish()
    }
}

impl fmt::Display for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl IntoResponse for RawError {
    fn into_response(self) -> Response {
        let mut response: Response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for Message {}

/// A raw error no plugin resolved, handed back to the surrounding pipeline.
#[derive(Clone, Debug)]
pub struct Unhandled(pub RawError);

impl Unhandled {
    pub fn error(&self) -> &RawError {
        &self.0
    }
}

impl fmt::Display for Unhandled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for Unhandled {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_error())
    }
}

/// Coarse category of an arbitrary failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Http,
    Timeout,
    BodyLimit,
    Json,
    Io,
    Other,
}

impl ErrorCategory {
    pub fn of(error: &(dyn Error + 'static)) -> Self {
        if error.is::<HttpError>() {
            ErrorCategory::Http
        } else if in_chain::<Elapsed>(error) {
            ErrorCategory::Timeout
        } else if in_chain::<LengthLimitError>(error) {
            ErrorCategory::BodyLimit
        } else if in_chain::<serde_json::Error>(error) {
            ErrorCategory::Json
        } else if in_chain::<io::Error>(error) {
            ErrorCategory::Io
        } else {
            ErrorCategory::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Http => "HttpError",
            ErrorCategory::Timeout => "TimeoutError",
            ErrorCategory::BodyLimit => "LengthLimitError",
            ErrorCategory::Json => "JsonError",
            ErrorCategory::Io => "IoError",
            ErrorCategory::Other => "Error",
        }
    }
}

fn in_chain<T: Error + 'static>(error: &(dyn Error + 'static)) -> bool {
    error.is::<T>() || find_cause::<T>(error).is_some()
}

/// What plugins and integrations get to see of the request.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub id: Uuid,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            uri,
            headers: HeaderMap::new(),
            received_at: Utc::now(),
        }
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            headers: request.headers().clone(),
            ..Self::new(request.method().clone(), request.uri().clone())
        }
    }
}


// End of file: /src/errors/raw.rs
