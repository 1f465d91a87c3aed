// Start of file: /src/errors/taxonomy.rs

/*
    * The canonical HTTP error taxonomy: a closed set of status-coded error
    * kinds plus the `HttpError` value that carries them. Optional fields are
    * explicit `Option`s so formatters never have to probe for them.
*/

use std::{borrow::Cow, error::Error, fmt, sync::Arc};

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

macro_rules! http_error_kinds {
    ($($kind:ident => $status:ident),* $(,)?) => {
        /// Every status-coded error kind the taxonomy knows about.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum HttpErrorKind {
            $($kind,)*
        }

        impl HttpErrorKind {
            pub const ALL: &'static [HttpErrorKind] = &[$(HttpErrorKind::$kind,)*];

            pub fn status(self) -> StatusCode {
                match self {
                    $(HttpErrorKind::$kind => StatusCode::$status,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(HttpErrorKind::$kind => stringify!($kind),)*
                }
            }
        }
    };
}

http_error_kinds! {
    // Redirect class
    MultipleChoices => MULTIPLE_CHOICES,
    MovedPermanently => MOVED_PERMANENTLY,
    Found => FOUND,
    SeeOther => SEE_OTHER,
    NotModified => NOT_MODIFIED,
    UseProxy => USE_PROXY,
    TemporaryRedirect => TEMPORARY_REDIRECT,
    PermanentRedirect => PERMANENT_REDIRECT,
    // Empty class
    NoContent => NO_CONTENT,
    ResetContent => RESET_CONTENT,
    // Client errors
    BadRequest => BAD_REQUEST,
    Unauthorized => UNAUTHORIZED,
    PaymentRequired => PAYMENT_REQUIRED,
    Forbidden => FORBIDDEN,
    NotFound => NOT_FOUND,
    MethodNotAllowed => METHOD_NOT_ALLOWED,
    NotAcceptable => NOT_ACCEPTABLE,
    RequestTimeout => REQUEST_TIMEOUT,
    Conflict => CONFLICT,
    Gone => GONE,
    PreconditionFailed => PRECONDITION_FAILED,
    PayloadTooLarge => PAYLOAD_TOO_LARGE,
    UnsupportedMediaType => UNSUPPORTED_MEDIA_TYPE,
    UnprocessableEntity => UNPROCESSABLE_ENTITY,
    TooManyRequests => TOO_MANY_REQUESTS,
    // Server errors
    InternalServerError => INTERNAL_SERVER_ERROR,
    NotImplemented => NOT_IMPLEMENTED,
    BadGateway => BAD_GATEWAY,
    ServiceUnavailable => SERVICE_UNAVAILABLE,
    GatewayTimeout => GATEWAY_TIMEOUT,
}

impl HttpErrorKind {
    pub fn from_status(status: StatusCode) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.status() == status)
    }
}

/// Application-specific error code; either a string or a number on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_owned())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::Text(code)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        ErrorCode::Number(code)
    }
}

/// Nested cause(s) attached to a canonical error.
#[derive(Clone, Debug)]
pub enum Underlying {
    One(Box<HttpError>),
    Many(Vec<HttpError>),
}

impl From<HttpError> for Underlying {
    fn from(error: HttpError) -> Self {
        Underlying::One(Box::new(error))
    }
}

impl From<Vec<HttpError>> for Underlying {
    fn from(errors: Vec<HttpError>) -> Self {
        Underlying::Many(errors)
    }
}

/// A canonical HTTP error: a status-coded kind, a message and the optional
/// fields formatters know how to render.
#[derive(Clone, Debug)]
pub struct HttpError {
    kind: HttpErrorKind,
    name: Cow<'static, str>,
    message: String,
    code: Option<ErrorCode>,
    underlying: Option<Underlying>,
    meta: Option<Value>,
    property: Option<String>,
    value: Option<Value>,
    redirect_url: Option<String>,
    cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl HttpError {
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            name: Cow::Borrowed(kind.name()),
            message: message.into(),
            code: None,
            underlying: None,
            meta: None,
            property: None,
            value: None,
            redirect_url: None,
            cause: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::NotFound, message)
    }

    /// A 422 carrying the individual validation failures as underlying errors.
    pub fn unprocessable_entity(message: impl Into<String>, errors: Vec<HttpError>) -> Self {
        Self::new(HttpErrorKind::UnprocessableEntity, message).with_underlying(errors)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::InternalServerError, message)
    }

    /// A validation failure on a single property.
    pub fn invalid_property(
        message: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::bad_request(message).with_property(property, value)
    }

    pub fn redirect(kind: HttpErrorKind, url: impl Into<String>) -> Self {
        let url: String = url.into();
        let mut error: HttpError = Self::new(kind, format!("Redirecting to {url}"));
        error.redirect_url = Some(url);
        error
    }

    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_underlying(mut self, underlying: impl Into<Underlying>) -> Self {
        self.underlying = Some(underlying.into());
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_property(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.property = Some(property.into());
        self.value = Some(value.into());
        self
    }

    pub fn with_cause(mut self, cause: Arc<dyn Error + Send + Sync>) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    pub fn underlying(&self) -> Option<&Underlying> {
        self.underlying.as_ref()
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for HttpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

/// Constructor capability handed to plugins, so they can build canonical
/// errors without reaching for the taxonomy themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct Taxonomy;

impl Taxonomy {
    pub fn create(&self, kind: HttpErrorKind, message: impl Into<String>) -> HttpError {
        HttpError::new(kind, message)
    }

    pub fn from_status(&self, status: StatusCode, message: impl Into<String>) -> Option<HttpError> {
        HttpErrorKind::from_status(status).map(|kind| HttpError::new(kind, message))
    }

    pub fn redirect(&self, kind: HttpErrorKind, url: impl Into<String>) -> HttpError {
        HttpError::redirect(kind, url)
    }
}


// End of file: /src/errors/taxonomy.rs
