// Start of file: /src/errors/formatter.rs

/*
    * Turns a canonical error (and everything nested under it) into the
    * plain, depth-bounded object that ends up in the JSON envelope.
*/

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::taxonomy::{ErrorCode, HttpError, Underlying};

/// Deepest nesting level the default formatter will render.
pub const MAX_DEPTH: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormattedError {
    pub message: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FormattedError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Extra top-level fields a custom formatter wants to expose.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormattedError {
    pub fn new(message: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("error nesting depth {depth} exceeds the limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },
    #[error("{message}")]
    Custom { message: String },
}

impl FormatError {
    pub fn custom(message: impl Into<String>) -> Self {
        FormatError::Custom {
            message: message.into(),
        }
    }
}

/// Renders one canonical error at a given nesting depth.
///
/// Replacement formatters are expected to bound their own recursion; the
/// dispatcher does not enforce [`MAX_DEPTH`] on them.
pub trait Formatter: Send + Sync {
    fn format(&self, error: &HttpError, depth: usize) -> Result<FormattedError, FormatError>;
}

impl<F> Formatter for F
where
    F: Fn(&HttpError, usize) -> Result<FormattedError, FormatError> + Send + Sync,
{
    fn format(&self, error: &HttpError, depth: usize) -> Result<FormattedError, FormatError> {
        self(error, depth)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFormatter;

impl DefaultFormatter {
    /// Formats every element at the same depth.
    pub fn format_many(
        &self,
        errors: &[HttpError],
        depth: usize,
    ) -> Result<Vec<FormattedError>, FormatError> {
        errors.iter().map(|error| self.format(error, depth)).collect()
    }

    fn format_underlying(
        &self,
        underlying: &Underlying,
        depth: usize,
    ) -> Result<Vec<FormattedError>, FormatError> {
        match underlying {
            Underlying::One(error) => Ok(vec![self.format(error, depth)?]),
            Underlying::Many(errors) => self.format_many(errors, depth),
        }
    }
}

impl Formatter for DefaultFormatter {
    fn format(&self, error: &HttpError, depth: usize) -> Result<FormattedError, FormatError> {
        if depth > MAX_DEPTH {
            return Err(FormatError::DepthExceeded {
                depth,
                limit: MAX_DEPTH,
            });
        }

        let mut formatted: FormattedError = FormattedError::new(error.message(), error.name());
        formatted.code = error.code().cloned();

        if let Some(underlying) = error.underlying() {
            formatted.errors = Some(self.format_underlying(underlying, depth + 1)?);
        }

        formatted.meta = error.meta().cloned();

        // property/value always win over an explicit meta
        if error.property().is_some() || error.value().is_some() {
            let mut meta: Map<String, Value> = Map::new();
            if let Some(property) = error.property() {
                meta.insert("property".into(), Value::String(property.to_owned()));
            }
            if let Some(value) = error.value() {
                meta.insert("value".into(), value.clone());
            }
            formatted.meta = Some(Value::Object(meta));
        }

        Ok(formatted)
    }
}


// End of file: /src/errors/formatter.rs
