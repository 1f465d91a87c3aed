// Start of file: /src/errors/plugins.rs

/*
    * The plugin chain: an ordered, append-only list of classifiers. The first
    * classifier that returns a canonical error wins; later ones never run.
*/

use std::{fmt, io, sync::Arc};

use serde_json::json;
use tracing::trace;

use crate::errors::error::HandlerError;
use crate::errors::raw::{ErrorCategory, RawError, RequestContext};
use crate::errors::taxonomy::{HttpError, HttpErrorKind, Taxonomy};

/// Names accepted by [`PluginChain::push_named`].
pub const BUILTIN_PLUGINS: [&str; 4] = ["timeout", "body_limit", "json", "io"];

/// Converts a raw error into a canonical one, or declines with `None`.
pub trait Plugin: Send + Sync {
    fn classify(
        &self,
        taxonomy: &Taxonomy,
        error: &RawError,
        request: &RequestContext,
    ) -> Option<HttpError>;
}

impl<F> Plugin for F
where
    F: Fn(&Taxonomy, &RawError, &RequestContext) -> Option<HttpError> + Send + Sync,
{
    fn classify(
        &self,
        taxonomy: &Taxonomy,
        error: &RawError,
        request: &RequestContext,
    ) -> Option<HttpError> {
        self(taxonomy, error, request)
    }
}

#[derive(Clone)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginChain {
    /// A chain holding only the pass-through classifier.
    pub fn new() -> Self {
        Self {
            plugins: vec![Arc::new(PassThrough)],
        }
    }

    pub fn push(&mut self, plugin: impl Plugin + 'static) {
        self.plugins.push(Arc::new(plugin));
    }

    /// Registers one of the [`BUILTIN_PLUGINS`] by name.
    pub fn push_named(&mut self, name: &str) -> Result<(), HandlerError> {
        let plugin: Arc<dyn Plugin> = match name.trim() {
            "" => {
                return Err(HandlerError::InvalidArgument(
                    "plugin name must be a non-empty string".to_owned(),
                ))
            }
            "timeout" => Arc::new(TimeoutPlugin),
            "body_limit" => Arc::new(BodyLimitPlugin),
            "json" => Arc::new(JsonPlugin),
            "io" => Arc::new(IoPlugin),
            unknown => {
                return Err(HandlerError::InvalidArgument(format!(
                    "plugin must be one of {}, got unknown name `{unknown}`",
                    BUILTIN_PLUGINS.join(", ")
                )))
            }
        };

        self.plugins.push(plugin);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn resolve(&self, error: &RawError, request: &RequestContext) -> Option<HttpError> {
        let taxonomy: Taxonomy = Taxonomy;

        self.plugins
            .iter()
            .enumerate()
            .find_map(|(index, plugin)| {
                let resolved: Option<HttpError> = plugin.classify(&taxonomy, error, request);
                if let Some(resolved) = &resolved {
                    trace!(index, status = resolved.status().as_u16(), "plugin resolved error");
                }
                resolved
            })
    }
}

impl Default for PluginChain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginChain")
            .field("len", &self.plugins.len())
            .finish()
    }
}

/// Errors that already are canonical are returned untouched.
struct PassThrough;

impl Plugin for PassThrough {
    fn classify(&self, _: &Taxonomy, error: &RawError, _: &RequestContext) -> Option<HttpError> {
        error.downcast_ref::<HttpError>().cloned()
    }
}

struct TimeoutPlugin;

impl Plugin for TimeoutPlugin {
    fn classify(&self, taxonomy: &Taxonomy, error: &RawError, _: &RequestContext) -> Option<HttpError> {
        (error.category() == ErrorCategory::Timeout)
            .then(|| taxonomy.create(HttpErrorKind::RequestTimeout, "Request timed out"))
    }
}

struct BodyLimitPlugin;

impl Plugin for BodyLimitPlugin {
    fn classify(&self, taxonomy: &Taxonomy, error: &RawError, _: &RequestContext) -> Option<HttpError> {
        (error.category() == ErrorCategory::BodyLimit)
            .then(|| taxonomy.create(HttpErrorKind::PayloadTooLarge, "Request body too large"))
    }
}

struct JsonPlugin;

impl Plugin for JsonPlugin {
    fn classify(&self, taxonomy: &Taxonomy, error: &RawError, _: &RequestContext) -> Option<HttpError> {
        let json_error: &serde_json::Error = error.find::<serde_json::Error>()?;

        Some(
            taxonomy
                .create(HttpErrorKind::BadRequest, format!("Malformed JSON: {json_error}"))
                .with_meta(json!({ "line": json_error.line(), "column": json_error.column() })),
        )
    }
}

struct IoPlugin;

impl Plugin for IoPlugin {
    fn classify(&self, taxonomy: &Taxonomy, error: &RawError, _: &RequestContext) -> Option<HttpError> {
        let io_error: &io::Error = error.find::<io::Error>()?;

        let kind: HttpErrorKind = match io_error.kind() {
            io::ErrorKind::NotFound => HttpErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => HttpErrorKind::Forbidden,
            io::ErrorKind::TimedOut => HttpErrorKind::GatewayTimeout,
            _ => HttpErrorKind::ServiceUnavailable,
        };

        Some(taxonomy.create(kind, io_error.to_string()))
    }
}


// End of file: /src/errors/plugins.rs
