// Start of file: /src/errors/mod.rs

/*
    * The error-normalization engine:
    * - taxonomy / raw: canonical errors and the opaque errors raised upstream
    * - plugins: first-match resolution of raw errors
    * - formatter / status / dispatcher: response shaping
    * - handler / layer: the factory and its tower binding
*/

pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod integrations;
pub mod layer;
pub mod plugins;
pub mod raw;
pub mod status;
pub mod taxonomy;

pub use dispatcher::{ErrorEnvelope, ResponseInstruction, ResponseSnapshot, FORMAT_FAILURE_MESSAGE};
pub use error::HandlerError;
pub use formatter::{DefaultFormatter, FormatError, FormattedError, Formatter, MAX_DEPTH};
pub use handler::{ErrorHandler, HandlerConfig};
pub use integrations::{Integration, TracingIntegration};
pub use layer::{NormalizeErrors, NormalizeErrorsLayer};
pub use plugins::{Plugin, PluginChain, BUILTIN_PLUGINS};
pub use raw::{ErrorCategory, RawError, RequestContext, Unhandled};
pub use taxonomy::{ErrorCode, HttpError, HttpErrorKind, Taxonomy, Underlying};

// End of file: /src/errors/mod.rs
