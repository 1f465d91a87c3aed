// Library root for the error-envelope middleware and its demo server

pub mod api;
pub mod config;
pub mod core;
pub mod errors;
pub mod utils;

pub use crate::config::environment::EnvironmentVariables;
pub use crate::config::state::AppState;
pub use crate::errors::{
    ErrorHandler, HandlerConfig, HandlerError, HttpError, HttpErrorKind, NormalizeErrorsLayer,
    RawError, Taxonomy,
};
