// Start of file: /src/errors/dispatcher.rs

/*
    * Decides what the client gets for a resolved error: an empty body, a
    * redirect, or the JSON envelope. Integrations run here, after the shape
    * is fixed and before anything is written.
*/

use std::sync::Arc;

use axum::{
    http::{header::{CONTENT_TYPE, LOCATION}, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn, Level};

use crate::errors::error::HandlerError;
use crate::errors::formatter::{DefaultFormatter, FormattedError, Formatter};
use crate::errors::handler::HandlerConfig;
use crate::errors::raw::{RawError, RequestContext};
use crate::errors::status::StatusClass;
use crate::errors::taxonomy::HttpError;
use crate::utils::utils::to_two_space_indented_json;

pub const FORMAT_FAILURE_MESSAGE: &str = "Failed to parse an error object";

/// The JSON body sent for every non-empty, non-redirect error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: FormattedError,
    pub meta: EnvelopeMeta,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EnvelopeMeta {
    pub status: u16,
}

#[derive(Clone, Debug)]
pub enum ResponseInstruction {
    /// Nothing resolved the error; hand it back to the pipeline untouched.
    Defer(RawError),
    Empty {
        status: StatusCode,
    },
    Redirect {
        status: StatusCode,
        location: Option<HeaderValue>,
    },
    Json {
        status: StatusCode,
        body: ErrorEnvelope,
    },
}

/// Read-only copy of the response handed to integrations.
#[derive(Clone, Debug)]
pub struct ResponseSnapshot {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ResponseInstruction {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ResponseInstruction::Defer(_) => None,
            ResponseInstruction::Empty { status }
            | ResponseInstruction::Redirect { status, .. }
            | ResponseInstruction::Json { status, .. } => Some(*status),
        }
    }

    pub fn snapshot(&self) -> Option<ResponseSnapshot> {
        let status: StatusCode = self.status()?;
        let mut headers: HeaderMap = HeaderMap::new();
        let mut body: Option<Value> = None;

        match self {
            ResponseInstruction::Redirect {
                location: Some(location),
                ..
            } => {
                headers.insert(LOCATION, location.clone());
            }
            ResponseInstruction::Json { body: envelope, .. } => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                body = serde_json::to_value(envelope).ok();
            }
            _ => {}
        }

        Some(ResponseSnapshot {
            status,
            headers,
            body,
        })
    }
}

impl IntoResponse for ResponseInstruction {
    fn into_response(self) -> Response {
        match self {
            ResponseInstruction::Defer(error) => error.into_response(),
            ResponseInstruction::Empty { status } => status.into_response(),
            ResponseInstruction::Redirect { status, location } => {
                let mut response: Response = status.into_response();
                if let Some(location) = location {
                    response.headers_mut().insert(LOCATION, location);
                }
                response
            }
            ResponseInstruction::Json { status, body } => (status, Json(body)).into_response(),
        }
    }
}

/// Shapes the response for a resolution outcome and runs the integrations.
pub fn dispatch(
    resolution: Option<HttpError>,
    raw: &RawError,
    request: &RequestContext,
    config: &HandlerConfig,
) -> Result<ResponseInstruction, HandlerError> {
    let resolved: HttpError = match resolution {
        Some(resolved) => resolved,
        None if config.default_500 => internal_fallback(raw),
        None => {
            debug!(
                request_id = %request.id,
                category = ?raw.category(),
                "no plugin resolved the error, deferring"
            );
            return Ok(ResponseInstruction::Defer(raw.clone()));
        }
    };

    let (error, instruction) = shape(resolved, raw, config);

    if let Some(snapshot) = instruction.snapshot() {
        for (index, integration) in config.integrations.iter().enumerate() {
            integration
                .report(&error, request, &snapshot)
                .map_err(|source| HandlerError::Integration { index, source })?;
        }
    }

    Ok(instruction)
}

/// The 500 used when nothing resolved the error and `default_500` is set.
pub fn internal_fallback(raw: &RawError) -> HttpError {
    let underlying: HttpError = match raw.downcast_ref::<HttpError>() {
        Some(error) => error.clone(),
        None => HttpError::internal_server_error(raw.message()).with_name(raw.name()),
    };

    HttpError::internal_server_error(raw.message())
        .with_underlying(underlying)
        .with_cause(raw.shared())
}

fn shape(error: HttpError, raw: &RawError, config: &HandlerConfig) -> (HttpError, ResponseInstruction) {
    let status: StatusCode = error.status();

    match StatusClass::of(status) {
        StatusClass::Empty => (error, ResponseInstruction::Empty { status }),
        StatusClass::Redirect => {
            let location: Option<HeaderValue> = location_header(&error);
            (error, ResponseInstruction::Redirect { status, location })
        }
        StatusClass::Body => {
            let (error, mut formatted) = format_or_recover(error, config);

            // the trace always describes what was raised, not what it resolved to
            if config.stack {
                formatted.stack = Some(raw.stack());
            }

            let status: StatusCode = error.status();
            let body: ErrorEnvelope = ErrorEnvelope {
                error: formatted,
                meta: EnvelopeMeta {
                    status: status.as_u16(),
                },
            };
            log_envelope(&body);

            (error, ResponseInstruction::Json { status, body })
        }
    }
}

fn format_or_recover(error: HttpError, config: &HandlerConfig) -> (HttpError, FormattedError) {
    match config.formatter.format(&error, 0) {
        Ok(formatted) => (error, formatted),
        Err(failure) => {
            warn!(%failure, status = error.status().as_u16(), "formatter failed, substituting an internal error");

            let message: String = failure.to_string();
            let fallback: HttpError = HttpError::internal_server_error(FORMAT_FAILURE_MESSAGE)
                .with_underlying(HttpError::internal_server_error(message).with_name("FormatError"))
                .with_cause(Arc::new(failure));

            // the built-in formatter cannot overflow on a two-level error
            let formatted: FormattedError = DefaultFormatter
                .format(&fallback, 0)
                .unwrap_or_else(|_| FormattedError::new(fallback.message(), fallback.name()));

            (fallback, formatted)
        }
    }
}

fn location_header(error: &HttpError) -> Option<HeaderValue> {
    let url: &str = match error.redirect_url() {
        Some(url) => url,
        None => {
            warn!(status = error.status().as_u16(), "redirect error carries no redirect URL");
            return None;
        }
    };

    match HeaderValue::try_from(url) {
        Ok(location) => Some(location),
        Err(err) => {
            warn!(%err, url, "redirect URL is not a valid header value");
            None
        }
    }
}

fn log_envelope(body: &ErrorEnvelope) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    match to_two_space_indented_json(body) {
        Ok(spaced_json) => debug!("\nError response:\n{}", spaced_json),
        Err(err) => error!("Failed to format error response JSON: {:?}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::formatter::FormatError;
    use crate::errors::plugins::PluginChain;
    use crate::errors::taxonomy::{HttpErrorKind, Taxonomy};
    use axum::{
        body::to_bytes,
        http::{Method, Uri},
        BoxError,
    };
    use serde_json::json;
    use std::sync::Mutex;

    fn request() -> RequestContext {
        RequestContext::new(Method::POST, Uri::from_static("/things"))
    }

    fn quiet() -> HandlerConfig {
        HandlerConfig::default().stack(false)
    }

    fn nested(levels: usize) -> HttpError {
        (0..levels).fold(HttpError::bad_request("leaf"), |inner, _| {
            HttpError::bad_request("wrapper").with_underlying(inner)
        })
    }

    fn json_body(instruction: ResponseInstruction) -> (StatusCode, Value) {
        match instruction {
            ResponseInstruction::Json { status, body } => (status, serde_json::to_value(body).unwrap()),
            other => panic!("expected a JSON instruction, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_errors_are_deferred_by_default() {
        let raw: RawError = RawError::msg("not mine");
        let instruction: ResponseInstruction = dispatch(None, &raw, &request(), &quiet()).unwrap();

        match instruction {
            ResponseInstruction::Defer(deferred) => assert_eq!(deferred.message(), "not mine"),
            other => panic!("expected deferral, got {other:?}"),
        }
    }

    #[test]
    fn deferral_skips_integrations() {
        let config: HandlerConfig = quiet().integration(
            |_: &HttpError, _: &RequestContext, _: &ResponseSnapshot| -> Result<(), BoxError> {
                Err("should not run".into())
            },
        );
        assert!(dispatch(None, &RawError::msg("x"), &request(), &config).is_ok());
    }

    #[test]
    fn default_500_wraps_the_raw_error() {
        let raw: RawError = RawError::msg("database exploded");
        let config: HandlerConfig = quiet().default_500(true);

        let (status, body) = json_body(dispatch(None, &raw, &request(), &config).unwrap());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "error": {
                    "message": "database exploded",
                    "name": "InternalServerError",
                    "errors": [{ "message": "database exploded", "name": "Error" }]
                },
                "meta": { "status": 500 }
            })
        );
    }

    #[tokio::test]
    async fn empty_class_statuses_have_no_body() {
        let resolved: HttpError = HttpError::new(HttpErrorKind::NotModified, "unchanged");
        let raw: RawError = resolved.clone().into();

        let instruction: ResponseInstruction =
            dispatch(Some(resolved), &raw, &request(), &quiet()).unwrap();
        assert!(matches!(instruction, ResponseInstruction::Empty { status } if status == StatusCode::NOT_MODIFIED));

        let response: Response = instruction.into_response();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(to_bytes(response.into_body(), usize::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn redirect_class_statuses_set_location() {
        let resolved: HttpError = Taxonomy.redirect(HttpErrorKind::MovedPermanently, "https://example.com/new");
        let raw: RawError = resolved.clone().into();

        let response: Response = dispatch(Some(resolved), &raw, &request(), &quiet())
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "https://example.com/new");
        assert!(to_bytes(response.into_body(), usize::MAX).await.unwrap().is_empty());
    }

    #[test]
    fn validation_errors_surface_property_and_value() {
        let resolved: HttpError = HttpError::unprocessable_entity(
            "bad body",
            vec![HttpError::invalid_property("must be positive", "age", -3)],
        );
        let raw: RawError = RawError::msg("validation failed");

        let (status, body) = json_body(dispatch(Some(resolved), &raw, &request(), &quiet()).unwrap());
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["meta"]["status"], 422);
        assert_eq!(body["error"]["errors"][0]["meta"], json!({ "property": "age", "value": -3 }));
    }

    #[test]
    fn depth_overflow_falls_back_to_a_500() {
        let resolved: HttpError = nested(11);
        let raw: RawError = resolved.clone().into();

        let (status, body) = json_body(dispatch(Some(resolved), &raw, &request(), &quiet()).unwrap());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], FORMAT_FAILURE_MESSAGE);
        assert_eq!(body["error"]["errors"][0]["name"], "FormatError");
        assert_eq!(body["meta"]["status"], 500);
    }

    #[test]
    fn failing_custom_formatter_falls_back_to_the_default_one() {
        let config: HandlerConfig = quiet().formatter(|_: &HttpError, _: usize| -> Result<FormattedError, FormatError> {
            Err(FormatError::custom("template missing"))
        });
        let resolved: HttpError = HttpError::not_found("nope");
        let raw: RawError = resolved.clone().into();

        let (status, body) = json_body(dispatch(Some(resolved), &raw, &request(), &config).unwrap());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], FORMAT_FAILURE_MESSAGE);
        assert_eq!(body["error"]["errors"][0]["message"], "template missing");
    }

    #[test]
    fn custom_formatter_output_is_used_verbatim() {
        let config: HandlerConfig = quiet().formatter(|error: &HttpError, _: usize| -> Result<FormattedError, FormatError> {
            let mut formatted: FormattedError = FormattedError::new(error.message().to_uppercase(), "Custom");
            formatted.extra.insert("hint".into(), json!("try again"));
            Ok(formatted)
        });
        let resolved: HttpError = HttpError::bad_request("careful");
        let raw: RawError = resolved.clone().into();

        let (_, body) = json_body(dispatch(Some(resolved), &raw, &request(), &config).unwrap());
        assert_eq!(body["error"], json!({ "message": "CAREFUL", "name": "Custom", "hint": "try again" }));
    }

    #[test]
    fn stack_comes_from_the_raw_error() {
        let mut chain: PluginChain = PluginChain::new();
        chain.push(|taxonomy: &Taxonomy, error: &RawError, _: &RequestContext| {
            Some(taxonomy.create(HttpErrorKind::BadGateway, format!("upstream: {error}")))
        });
        let raw: RawError = RawError::msg("connection reset");
        let resolution: Option<HttpError> = chain.resolve(&raw, &request());

        let config: HandlerConfig = HandlerConfig::default().stack(true);
        let (_, body) = json_body(dispatch(resolution, &raw, &request(), &config).unwrap());
        let stack: &str = body["error"]["stack"].as_str().unwrap();
        assert!(stack.starts_with("Error: connection reset"));
    }

    #[test]
    fn integrations_run_in_order_with_a_snapshot() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&seen), Arc::clone(&seen));

        let config: HandlerConfig = quiet()
            .integration(move |error: &HttpError, _: &RequestContext, response: &ResponseSnapshot| -> Result<(), BoxError> {
                first.lock().unwrap().push(format!("first {} {}", error.name(), response.status.as_u16()));
                Ok(())
            })
            .integration(move |_: &HttpError, request: &RequestContext, response: &ResponseSnapshot| -> Result<(), BoxError> {
                let message: &Value = &response.body.as_ref().unwrap()["error"]["message"];
                second.lock().unwrap().push(format!("second {} {}", request.method, message));
                Ok(())
            });

        let resolved: HttpError = HttpError::new(HttpErrorKind::Conflict, "taken");
        let raw: RawError = resolved.clone().into();
        dispatch(Some(resolved), &raw, &request(), &config).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first Conflict 409".to_owned(), "second POST \"taken\"".to_owned()]
        );
    }

    #[test]
    fn integration_failures_propagate() {
        let config: HandlerConfig = quiet()
            .integration(|_: &HttpError, _: &RequestContext, _: &ResponseSnapshot| -> Result<(), BoxError> { Ok(()) })
            .integration(|_: &HttpError, _: &RequestContext, _: &ResponseSnapshot| -> Result<(), BoxError> {
                Err("telemetry down".into())
            });

        let resolved: HttpError = HttpError::not_found("gone");
        let raw: RawError = resolved.clone().into();
        let err: HandlerError = dispatch(Some(resolved), &raw, &request(), &config).unwrap_err();
        assert!(matches!(err, HandlerError::Integration { index: 1, .. }));
    }
}

// End of file: /src/errors/dispatcher.rs
