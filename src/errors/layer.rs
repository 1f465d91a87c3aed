// Start of file: /src/errors/layer.rs

/*
    * Tower binding for `ErrorHandler`. Picks up errors two ways:
    * - a `RawError` parked in the response extensions by a handler
    * - an error returned by the inner service itself (timeouts, ...)
*/

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
    BoxError,
};
use tower::{Layer, Service};

use crate::errors::dispatcher::ResponseInstruction;
use crate::errors::handler::ErrorHandler;
use crate::errors::raw::{RawError, RequestContext, Unhandled};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[derive(Clone, Debug)]
pub struct NormalizeErrorsLayer {
    handler: Arc<ErrorHandler>,
}

impl NormalizeErrorsLayer {
    pub fn new(handler: ErrorHandler) -> Self {
        Self::from_shared(Arc::new(handler))
    }

    pub fn from_shared(handler: Arc<ErrorHandler>) -> Self {
        Self { handler }
    }
}

impl<S> Layer<S> for NormalizeErrorsLayer {
    type Service = NormalizeErrors<S>;

    fn layer(&self, inner: S) -> Self::Service {
        NormalizeErrors {
            inner,
            handler: Arc::clone(&self.handler),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NormalizeErrors<S> {
    inner: S,
    handler: Arc<ErrorHandler>,
}

impl<S> Service<Request<Body>> for NormalizeErrors<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
{
    type Response = Response;
    type Error = BoxError;
    type Future = BoxFuture<Result<Response, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // Keep the instance that was driven to readiness
        let clone: S = self.inner.clone();
        let inner: S = std::mem::replace(&mut self.inner, clone);
        let handler: Arc<ErrorHandler> = Arc::clone(&self.handler);
        let context: RequestContext = RequestContext::from_request(&request);

        Box::pin(normalize(inner, request, handler, context))
    }
}

async fn normalize<S>(
    mut inner: S,
    request: Request<Body>,
    handler: Arc<ErrorHandler>,
    context: RequestContext,
) -> Result<Response, BoxError>
where
    S: Service<Request<Body>, Response = Response>,
    S::Error: Into<BoxError>,
{
    match inner.call(request).await {
        Ok(mut response) => {
            let Some(error) = response.extensions_mut().remove::<RawError>() else {
                return Ok(response);
            };

            let normalized: Response = handler.respond(error, &context, move |error| {
                // deferred: the pipeline gets its response back, error included
                response.extensions_mut().insert(error);
                response
            })?;
            Ok(normalized)
        }
        Err(err) => {
            let error: RawError = RawError::from_boxed(err.into());

            match handler.handle(error, &context)? {
                ResponseInstruction::Defer(error) => Err(Unhandled(error).into()),
                instruction => Ok(instruction.into_response()),
            }
        }
    }
}


// End of file: /src/errors/layer.rs
