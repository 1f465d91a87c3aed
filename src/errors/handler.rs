// Start of file: /src/errors/handler.rs

/*
    * The middleware factory: configuration + plugin chain + dispatcher,
    * wired into one `ErrorHandler`. Every `create` call builds an
    * independent chain.
*/

use std::{fmt, sync::Arc};

use axum::response::{IntoResponse, Response};

use crate::config::environment::{is_production, EnvironmentVariables};
use crate::errors::dispatcher::{self, ResponseInstruction};
use crate::errors::error::HandlerError;
use crate::errors::formatter::{DefaultFormatter, Formatter};
use crate::errors::integrations::{Integration, TracingIntegration};
use crate::errors::layer::NormalizeErrorsLayer;
use crate::errors::plugins::{Plugin, PluginChain};
use crate::errors::raw::{RawError, RequestContext};

/// Immutable once handed to [`ErrorHandler::create`].
#[derive(Clone)]
pub struct HandlerConfig {
    /// Attach the raw error's trace to JSON bodies.
    pub stack: bool,
    /// Answer unresolved errors with a 500 instead of deferring them.
    pub default_500: bool,
    pub formatter: Arc<dyn Formatter>,
    pub integrations: Vec<Arc<dyn Integration>>,
}

impl Default for HandlerConfig {
    /// Stacks are on unless `ENVIRONMENT=production`; read once, here.
    fn default() -> Self {
        Self {
            stack: !is_production(),
            default_500: false,
            formatter: Arc::new(DefaultFormatter),
            integrations: Vec::new(),
        }
    }
}

impl HandlerConfig {
    /// Config driven by the loaded environment, logging through `tracing`.
    pub fn from_env(env: &EnvironmentVariables) -> Self {
        Self {
            stack: env.error_stack.unwrap_or(!env.is_production()),
            default_500: env.error_default_500,
            ..Self::default()
        }
        .integration(TracingIntegration)
    }

    pub fn stack(mut self, stack: bool) -> Self {
        self.stack = stack;
        self
    }

    pub fn default_500(mut self, default_500: bool) -> Self {
        self.default_500 = default_500;
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn integration(mut self, integration: impl Integration + 'static) -> Self {
        self.integrations.push(Arc::new(integration));
        self
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("stack", &self.stack)
            .field("default_500", &self.default_500)
            .field("integrations", &self.integrations.len())
            .finish_non_exhaustive()
    }
}

/// Entry point of the error-normalization pipeline.
///
/// Register plugins during setup, then either call [`ErrorHandler::handle`]
/// directly or mount [`ErrorHandler::layer`] on a router.
#[derive(Clone, Debug)]
pub struct ErrorHandler {
    config: HandlerConfig,
    chain: PluginChain,
}

impl ErrorHandler {
    pub fn create(config: HandlerConfig) -> Self {
        Self {
            config,
            chain: PluginChain::new(),
        }
    }

    /// Builds a handler from the environment, registering `ERROR_PLUGINS`
    /// in the order they are listed.
    pub fn from_env(env: &EnvironmentVariables) -> Result<Self, HandlerError> {
        let mut handler: ErrorHandler = Self::create(HandlerConfig::from_env(env));

        for name in &env.error_plugins {
            handler.use_named(name)?;
        }

        Ok(handler)
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginChain {
        &self.chain
    }

    /// Appends a classifier to the chain.
    pub fn use_plugin(&mut self, plugin: impl Plugin + 'static) -> &mut Self {
        self.chain.push(plugin);
        self
    }

    /// Appends a built-in classifier by name.
    pub fn use_named(&mut self, name: &str) -> Result<&mut Self, HandlerError> {
        self.chain.push_named(name)?;
        Ok(self)
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.chain.push(plugin);
        self
    }

    /// Resolves `error` through the chain and decides the response.
    pub fn handle(
        &self,
        error: RawError,
        request: &RequestContext,
    ) -> Result<ResponseInstruction, HandlerError> {
        let resolution = self.chain.resolve(&error, request);
        dispatcher::dispatch(resolution, &error, request, &self.config)
    }

    /// Like [`ErrorHandler::handle`], but produces the final response.
    /// `next` receives the untouched raw error when nothing resolved it.
    pub fn respond<F>(
        &self,
        error: RawError,
        request: &RequestContext,
        next: F,
    ) -> Result<Response, HandlerError>
    where
        F: FnOnce(RawError) -> Response,
    {
        match self.handle(error, request)? {
            ResponseInstruction::Defer(error) => Ok(next(error)),
            instruction => Ok(instruction.into_response()),
        }
    }

    pub fn layer(self) -> NormalizeErrorsLayer {
        NormalizeErrorsLayer::new(self)
    }
}


// End of file: /src/errors/handler.rs
