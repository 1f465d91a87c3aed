// Start of file: /src/config/environment.rs

// * Environment configuration with a singleton pattern
// * and zero-copy defaults.

use std::{borrow::Cow, collections::HashMap};
// * anyhow for convenient error handling
use anyhow::{Context, Result};
// * once_cell for lazy static initialization
use once_cell::sync::Lazy;
use tracing::warn;

// ! Default values for environment variables (used if variables aren't set):
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_SIZE: usize = 2_097_152; // 2MB
const DEFAULT_TIMEOUT: u64 = 3; // 3 seconds

pub const ENVIRONMENT_KEY: &str = "ENVIRONMENT";
pub const PRODUCTION: &str = "production";

// * A struct containing all environment variables used by the app
#[derive(Clone, Debug)]
pub struct EnvironmentVariables {
    pub environment: Cow<'static, str>,
    pub host: Cow<'static, str>,
    pub port: u16,
    pub max_request_body_size: usize,
    pub default_timeout_seconds: u64,
    // ? None means "follow the production flag"
    pub error_stack: Option<bool>,
    pub error_default_500: bool,
    pub error_plugins: Vec<String>,
}

// * True when the process-level ENVIRONMENT variable says production
pub fn is_production() -> bool {
    std::env::var(ENVIRONMENT_KEY).is_ok_and(|env| env == PRODUCTION)
}

impl EnvironmentVariables {
    // * Loads environment variables once.
    // * Only reads .env if ENVIRONMENT != "production".
    pub fn load() -> Result<Self> {
        // ? In non-production environments, attempt to load .env
        if !is_production() {
            dotenv::dotenv().ok();
        }

        // * Collect all environment vars from the system and .env
        let vars: HashMap<String, String> = std::env::vars()
            .chain(dotenv::vars())
            .collect();

        Self::from_lookup(|key| vars.get(key).cloned())
    }

    // * Builds the configuration from any key -> value source
    pub fn from_lookup<F>(get_var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            environment: get_var(ENVIRONMENT_KEY)
                .map(Cow::Owned)
                .unwrap_or_else(|| {
                    warn!("Missing ENVIRONMENT, defaulting to '{DEFAULT_ENVIRONMENT}'");
                    Cow::Borrowed(DEFAULT_ENVIRONMENT)
                }),

            host: get_var("HOST")
                .map(Cow::Owned)
                .unwrap_or(Cow::Borrowed(DEFAULT_HOST)),

            port: get_var("PORT")
                .map(|s| s.parse().context("Invalid PORT value"))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),

            max_request_body_size: get_var("MAX_REQUEST_BODY_SIZE")
                .map(|s| s.parse().context("Invalid MAX_REQUEST_BODY_SIZE"))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),

            default_timeout_seconds: get_var("DEFAULT_TIMEOUT_SECONDS")
                .map(|s| s.parse().context("Invalid DEFAULT_TIMEOUT_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT),

            error_stack: get_var("ERROR_STACK")
                .map(|s| s.parse().context("Invalid ERROR_STACK, expected true or false"))
                .transpose()?,

            error_default_500: get_var("ERROR_DEFAULT_500")
                .map(|s| s.parse().context("Invalid ERROR_DEFAULT_500, expected true or false"))
                .transpose()?
                .unwrap_or(false),

            // ! Order matters: plugins are registered exactly as listed
            error_plugins: get_var("ERROR_PLUGINS")
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    // * Returns a reference to the lazily-initialized environment configuration
    pub fn instance() -> &'static Self {
        static INSTANCE: Lazy<Result<EnvironmentVariables, anyhow::Error>> = Lazy::new(|| {
            let config: EnvironmentVariables = EnvironmentVariables::load()?;

            if cfg!(debug_assertions) {
                tracing::debug!("Loaded environment configuration: {:#?}", config);
            }

            Ok(config)
        });

        // ! Panics if loading fails
        INSTANCE.as_ref().expect("Failed to load environment configuration")
    }
}


// End of file: /src/config/environment.rs
