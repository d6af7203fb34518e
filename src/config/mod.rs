//!
//! Configuration structures for the entrypoint resolver.
//!
//! A configuration can be created in several ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml` or `str::parse`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! TOML text may reference environment variables with the `{{ VAR_NAME }}`
//! syntax; they are substituted before parsing.
//!
//! Sections:
//!
//! - `RenderConfig` for resolution, preloading and hydration settings
//! - `LoggingConfig` for logging and tracing settings
//!
mod logging;
mod render;

pub use logging::*;
pub use render::*;

use {
    crate::{Error, Result},
    regex::{Captures, Regex},
    serde::Deserialize,
    std::{env, fs, str::FromStr, sync::LazyLock, time::Duration},
};

/// Matches `{{ VAR_NAME }}` references, whitespace inside the braces allowed.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    ///
    /// Loads the configuration from `config/{RUST_ENV}.toml`.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Loads `config/{env}.toml`, substitutes environment variables and parses it.
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        toml_str.parse()
    }

    /// Sets whether the resolver runs in a headless server-rendering context.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.render.headless = headless;
        self
    }

    /// Sets the deadlock guard applied to route managers.
    pub fn with_route_manager_timeout(mut self, timeout: Duration) -> Self {
        self.render.route_manager_timeout = timeout;
        self
    }

    /// Sets the per-node bound for the preload hook.
    pub fn with_preload_timeout(mut self, timeout: Duration) -> Self {
        self.render.preload_timeout = timeout;
        self
    }

    /// Sets the origin used for absolute-URL route keys.
    pub fn with_base_origin(mut self, origin: impl AsRef<str>) -> Self {
        self.render.base_origin = origin.as_ref().into();
        self
    }

    /// Sets whether event listener attributes mark nodes as live.
    pub fn with_event_listeners(mut self, include: bool) -> Self {
        self.render.include_event_listeners = include;
        self
    }

    /// Sets the log format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Sets the fallback log filter used when `RUST_LOG` is unset.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = Some(filter.into());
        self
    }

    /// Ensures that the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    ///
    /// Sets up the tracing subscriber for logging based on the LoggingConfig.
    ///
    /// NOTE: This should be called early during startup to ensure logging is configured
    ///       before any log messages are emitted. Calling it twice is harmless.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::prelude::*;
        let env_filter = self.logging.env_filter();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let text = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&text)?;
        Ok(config)
    }
}

/// Replaces `{{ VAR_NAME }}` placeholders with environment variable values.
///
/// Unset variables are replaced with an empty string and reported with a
/// warning.
///
/// ```
/// use axum_entrypoint::replace_handlebars_with_env;
///
/// let result = replace_handlebars_with_env("origin = \"{{ MISSING_ORIGIN_VAR }}\"");
/// assert_eq!(result, "origin = \"\"");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}
