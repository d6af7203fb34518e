use {
    crate::{Error, Result},
    serde::Deserialize,
    tracing_subscriber::EnvFilter,
};

///
/// Configuration for logging and tracing.
///
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Format for log output: `default`, `json`, `compact` or `pretty`.
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directives used when `RUST_LOG` is not set, for example
    /// `"axum_entrypoint=debug"`. When absent only `RUST_LOG` is consulted.
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(filter) = &self.filter {
            EnvFilter::try_new(filter).map_err(|e| {
                Error::config(format!("invalid [logging] filter \"{filter}\": {e}"))
            })?;
        }
        Ok(())
    }

    /// Builds the env filter: `RUST_LOG` first, then the configured directives.
    pub(crate) fn env_filter(&self) -> EnvFilter {
        match &self.filter {
            Some(filter) => {
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
            }
            None => EnvFilter::from_default_env(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Default,
    Compact,
    Pretty,
}
