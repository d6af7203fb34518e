use {
    crate::{Error, Result},
    serde::Deserialize,
    std::time::Duration,
    url::Url,
};

///
/// Configuration for entrypoint resolution and server-side rendering.
///
/// These values used to be process-wide switches. Here they belong to a
/// single [`Resolver`](crate::Resolver) instance so that several renderers
/// with different settings can live in the same process.
///
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Whether the resolver runs in a headless server-rendering context.
    /// When true, DOM content is handed to the preload hook before it is
    /// returned. By default `headless` is true.
    #[serde(default = "RenderConfig::default_headless")]
    pub headless: bool,

    /// Maximum time a route manager may take to resolve its internal route.
    /// Exceeding it is reported as a deadlock error naming the manager.
    /// By default `route_manager_timeout` is 5 seconds.
    #[serde(
        default = "RenderConfig::default_route_manager_timeout",
        with = "humantime_serde"
    )]
    pub route_manager_timeout: Duration,

    /// Maximum time the preload hook may spend on a single node. When it
    /// expires an error is logged and rendering continues with the state
    /// available at that point. By default `preload_timeout` is 5 seconds.
    #[serde(
        default = "RenderConfig::default_preload_timeout",
        with = "humantime_serde"
    )]
    pub preload_timeout: Duration,

    /// Origin used to build a synthetic URL when absolute route-map keys
    /// (`https://...`) are matched and the context carries no request URL.
    /// By default `base_origin` is "http://localhost".
    #[serde(default = "RenderConfig::default_base_origin")]
    pub base_origin: String,

    /// Whether attributes holding event listeners make a node live during
    /// hydration analysis. By default `include_event_listeners` is true.
    #[serde(default = "RenderConfig::default_include_event_listeners")]
    pub include_event_listeners: bool,
}

impl RenderConfig {
    fn default_headless() -> bool {
        true
    }

    fn default_route_manager_timeout() -> Duration {
        Duration::from_secs(5)
    }

    fn default_preload_timeout() -> Duration {
        Duration::from_secs(5)
    }

    fn default_base_origin() -> String {
        "http://localhost".into()
    }

    fn default_include_event_listeners() -> bool {
        true
    }

    /// Returns the parsed base origin.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_origin)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.route_manager_timeout.is_zero() {
            return Err(Error::config(
                "route_manager_timeout must be > 0. Set [render] route_manager_timeout = \"5s\" in config.",
            ));
        }

        if self.preload_timeout.is_zero() {
            return Err(Error::config(
                "preload_timeout must be > 0. Set [render] preload_timeout = \"5s\" in config.",
            ));
        }

        let base = Url::parse(&self.base_origin).map_err(|e| {
            Error::config(format!(
                "base_origin must be an absolute URL such as \"http://localhost\": {e}"
            ))
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_origin \"{}\" cannot be used as a base URL",
                self.base_origin
            )));
        }

        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: Self::default_headless(),
            route_manager_timeout: Self::default_route_manager_timeout(),
            preload_timeout: Self::default_preload_timeout(),
            base_origin: Self::default_base_origin(),
            include_event_listeners: Self::default_include_event_listeners(),
        }
    }
}
