use {
    crate::{
        Config, Content, ContextSource, Entrypoint, Error, LazyContext, Node, Preloader,
        ReactiveRuntime, RenderConfig, RenderMethod, Result, Route, RouteKey, RouteManager,
        RouteMap, find_best_match, get_live_nodes, preload_tree,
    },
    axum::http::{HeaderMap, StatusCode},
    futures::future::{BoxFuture, FutureExt},
    std::sync::Arc,
    tracing::Instrument,
    url::Url,
};

/// Switches for a single resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Server pre-render pass: `Dynamic` presets are not descended into.
    pub static_only: bool,
    /// Only check whether the route exists. Generators and route handlers
    /// are not called.
    pub probe_no_side_effects: bool,
    /// Stop at the first route manager instead of delegating to it.
    pub return_first_route_manager: bool,
}

impl ResolveOptions {
    pub fn static_only(static_only: bool) -> Self {
        Self {
            static_only,
            ..Self::default()
        }
    }
}

/// The result of resolving an entrypoint for a route.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The final content. `None` means nothing could be found for the route.
    pub content: Option<Content>,
    pub render_method: RenderMethod,
    pub status_code: Option<StatusCode>,
    /// Set once the deepest level has been reached and its route manager
    /// (if any) consulted.
    pub resolved: bool,
    /// Part of the route not consumed by route-map keys.
    pub remaining_route: Route,
    /// Response headers written to the context during resolution.
    pub headers: HeaderMap,
}

impl Resolved {
    fn pending(route: Route) -> Self {
        Self {
            content: None,
            render_method: RenderMethod::default(),
            status_code: None,
            resolved: false,
            remaining_route: route,
            headers: HeaderMap::new(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.content.is_none()
    }

    /// Status for the response: the explicit code, else 404 when nothing was
    /// found, else 200.
    pub fn status(&self) -> StatusCode {
        match (self.status_code, &self.content) {
            (Some(code), _) => code,
            (None, None) => StatusCode::NOT_FOUND,
            (None, Some(_)) => StatusCode::OK,
        }
    }
}

/// Resolves entrypoints into content.
///
/// A resolver holds the settings that used to be process-wide (headless
/// mode, timeouts, base origin) so each server instance can carry its own.
///
/// ```
/// use axum_entrypoint::{
///     Config, ContextSource, Entrypoint, RenderMethod, Resolver, RouteMap, render_static,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> axum_entrypoint::Result<()> {
/// let site: Entrypoint = RouteMap::new()
///     .route("/", "Home")?
///     .route("/about", render_static("About"))?
///     .into();
///
/// let resolver = Resolver::from_config(&Config::default())?;
/// let resolved = resolver
///     .resolve_entrypoint_route(&site, "/about".parse()?, ContextSource::Default, false)
///     .await?;
/// assert_eq!(resolved.render_method, RenderMethod::Static);
/// # Ok(())
/// # }
/// ```
pub struct Resolver {
    config: RenderConfig,
    base_url: Url,
    preloader: Option<Arc<dyn Preloader>>,
}

impl Resolver {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        Ok(Self {
            config,
            base_url,
            preloader: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.render.clone())
    }

    /// Sets the hook that lets DOM content settle before it is returned in
    /// headless mode.
    pub fn with_preloader(mut self, preloader: impl Preloader + 'static) -> Self {
        self.preloader = Some(Arc::new(preloader));
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Resolves `entrypoint` for `route`.
    ///
    /// `context` may be a ready [`Context`](crate::Context), a factory, or
    /// [`ContextSource::Default`]; a factory is called at most once and only
    /// if a stage needs the context. With `static_only`, `Dynamic` presets resolve to empty
    /// content without being descended into.
    ///
    /// Errors from generators, route handlers and route managers are returned
    /// unchanged.
    pub async fn resolve_entrypoint_route(
        &self,
        entrypoint: &Entrypoint,
        route: Route,
        context: impl Into<ContextSource>,
        static_only: bool,
    ) -> Result<Resolved> {
        self.resolve_with(
            entrypoint,
            route,
            context,
            ResolveOptions::static_only(static_only),
        )
        .await
    }

    pub async fn resolve_with(
        &self,
        entrypoint: &Entrypoint,
        route: Route,
        context: impl Into<ContextSource>,
        options: ResolveOptions,
    ) -> Result<Resolved> {
        let mut context = LazyContext::new(context.into(), route.clone());
        let span = tracing::debug_span!(
            "resolve_entrypoint",
            route = %route,
            request_id = tracing::field::Empty,
        );
        if let Some(cx) = context.peek() {
            span.record("request_id", tracing::field::display(cx.request_id));
        }

        let mut resolved = self
            .collapse(entrypoint.clone(), route, &mut context, options)
            .instrument(span)
            .await?;

        if let Some(cx) = context.peek() {
            resolved.headers = cx.response_headers.snapshot();
        }
        tracing::debug!(
            render_method = %resolved.render_method,
            found = resolved.content.is_some(),
            remaining_route = %resolved.remaining_route,
            "Entrypoint resolved"
        );
        Ok(resolved)
    }

    /// Nodes of the resolved content that must be hydrated on the client.
    /// Empty unless the render method hydrates and the content is a node.
    pub fn live_nodes(&self, resolved: &Resolved, runtime: &dyn ReactiveRuntime) -> Vec<Node> {
        match &resolved.content {
            Some(Content::Node(node)) if resolved.render_method.needs_hydration() => {
                get_live_nodes(runtime, node, self.config.include_event_listeners)
            }
            _ => Vec::new(),
        }
    }

    fn collapse<'a>(
        &'a self,
        entrypoint: Entrypoint,
        route: Route,
        context: &'a mut LazyContext,
        options: ResolveOptions,
    ) -> BoxFuture<'a, Result<Resolved>> {
        async move {
            let mut resolved = Resolved::pending(route.clone());

            match entrypoint {
                Entrypoint::Preset(preset)
                    if options.static_only && preset.method() == RenderMethod::Dynamic =>
                {
                    tracing::debug!(route = %route, "Dynamic preset skipped in static pass");
                    resolved.content = Some(Content::Text(String::new()));
                    resolved.render_method = RenderMethod::Dynamic;
                    resolved.remaining_route = Route::root();
                }
                Entrypoint::Generator(_) | Entrypoint::RouteHandler(_)
                    if options.probe_no_side_effects =>
                {
                    tracing::trace!(route = %route, "Probe skips side effects");
                }
                Entrypoint::Generator(generator) => {
                    tracing::trace!(route = %route, "Calling generator");
                    let cx = &*context.get();
                    let next = generator.generate(cx, &cx.params).await?;
                    resolved = self.collapse(next, route.clone(), context, options).await?;
                }
                Entrypoint::Preset(preset) => {
                    resolved = self
                        .collapse(preset.content().clone(), route.clone(), context, options)
                        .await?;
                    resolved.render_method = preset.method();
                    if let Some(code) = preset.status_code() {
                        resolved.status_code = Some(code);
                    }
                }
                Entrypoint::Status(status) => {
                    resolved = self
                        .collapse(status.content().clone(), route.clone(), context, options)
                        .await?;
                    resolved.status_code = Some(status.code());
                }
                Entrypoint::RouteHandler(handler) => {
                    tracing::trace!(route = %route, "Calling route handler");
                    let next = handler.get_route(&route, context.get()).await?;
                    resolved = self.collapse(next, route.clone(), context, options).await?;
                }
                Entrypoint::RouteMap(map) => {
                    resolved = self
                        .resolve_route_map(&map, route.clone(), context, options)
                        .await?;
                }
                Entrypoint::Live(live) => {
                    let current = Entrypoint::clone(&live.get());
                    resolved = self.collapse(current, route.clone(), context, options).await?;
                }
                Entrypoint::RouteManager(manager) => {
                    resolved.content = Some(Content::Manager(manager));
                }
                Entrypoint::Leaf(content) => {
                    if content.route_manager().is_none() {
                        resolved.remaining_route = Route::root();
                    }
                    resolved.content = Some(content);
                }
                Entrypoint::Empty => {
                    resolved.remaining_route = Route::root();
                }
            }

            if !resolved.resolved {
                self.finish(&mut resolved, &route, context, options).await?;
            }
            Ok(resolved)
        }
        .boxed()
    }

    /// Work done once, at the deepest level: preload the rendered node, then
    /// let a route manager navigate to the route.
    async fn finish(
        &self,
        resolved: &mut Resolved,
        route: &Route,
        context: &mut LazyContext,
        options: ResolveOptions,
    ) -> Result<()> {
        if self.config.headless {
            if let (Some(preloader), Some(node)) = (
                &self.preloader,
                resolved.content.as_ref().and_then(Content::as_node),
            ) {
                preload_tree(preloader.as_ref(), node, self.config.preload_timeout).await;
            }
        }

        let manager = resolved.content.as_ref().and_then(Content::route_manager);
        if let Some(manager) = manager {
            if options.return_first_route_manager {
                tracing::trace!(manager = %manager.name(), "Stopping at first route manager");
            } else if !self.delegate(manager, route, context).await? {
                resolved.content = None;
            }
        }

        resolved.resolved = true;
        Ok(())
    }

    /// Lets `manager` navigate to `route`. Returns false if it reached a
    /// different route.
    async fn delegate(
        &self,
        manager: Arc<dyn RouteManager>,
        route: &Route,
        context: &mut LazyContext,
    ) -> Result<bool> {
        let name = manager.name();
        let timeout = self.config.route_manager_timeout;

        let reached =
            match tokio::time::timeout(timeout, manager.resolve_route(route, context.get())).await
            {
                Ok(reached) => reached?,
                Err(_) => {
                    tracing::error!(
                        manager = %name,
                        route = %route,
                        timeout = %humantime::format_duration(timeout),
                        "Route manager did not resolve in time"
                    );
                    return Err(Error::route_manager_deadlock(&name, timeout));
                }
            };

        if reached != *route {
            tracing::warn!(
                manager = %name,
                requested = %route,
                reached = %reached,
                "Route manager could not resolve the requested route"
            );
            return Ok(false);
        }
        Ok(true)
    }

    async fn resolve_route_map(
        &self,
        map: &RouteMap,
        route: Route,
        context: &mut LazyContext,
        options: ResolveOptions,
    ) -> Result<Resolved> {
        let has_absolute_keys = map
            .entries()
            .iter()
            .any(|(key, _)| matches!(key, RouteKey::Pattern(p) if p.is_absolute()));
        let url = if has_absolute_keys {
            Some(match &context.get().url {
                Some(url) => url.clone(),
                None => self.base_url.join(&route.to_string())?,
            })
        } else {
            None
        };

        // (entry index, route handed to the entry, keep the entry's residual)
        let mut choice = None;
        let mut bare_wildcard = false;

        if let Some((index, pattern, matched)) = find_best_match(map, &route, url.as_ref()) {
            let next_route = pattern.residual_route(&route, &matched);
            tracing::debug!(
                key = pattern.key(),
                route = %route,
                residual = %next_route,
                "Route map key matched"
            );
            let cx = context.get();
            cx.params.extend(matched.params());
            cx.url_match = Some(matched);
            bare_wildcard = pattern.key() == "*";
            choice = Some((index, next_route, pattern.is_wildcard()));
        }

        if choice.is_none() || bare_wildcard {
            for (index, (key, _)) in map.entries().iter().enumerate() {
                let RouteKey::Filter(filter) = key else {
                    continue;
                };
                if filter.evaluate(context.get()).await {
                    tracing::debug!(
                        filter = filter.name(),
                        route = %route,
                        "Route map filter matched"
                    );
                    choice = Some((index, route.clone(), bare_wildcard));
                    break;
                }
            }
        }

        let Some((index, next_route, keep_residual)) = choice else {
            tracing::debug!(route = %route, "No route map key matched");
            return Ok(Resolved {
                resolved: true,
                render_method: RenderMethod::Dynamic,
                ..Resolved::pending(route)
            });
        };

        let entry = map.entries()[index].1.clone();
        let mut resolved = self.collapse(entry, next_route, context, options).await?;
        if !keep_residual {
            resolved.remaining_route = Route::root();
        }
        Ok(resolved)
    }
}
