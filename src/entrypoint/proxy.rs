//! Entrypoint proxies.
//!
//! A proxy wraps an entrypoint with three optional hooks that run around a
//! normal resolution: `redirect` rewrites the route, `intercept` replaces the
//! entrypoint for one request, and `transform` rewrites the resolved content.
//! Cross-cutting concerns such as partial-hydration wrappers are written as
//! proxies so the site's own entrypoint tree stays untouched.

use {
    crate::{
        Content, Context, ContextSource, Entrypoint, Generator, Params, RenderMethod,
        RenderPreset, ResolveOptions, Resolver, Result, Route, RouteHandler,
    },
    async_trait::async_trait,
    std::sync::Arc,
};

/// The hooks of an entrypoint proxy. Every hook is optional; returning
/// `Ok(None)` keeps the default behaviour.
#[async_trait]
pub trait EntrypointProxy: Send + Sync {
    /// Rewrites the route before anything else runs.
    async fn redirect(&self, _route: &Route, _context: &Context) -> Result<Option<Route>> {
        Ok(None)
    }

    /// Replaces the wrapped entrypoint for this resolution only.
    async fn intercept(&self, _route: &Route, _context: &Context) -> Result<Option<Entrypoint>> {
        Ok(None)
    }

    /// Replaces the resolved content. A result that is not already a preset
    /// is wrapped in one carrying `method`.
    async fn transform(
        &self,
        _content: Option<Content>,
        _method: RenderMethod,
        _route: &Route,
        _context: &Context,
    ) -> Result<Option<Entrypoint>> {
        Ok(None)
    }
}

/// A [`RouteHandler`] that runs an [`EntrypointProxy`] around `entrypoint`.
pub struct ProxyHandler<P> {
    proxy: P,
    entrypoint: Entrypoint,
    resolver: Arc<Resolver>,
}

impl<P: EntrypointProxy> ProxyHandler<P> {
    pub fn new(proxy: P, entrypoint: impl Into<Entrypoint>, resolver: Arc<Resolver>) -> Self {
        Self {
            proxy,
            entrypoint: entrypoint.into(),
            resolver,
        }
    }

    pub fn into_entrypoint(self) -> Entrypoint
    where
        P: 'static,
    {
        Entrypoint::route_handler(self)
    }
}

#[async_trait]
impl<P: EntrypointProxy> RouteHandler for ProxyHandler<P> {
    async fn get_route(&self, route: &Route, context: &Context) -> Result<Entrypoint> {
        let route = self
            .proxy
            .redirect(route, context)
            .await?
            .unwrap_or_else(|| route.clone());

        let entrypoint = match self.proxy.intercept(&route, context).await? {
            Some(intercepted) => {
                tracing::debug!(route = %route, "Proxy intercepted route");
                intercepted
            }
            None => self.entrypoint.clone(),
        };

        let resolved = self
            .resolver
            .resolve_entrypoint_route(&entrypoint, route.clone(), context.clone(), false)
            .await?;
        let method = resolved.render_method;

        let transformed = self
            .proxy
            .transform(resolved.content.clone(), method, &route, context)
            .await?;

        Ok(match transformed {
            Some(preset @ Entrypoint::Preset(_)) => preset,
            Some(other) => RenderPreset::new(method, other).into(),
            None => RenderPreset::new(method, resolved.content).into(),
        })
    }
}

/// Generator exposing `entrypoint` to clients that request routes remotely.
/// It resolves `Context::route` and returns the content as a preset with the
/// resolved render method.
pub fn backend_entrypoint_proxy(entrypoint: Entrypoint, resolver: Arc<Resolver>) -> Entrypoint {
    Entrypoint::Generator(Arc::new(BackendProxy {
        entrypoint,
        resolver,
    }))
}

struct BackendProxy {
    entrypoint: Entrypoint,
    resolver: Arc<Resolver>,
}

#[async_trait]
impl Generator for BackendProxy {
    async fn generate(&self, context: &Context, _params: &Params) -> Result<Entrypoint> {
        let resolved = self
            .resolver
            .resolve_entrypoint_route(
                &self.entrypoint,
                context.route.clone(),
                ContextSource::Default,
                false,
            )
            .await?;
        Ok(RenderPreset::new(resolved.render_method, resolved.content).into())
    }
}

/// Recomputes the effective route for `route`.
///
/// Resolution stops at the first route manager; its internal route is then
/// appended to the part of `route` consumed before reaching it. Without a
/// route manager the input route is returned.
pub async fn refetch_route(
    resolver: &Resolver,
    route: Route,
    entrypoint: &Entrypoint,
    context: impl Into<ContextSource>,
) -> Result<Route> {
    let options = ResolveOptions {
        return_first_route_manager: true,
        ..ResolveOptions::default()
    };
    let resolved = resolver
        .resolve_with(entrypoint, route.clone(), context, options)
        .await?;

    let Some(manager) = resolved.content.as_ref().and_then(Content::route_manager) else {
        return Ok(route);
    };

    let consumed = route
        .routename()
        .replacen(&resolved.remaining_route.routename(), "", 1);
    let existing = Route::parse(&consumed)?;
    let internal = manager.internal_route().await?;
    Ok(existing.child_route(&internal))
}
