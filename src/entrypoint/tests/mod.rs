//! Test helpers and scenarios for entrypoint resolution.
//!
//! ## Test Organization
//!
//! - `presets`: render-method override rule, static pass, status codes
//! - `route_map`: key selection, residual routes, params, filters
//! - `delegation`: route handlers, route managers, context laziness, preload
//! - `proxy`: entrypoint proxies, backend proxy, `refetch_route`
//! - `scenario`: a small site resolved end to end
//!
//! ## Available Helpers
//!
//! - Resolvers: `resolver()`, `resolver_with()`
//! - Values: `route()`, `text_of()`
//! - Route managers: `FixedManager`, `EchoManager`, `StuckManager`

use crate::{
    Config, Content, Context, ContextSource, Entrypoint, Error, Resolved, Resolver, Result,
    Route, RouteManager,
};
use async_trait::async_trait;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

#[cfg(test)]
pub(crate) mod route_map;

// ============================================================================
// Resolver Helpers
// ============================================================================

/// A resolver with default settings.
pub(crate) fn resolver() -> Resolver {
    resolver_with(Config::default())
}

pub(crate) fn resolver_with(config: Config) -> Resolver {
    Resolver::from_config(&config).expect("test config must be valid")
}

/// Resolves with a default context source.
pub(crate) async fn resolve(entrypoint: &Entrypoint, r: &str) -> Result<Resolved> {
    resolver()
        .resolve_entrypoint_route(entrypoint, route(r), ContextSource::Default, false)
        .await
}

// ============================================================================
// Value Helpers
// ============================================================================

pub(crate) fn route(s: &str) -> Route {
    s.parse().expect("test route must parse")
}

/// Text of the resolved content, panicking on anything else.
pub(crate) fn text_of(resolved: &Resolved) -> &str {
    match &resolved.content {
        Some(Content::Text(text)) => text,
        other => panic!("expected text content, got {other:?}"),
    }
}

/// A generator returning `text` that counts its calls.
pub(crate) fn counting_generator(text: &'static str) -> (Entrypoint, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let generator = Entrypoint::generator(move |_cx, _params| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, Error>(Entrypoint::from(text)) }
    });
    (generator, calls)
}

/// A route handler that records every route it is called with and returns
/// the route as text.
pub(crate) fn recording_handler() -> (Entrypoint, Arc<Mutex<Vec<Route>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let handler = Entrypoint::handler(move |route: Route, _cx| {
        log.lock().unwrap().push(route.clone());
        async move { Ok::<_, Error>(Entrypoint::from(route.to_string())) }
    });
    (handler, seen)
}

// ============================================================================
// Route Managers
// ============================================================================

/// Always reports the same route, whatever it is asked for.
pub(crate) struct FixedManager {
    pub(crate) reached: Route,
    pub(crate) internal: Route,
}

#[async_trait]
impl RouteManager for FixedManager {
    async fn resolve_route(&self, _route: &Route, _context: &Context) -> Result<Route> {
        Ok(self.reached.clone())
    }

    async fn internal_route(&self) -> Result<Route> {
        Ok(self.internal.clone())
    }

    fn name(&self) -> String {
        "FixedManager".into()
    }
}

/// Accepts every route and remembers the last one.
#[derive(Default)]
pub(crate) struct EchoManager {
    pub(crate) last: Mutex<Option<Route>>,
}

#[async_trait]
impl RouteManager for EchoManager {
    async fn resolve_route(&self, route: &Route, _context: &Context) -> Result<Route> {
        *self.last.lock().unwrap() = Some(route.clone());
        Ok(route.clone())
    }

    async fn internal_route(&self) -> Result<Route> {
        Ok(self.last.lock().unwrap().clone().unwrap_or_default())
    }
}

/// Never settles.
pub(crate) struct StuckManager;

#[async_trait]
impl RouteManager for StuckManager {
    async fn resolve_route(&self, _route: &Route, _context: &Context) -> Result<Route> {
        std::future::pending().await
    }

    async fn internal_route(&self) -> Result<Route> {
        Ok(Route::root())
    }

    fn name(&self) -> String {
        "StuckManager".into()
    }
}
