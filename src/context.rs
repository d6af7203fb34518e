//! Per-request context handed to generators, route handlers and filters.

use {
    crate::{PatternMatch, Route},
    http::{HeaderMap, HeaderValue, Method, header, header::IntoHeaderName, request::Parts},
    std::{
        collections::BTreeMap,
        fmt,
        sync::{Arc, Mutex, PoisonError},
    },
    url::Url,
    uuid::{ContextV7, Timestamp, Uuid},
};

/// Per-request metadata.
///
/// A context is created fresh for each request and discarded once the
/// request has been resolved. The route-map matcher writes into
/// [`Context::params`] and [`Context::url_match`] on the way down, so a
/// generator below `'/users/:id'` can read `params["id"]`.
#[derive(Debug, Clone)]
pub struct Context {
    /// Correlation id for logs (UUIDv7, time ordered).
    pub request_id: Uuid,
    /// The requested route.
    pub route: Route,
    /// Named groups collected from every route-map match so far.
    pub params: BTreeMap<String, String>,
    /// The most recent route-map match.
    pub url_match: Option<PatternMatch>,
    /// Preferred language of the client.
    pub language: String,
    /// Full request URL, when known. Used to match absolute route keys.
    pub url: Option<Url>,
    pub method: Option<Method>,
    pub headers: HeaderMap,
    /// Headers the application wants added to the response. They are
    /// returned alongside the resolved content. Clones of a context share
    /// the same header set.
    pub response_headers: ResponseHeaders,
}

impl Context {
    /// Creates a context for a route with no request attached.
    pub fn for_route(route: Route) -> Self {
        let cx = ContextV7::new().with_additional_precision();
        Self {
            request_id: Uuid::new_v7(Timestamp::now(cx)),
            route,
            params: BTreeMap::new(),
            url_match: None,
            language: "en".into(),
            url: None,
            method: None,
            headers: HeaderMap::new(),
            response_headers: ResponseHeaders::default(),
        }
    }

    /// Creates a context from the head of an HTTP request.
    ///
    /// The request URL is rebuilt from the `Host` header and `base` (which
    /// supplies the scheme and a fallback host). The language is the first
    /// tag of `Accept-Language`. An `x-request-id` header that holds a UUID
    /// is reused as the request id.
    pub fn from_request_parts(parts: &Parts, base: &Url) -> Self {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let mut url = base.clone();
        if let Some(host) = parts
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
        {
            let (hostname, port) = match host.rsplit_once(':') {
                Some((name, port)) => (name, port.parse::<u16>().ok()),
                None => (host, None),
            };
            if url.set_host(Some(hostname)).is_ok() && url.set_port(port).is_err() {
                if let Some(port) = port {
                    tracing::trace!(%base, port, "Host port ignored, base URL cannot carry one");
                }
            }
        }
        let url = url.join(path_and_query).ok();

        let route = url
            .as_ref()
            .map(Route::from_url)
            .or_else(|| Route::parse(path_and_query).ok())
            .unwrap_or_default();

        let mut context = Self::for_route(route);
        context.url = url;
        context.method = Some(parts.method.clone());
        context.headers = parts.headers.clone();

        if let Some(lang) = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .and_then(primary_language)
        {
            context.language = lang;
        }

        if let Some(id) = parts
            .headers
            .get("x-request-id")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
        {
            context.request_id = id;
        }

        context
    }

    /// Returns a named match group collected from route-map keys.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }
}

/// Response headers shared between all clones of a [`Context`].
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders(Arc<Mutex<HeaderMap>>);

impl ResponseHeaders {
    pub fn insert<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub fn append<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(name, value);
    }

    /// Copies the current header set.
    pub fn snapshot(&self) -> HeaderMap {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn primary_language(accept: &str) -> Option<String> {
    accept
        .split(',')
        .next()
        .map(|tag| tag.split(';').next().unwrap_or(tag).trim())
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
}

/// Where a resolution gets its [`Context`] from.
///
/// Building a context can be expensive, and leaf-only entrypoints never need
/// one, so a factory can be passed instead. The factory is called at most once
/// per top-level resolution and only when some stage actually needs the
/// context; every nested stage then shares the same instance.
pub enum ContextSource {
    Ready(Context),
    Factory(Box<dyn FnOnce() -> Context + Send>),
    /// Build `Context::for_route(route)` when first needed.
    Default,
}

impl ContextSource {
    pub fn factory<F>(factory: F) -> Self
    where
        F: FnOnce() -> Context + Send + 'static,
    {
        Self::Factory(Box::new(factory))
    }
}

impl Default for ContextSource {
    fn default() -> Self {
        Self::Default
    }
}

impl From<Context> for ContextSource {
    fn from(context: Context) -> Self {
        Self::Ready(context)
    }
}

impl From<Option<Context>> for ContextSource {
    fn from(context: Option<Context>) -> Self {
        context.map_or(Self::Default, Self::Ready)
    }
}

impl fmt::Debug for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(context) => f.debug_tuple("Ready").field(context).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Default => f.write_str("Default"),
        }
    }
}

/// Memoizing accessor over a [`ContextSource`].
pub(crate) struct LazyContext {
    source: Option<ContextSource>,
    context: Option<Context>,
    route: Route,
}

impl LazyContext {
    pub(crate) fn new(source: ContextSource, route: Route) -> Self {
        match source {
            ContextSource::Ready(context) => Self {
                source: None,
                context: Some(context),
                route,
            },
            source => Self {
                source: Some(source),
                context: None,
                route,
            },
        }
    }

    /// Returns the context, building it on first use.
    pub(crate) fn get(&mut self) -> &mut Context {
        let route = &self.route;
        let source = &mut self.source;
        self.context
            .get_or_insert_with(|| match source.take() {
                Some(ContextSource::Factory(factory)) => {
                    tracing::trace!(route = %route, "Materializing context from factory");
                    factory()
                }
                Some(ContextSource::Ready(context)) => context,
                Some(ContextSource::Default) | None => Context::for_route(route.clone()),
            })
    }

    /// Returns the context only if something already built it.
    pub(crate) fn peek(&self) -> Option<&Context> {
        self.context.as_ref()
    }
}
