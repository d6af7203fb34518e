use {
    crate::{
        Context, Error, HttpStatus, Node, RenderMethod, RenderPreset, Result, Route, RoutePattern,
    },
    arc_swap::ArcSwap,
    async_trait::async_trait,
    axum::{
        http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
        response::{IntoResponse, Response},
    },
    bytes::Bytes,
    futures::{FutureExt, future::BoxFuture},
    std::{collections::BTreeMap, fmt, future::Future, sync::Arc},
    url::Url,
};

/// Named groups collected from route-map matches.
pub type Params = BTreeMap<String, String>;

/// Produces an entrypoint lazily, once per request.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, context: &Context, params: &Params) -> Result<Entrypoint>;
}

/// Produces a child entrypoint for a route. The handler sees the full route
/// it was reached with; nothing is stripped for it.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn get_route(&self, route: &Route, context: &Context) -> Result<Entrypoint>;
}

/// A leaf that manages its own sub-navigation state.
#[async_trait]
pub trait RouteManager: Send + Sync {
    /// Navigates to `route` and returns the route that was actually reached.
    async fn resolve_route(&self, route: &Route, context: &Context) -> Result<Route>;

    /// The route the manager currently shows.
    async fn internal_route(&self) -> Result<Route>;

    /// Name used in logs and in the deadlock error.
    fn name(&self) -> String {
        std::any::type_name::<Self>().into()
    }
}

/// Adapts an async closure into a [`Generator`].
pub struct FnGenerator<F>(F);

#[async_trait]
impl<F, Fut> Generator for FnGenerator<F>
where
    F: Fn(Context, Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Entrypoint>> + Send,
{
    async fn generate(&self, context: &Context, params: &Params) -> Result<Entrypoint> {
        (self.0)(context.clone(), params.clone()).await
    }
}

/// Adapts an async closure into a [`RouteHandler`].
pub struct FnRouteHandler<F>(F);

#[async_trait]
impl<F, Fut> RouteHandler for FnRouteHandler<F>
where
    F: Fn(Route, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Entrypoint>> + Send,
{
    async fn get_route(&self, route: &Route, context: &Context) -> Result<Entrypoint> {
        (self.0)(route.clone(), context.clone()).await
    }
}

/// A named async predicate over the request context, usable as a route-map
/// key. Filters are consulted only when no pattern key matched, or only the
/// bare `*` key did.
#[derive(Clone)]
pub struct RouteFilter {
    name: String,
    predicate: Arc<dyn Fn(Context) -> BoxFuture<'static, bool> + Send + Sync>,
}

impl RouteFilter {
    pub fn new<F, Fut>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(move |context| predicate(context).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn evaluate(&self, context: &Context) -> bool {
        (self.predicate)(context.clone()).await
    }
}

impl fmt::Debug for RouteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteFilter({})", self.name)
    }
}

/// A shared cell whose current value is read when a route-map entry is
/// matched. Updating it affects later resolutions only.
pub struct Live<T>(Arc<ArcSwap<T>>);

impl<T> Live<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(value)))
    }

    pub fn get(&self) -> Arc<T> {
        self.0.load_full()
    }

    pub fn set(&self, value: T) {
        self.0.store(Arc::new(value));
    }
}

impl<T> Clone for Live<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Live<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Live").field(&self.get()).finish()
    }
}

/// An opaque payload served verbatim with the `Raw` render method.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawPayload {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl IntoResponse for RawPayload {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// The concrete value a resolution produces.
#[derive(Clone)]
pub enum Content {
    Node(Node),
    Text(String),
    Number(f64),
    Bool(bool),
    /// A rich-text (markdown) document.
    Markdown(String),
    Raw(RawPayload),
    /// A bare route manager used as content.
    Manager(Arc<dyn RouteManager>),
}

impl Content {
    /// The route manager exposed by this content, either directly or by a
    /// component rendered as a node.
    pub fn route_manager(&self) -> Option<Arc<dyn RouteManager>> {
        match self {
            Content::Manager(manager) => Some(manager.clone()),
            Content::Node(node) => node.route_manager().cloned(),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Content::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) | Content::Markdown(text) => Some(text),
            _ => None,
        }
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Content::Node(a), Content::Node(b)) => a.ptr_eq(b),
            (Content::Text(a), Content::Text(b)) => a == b,
            (Content::Number(a), Content::Number(b)) => a == b,
            (Content::Bool(a), Content::Bool(b)) => a == b,
            (Content::Markdown(a), Content::Markdown(b)) => a == b,
            (Content::Raw(a), Content::Raw(b)) => a == b,
            (Content::Manager(a), Content::Manager(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Node(node) => node.fmt(f),
            Content::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Content::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Content::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Content::Markdown(md) => f.debug_tuple("Markdown").field(md).finish(),
            Content::Raw(raw) => raw.fmt(f),
            Content::Manager(manager) => write!(f, "Manager({})", manager.name()),
        }
    }
}

/// How a route's content is described.
///
/// Resolution collapses an entrypoint recursively until it reaches a leaf.
/// Every chain must end in a leaf after finitely many steps; a generator or
/// preset cycle is a bug in the caller and is not detected.
#[derive(Clone, Default)]
pub enum Entrypoint {
    /// No content.
    #[default]
    Empty,
    Leaf(Content),
    Generator(Arc<dyn Generator>),
    Preset(Arc<RenderPreset>),
    Status(Arc<HttpStatus>),
    RouteMap(Arc<RouteMap>),
    RouteHandler(Arc<dyn RouteHandler>),
    RouteManager(Arc<dyn RouteManager>),
    /// A live cell, dereferenced to its current value when reached.
    Live(Live<Entrypoint>),
}

impl Entrypoint {
    /// Wraps an async closure `(context, params) -> Result<Entrypoint>`.
    pub fn generator<F, Fut>(generator: F) -> Self
    where
        F: Fn(Context, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Entrypoint>> + Send + 'static,
    {
        Entrypoint::Generator(Arc::new(FnGenerator(generator)))
    }

    /// Wraps an async closure `(route, context) -> Result<Entrypoint>`.
    pub fn handler<F, Fut>(handler: F) -> Self
    where
        F: Fn(Route, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Entrypoint>> + Send + 'static,
    {
        Entrypoint::RouteHandler(Arc::new(FnRouteHandler(handler)))
    }

    pub fn route_handler(handler: impl RouteHandler + 'static) -> Self {
        Entrypoint::RouteHandler(Arc::new(handler))
    }

    pub fn route_manager(manager: impl RouteManager + 'static) -> Self {
        Entrypoint::RouteManager(Arc::new(manager))
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Entrypoint::Leaf(Content::Markdown(text.into()))
    }

    /// A raw `302 Found` response pointing at `location`.
    pub fn redirect(location: &Url) -> Result<Self> {
        let value = HeaderValue::from_str(location.as_str())
            .map_err(|e| Error::invalid_route(format!("bad redirect target {location}: {e}")))?;
        let payload = RawPayload::new(Bytes::new())
            .with_status(StatusCode::FOUND)
            .with_header(header::LOCATION, value);
        Ok(RenderPreset::new(RenderMethod::Raw, payload).into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Entrypoint::Empty)
    }

    fn variant(&self) -> &'static str {
        match self {
            Entrypoint::Empty => "Empty",
            Entrypoint::Leaf(_) => "Leaf",
            Entrypoint::Generator(_) => "Generator",
            Entrypoint::Preset(_) => "Preset",
            Entrypoint::Status(_) => "Status",
            Entrypoint::RouteMap(_) => "RouteMap",
            Entrypoint::RouteHandler(_) => "RouteHandler",
            Entrypoint::RouteManager(_) => "RouteManager",
            Entrypoint::Live(_) => "Live",
        }
    }
}

impl fmt::Debug for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entrypoint::Leaf(content) => f.debug_tuple("Leaf").field(content).finish(),
            Entrypoint::Preset(preset) => f
                .debug_struct("Preset")
                .field("method", &preset.method())
                .field("content", preset.content())
                .finish(),
            Entrypoint::Status(status) => f
                .debug_struct("Status")
                .field("code", &status.code())
                .field("content", status.content())
                .finish(),
            Entrypoint::RouteMap(map) => map.fmt(f),
            Entrypoint::RouteManager(manager) => write!(f, "RouteManager({})", manager.name()),
            Entrypoint::Live(live) => live.fmt(f),
            other => f.write_str(other.variant()),
        }
    }
}

impl From<Content> for Entrypoint {
    fn from(content: Content) -> Self {
        Entrypoint::Leaf(content)
    }
}

impl From<&str> for Entrypoint {
    fn from(text: &str) -> Self {
        Entrypoint::Leaf(Content::Text(text.into()))
    }
}

impl From<String> for Entrypoint {
    fn from(text: String) -> Self {
        Entrypoint::Leaf(Content::Text(text))
    }
}

impl From<f64> for Entrypoint {
    fn from(number: f64) -> Self {
        Entrypoint::Leaf(Content::Number(number))
    }
}

impl From<bool> for Entrypoint {
    fn from(value: bool) -> Self {
        Entrypoint::Leaf(Content::Bool(value))
    }
}

impl From<Node> for Entrypoint {
    fn from(node: Node) -> Self {
        Entrypoint::Leaf(Content::Node(node))
    }
}

impl From<RawPayload> for Entrypoint {
    fn from(raw: RawPayload) -> Self {
        Entrypoint::Leaf(Content::Raw(raw))
    }
}

impl From<RenderPreset> for Entrypoint {
    fn from(preset: RenderPreset) -> Self {
        Entrypoint::Preset(Arc::new(preset))
    }
}

impl From<HttpStatus> for Entrypoint {
    fn from(status: HttpStatus) -> Self {
        Entrypoint::Status(Arc::new(status))
    }
}

impl From<RouteMap> for Entrypoint {
    fn from(map: RouteMap) -> Self {
        Entrypoint::RouteMap(Arc::new(map))
    }
}

impl From<Live<Entrypoint>> for Entrypoint {
    fn from(live: Live<Entrypoint>) -> Self {
        Entrypoint::Live(live)
    }
}

impl<T: Into<Entrypoint>> From<Option<T>> for Entrypoint {
    fn from(value: Option<T>) -> Self {
        value.map_or(Entrypoint::Empty, Into::into)
    }
}

#[derive(Debug, Clone)]
pub enum RouteKey {
    Pattern(RoutePattern),
    Filter(RouteFilter),
}

/// An ordered mapping from route keys to entrypoints.
///
/// ```
/// use axum_entrypoint::{RouteMap, render_static};
///
/// let site = RouteMap::new()
///     .route("/", "Home")?
///     .route("/docs/*", render_static("Docs"))?
///     .route("/users/:id", "User")?;
/// assert_eq!(site.len(), 3);
/// # Ok::<(), axum_entrypoint::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteMap {
    entries: Vec<(RouteKey, Entrypoint)>,
}

impl RouteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern key. Keys starting with `http://` or `https://` are
    /// matched against the full request URL, all others against the route's
    /// path and fragment.
    pub fn route(mut self, key: &str, entrypoint: impl Into<Entrypoint>) -> Result<Self> {
        let pattern = RoutePattern::parse(key)?;
        self.entries.push((RouteKey::Pattern(pattern), entrypoint.into()));
        Ok(self)
    }

    /// Adds a filter key.
    pub fn filter(mut self, filter: RouteFilter, entrypoint: impl Into<Entrypoint>) -> Self {
        self.entries.push((RouteKey::Filter(filter), entrypoint.into()));
        self
    }

    /// Builds a map from `(pattern, entrypoint)` pairs, keeping their order.
    pub fn try_from_iter<I, K, E>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, E)>,
        K: AsRef<str>,
        E: Into<Entrypoint>,
    {
        iter.into_iter()
            .try_fold(Self::new(), |map, (key, entrypoint)| {
                map.route(key.as_ref(), entrypoint)
            })
    }

    pub fn entries(&self) -> &[(RouteKey, Entrypoint)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tabs;

    #[async_trait]
    impl RouteManager for Tabs {
        async fn resolve_route(&self, route: &Route, _: &Context) -> Result<Route> {
            Ok(route.clone())
        }

        async fn internal_route(&self) -> Result<Route> {
            Ok(Route::root())
        }
    }

    #[test]
    fn test_route_manager_default_name() {
        assert!(Tabs.name().ends_with("Tabs"));
    }

    #[test]
    fn test_content_route_manager_from_node() {
        let manager: Arc<dyn RouteManager> = Arc::new(Tabs);
        let node = Node::element("x-tabs").route_manager(manager.clone()).build();
        let content = Content::Node(node);
        assert!(content.route_manager().is_some());
        assert!(Content::Text("x".into()).route_manager().is_none());
        assert_eq!(Content::Manager(manager.clone()), Content::Manager(manager));
    }

    #[test]
    fn test_live_cell() {
        let live = Live::new(Entrypoint::from("old"));
        let alias = live.clone();
        alias.set("new".into());
        assert!(matches!(
            &*live.get(),
            Entrypoint::Leaf(Content::Text(t)) if t == "new"
        ));
    }

    #[test]
    fn test_route_map_preserves_order() {
        let map = RouteMap::try_from_iter([("/b", "B"), ("/a", "A"), ("/a", "A2")]).unwrap();
        let keys: Vec<_> = map
            .entries()
            .iter()
            .map(|(key, _)| match key {
                RouteKey::Pattern(p) => p.key().to_string(),
                RouteKey::Filter(f) => f.name().to_string(),
            })
            .collect();
        assert_eq!(keys, vec!["/b", "/a", "/a"]);
    }

    #[tokio::test]
    async fn test_route_filter() {
        let filter = RouteFilter::new("german", |cx: Context| async move { cx.language == "de" });
        let cx = Context::for_route(Route::root());
        assert!(!filter.evaluate(&cx).await);
        assert!(filter.evaluate(&cx.with_language("de")).await);
    }

    #[test]
    fn test_raw_payload_into_response() {
        let raw = RawPayload::new("body")
            .with_status(StatusCode::CREATED)
            .with_header(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain"),
            );
        let response = raw.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "text/plain");
    }

    #[test]
    fn test_option_into_entrypoint() {
        assert!(Entrypoint::from(None::<&str>).is_empty());
        assert!(!Entrypoint::from(Some("x")).is_empty());
    }
}
