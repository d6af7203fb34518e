//! Minimal DOM model for rendered content.
//!
//! A [`Node`] is a shared, immutable handle: cloning it is cheap and clones
//! refer to the same node. Attribute and child values that change over time
//! are held as [`Value::Pointer`]s into a reactive runtime, never mutated in
//! place.

use {
    crate::RouteManager,
    serde::Serialize,
    std::{fmt, sync::Arc},
};

/// Identifier of a live reference in a reactive runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PointerId(pub u64);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:x}", self.0)
    }
}

/// A child or attribute value of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Node(Node),
    Text(String),
    Number(f64),
    Bool(bool),
    /// A live reference whose current value lives in a reactive runtime.
    Pointer(PointerId),
    /// An event listener, identified by its handler name.
    Listener(String),
    Null,
}

impl Value {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_listener(&self) -> bool {
        matches!(self, Value::Listener(_))
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.into())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<PointerId> for Value {
    fn from(id: PointerId) -> Self {
        Value::Pointer(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(String),
    Fragment,
}

struct NodeInner {
    kind: NodeKind,
    attributes: Vec<(String, Value)>,
    children: Vec<Value>,
    shadow_root: Option<Node>,
    route_manager: Option<Arc<dyn RouteManager>>,
}

/// A DOM element or fragment.
///
/// ```
/// use axum_entrypoint::{Node, Value};
///
/// let list = Node::element("ul")
///     .attr("class", "menu")
///     .child(Node::element("li").child("Home").build())
///     .build();
/// assert_eq!(list.tag(), Some("ul"));
/// assert_eq!(list.child_nodes().count(), 1);
/// assert_eq!(list.attribute("class"), Some(&Value::from("menu")));
/// ```
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

impl Node {
    pub fn element(tag: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Element(tag.into()))
    }

    pub fn fragment() -> NodeBuilder {
        NodeBuilder::new(NodeKind::Fragment)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Tag name, `None` for fragments.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Fragment => None,
        }
    }

    pub fn attributes(&self) -> &[(String, Value)] {
        &self.0.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.0
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn children(&self) -> &[Value] {
        &self.0.children
    }

    /// Children that are themselves nodes.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.0.children.iter().filter_map(Value::as_node)
    }

    pub fn shadow_root(&self) -> Option<&Node> {
        self.0.shadow_root.as_ref()
    }

    /// The route manager of a stateful component rendered as this node.
    pub fn route_manager(&self) -> Option<&Arc<dyn RouteManager>> {
        self.0.route_manager.as_ref()
    }

    /// True when both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = match &self.0.kind {
            NodeKind::Element(tag) => f.debug_struct(tag),
            NodeKind::Fragment => f.debug_struct("#fragment"),
        };
        if !self.0.attributes.is_empty() {
            s.field("attributes", &self.0.attributes);
        }
        if !self.0.children.is_empty() {
            s.field("children", &self.0.children);
        }
        if let Some(shadow) = &self.0.shadow_root {
            s.field("shadow_root", shadow);
        }
        if let Some(manager) = &self.0.route_manager {
            s.field("route_manager", &manager.name());
        }
        s.finish()
    }
}

pub struct NodeBuilder {
    inner: NodeInner,
}

impl NodeBuilder {
    fn new(kind: NodeKind) -> Self {
        Self {
            inner: NodeInner {
                kind,
                attributes: Vec::new(),
                children: Vec::new(),
                shadow_root: None,
                route_manager: None,
            },
        }
    }

    /// Sets an attribute, replacing an earlier value with the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.inner.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.inner.attributes.push((name, value)),
        }
        self
    }

    pub fn child(mut self, value: impl Into<Value>) -> Self {
        self.inner.children.push(value.into());
        self
    }

    pub fn children<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inner.children.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn shadow_root(mut self, root: Node) -> Self {
        self.inner.shadow_root = Some(root);
        self
    }

    /// Attaches the route manager of the component rendered as this node.
    pub fn route_manager(mut self, manager: Arc<dyn RouteManager>) -> Self {
        self.inner.route_manager = Some(manager);
        self
    }

    pub fn build(self) -> Node {
        Node(Arc::new(self.inner))
    }
}
