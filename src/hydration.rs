//! Live-node detection for partial hydration.
//!
//! After server rendering, only nodes that hold a live reference need to be
//! re-established on the client. [`get_live_nodes`] walks a rendered tree and
//! returns exactly those nodes, in post-order.
//!
//! A node and one of its descendants can both appear in the result when both
//! are independently live. Consumers rely on the flat list, so containment is
//! not used to deduplicate.

use {
    crate::{Node, PointerId, Value},
    dashmap::DashMap,
    std::sync::atomic::{AtomicU64, Ordering},
};

/// Content/attribute decomposition of a node, as produced by a reactive
/// runtime's serializer.
#[derive(Debug, Clone, Default)]
pub struct SerializedNode {
    pub content: Vec<Value>,
    pub attributes: Vec<(String, Value)>,
}

/// The reactive-object system as seen by this crate: a serializer for nodes
/// and a liveness query. It is only ever queried, never written to, during
/// resolution and hydration analysis.
pub trait ReactiveRuntime: Send + Sync {
    fn serialize(&self, node: &Node) -> SerializedNode {
        SerializedNode {
            content: node.children().to_vec(),
            attributes: node.attributes().to_vec(),
        }
    }

    /// Returns the current value of `value` if it is a live reference.
    fn resolve_live(&self, value: &Value) -> Option<Value>;
}

/// A process-local registry of live references.
///
/// Each server instance owns its own registry; there is no global one.
#[derive(Debug, Default)]
pub struct PointerRegistry {
    pointers: DashMap<PointerId, Value>,
    next_id: AtomicU64,
}

impl PointerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value and returns the pointer that refers to it.
    pub fn create(&self, value: impl Into<Value>) -> PointerId {
        let id = PointerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.pointers.insert(id, value.into());
        id
    }

    /// Updates a pointer's value. Returns false if the pointer is unknown.
    pub fn set(&self, id: PointerId, value: impl Into<Value>) -> bool {
        match self.pointers.get_mut(&id) {
            Some(mut slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: PointerId) -> Option<Value> {
        self.pointers.get(&id).map(|v| v.value().clone())
    }

    pub fn remove(&self, id: PointerId) -> Option<Value> {
        self.pointers.remove(&id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}

impl ReactiveRuntime for PointerRegistry {
    fn resolve_live(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Pointer(id) => self.get(*id),
            _ => None,
        }
    }
}

/// Returns every node below (and including) `root` that holds a live
/// reference in its content or attributes.
///
/// Child nodes are always searched, whether or not their parent is live.
///
/// With `include_event_listeners`, an attribute holding an event listener
/// makes its node live on its own, without any live reference on the node.
/// The flag only ever adds listener-bearing nodes to the result; it never
/// filters out nodes that are live through a reference. Nodes are returned
/// deepest first, each at most once.
pub fn get_live_nodes(
    runtime: &dyn ReactiveRuntime,
    root: &Node,
    include_event_listeners: bool,
) -> Vec<Node> {
    let mut found = Vec::new();
    collect_live_nodes(runtime, root, include_event_listeners, &mut found);
    found
}

fn collect_live_nodes(
    runtime: &dyn ReactiveRuntime,
    node: &Node,
    include_event_listeners: bool,
    found: &mut Vec<Node>,
) {
    let serialized = runtime.serialize(node);
    let mut live = false;

    for value in &serialized.content {
        match value {
            Value::Node(child) => {
                collect_live_nodes(runtime, child, include_event_listeners, found)
            }
            other if !live => live = runtime.resolve_live(other).is_some(),
            _ => {}
        }
    }

    if !live {
        live = serialized.attributes.iter().any(|(_, value)| {
            if value.is_listener() {
                include_event_listeners
            } else {
                runtime.resolve_live(value).is_some()
            }
        });
    }

    if live {
        tracing::trace!(tag = node.tag().unwrap_or("#fragment"), "Live node");
        found.push(node.clone());
    }
}
