//! Server-side preloading of rendered nodes.
//!
//! When rendering headless, components may still be finishing asynchronous
//! construction when resolution reaches them. The [`Preloader`] hook lets
//! them settle before the HTML is produced. Each node gets a bounded amount
//! of time; when it runs out an error is logged and the node is rendered
//! with whatever state it has.

use {
    crate::Node,
    async_trait::async_trait,
    futures::future::{BoxFuture, FutureExt, join_all},
    std::time::Duration,
};

#[async_trait]
pub trait Preloader: Send + Sync {
    /// Waits until `node` has settled.
    async fn preload(&self, node: &Node);
}

/// Preloads `node`, then its shadow root and children concurrently.
pub fn preload_tree<'a>(
    preloader: &'a dyn Preloader,
    node: &'a Node,
    timeout: Duration,
) -> BoxFuture<'a, ()> {
    async move {
        if tokio::time::timeout(timeout, preloader.preload(node))
            .await
            .is_err()
        {
            tracing::error!(
                tag = node.tag().unwrap_or("#fragment"),
                timeout = %humantime::format_duration(timeout),
                "Preload did not settle in time, rendering a snapshot of the available state"
            );
        }

        let subtrees = node
            .shadow_root()
            .into_iter()
            .chain(node.child_nodes())
            .map(|child| preload_tree(preloader, child, timeout));
        join_all(subtrees).await;
    }
    .boxed()
}
