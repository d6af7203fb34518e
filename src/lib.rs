//! # axum-entrypoint
//!
//! Turns a route and a declarative, recursive [`Entrypoint`] into rendered
//! content plus a decision on how much of the rendering happens on the server
//! and how much on the client (the [`RenderMethod`]).
//!
//! # Quick Start
//!
//! ```rust
//! use axum_entrypoint::{
//!     Config, ContextSource, Entrypoint, Error, RenderMethod, Resolver, Result, RouteMap,
//!     render_hybrid, render_static,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default();
//!     config.setup_tracing();
//!
//!     let docs = Entrypoint::handler(|route, _cx| async move {
//!         Ok::<Entrypoint, Error>(format!("Docs page {route}").into())
//!     });
//!     let site: Entrypoint = RouteMap::new()
//!         .route("/", render_hybrid("Home"))?
//!         .route("/docs/*", render_static(docs))?
//!         .into();
//!
//!     let resolver = Resolver::from_config(&config)?;
//!     let resolved = resolver
//!         .resolve_entrypoint_route(&site, "/docs/intro".parse()?, ContextSource::Default, false)
//!         .await?;
//!
//!     assert_eq!(resolved.render_method, RenderMethod::Static);
//!     assert_eq!(resolved.content.unwrap().as_text(), Some("Docs page /intro"));
//!     Ok(())
//! }
//! ```
//!
//! # Entrypoints
//!
//! | Variant | Resolves to |
//! |---------|-------------|
//! | `Leaf` | The value itself (node, text, number, markdown, raw payload) |
//! | `Generator` | Whatever the generator returns for `(context, params)` |
//! | `Preset` | Its content, with the preset's render method |
//! | `Status` | Its content, with an HTTP status code |
//! | `RouteMap` | The entry whose key best matches the route |
//! | `RouteHandler` | Whatever `get_route(route, context)` returns |
//! | `RouteManager` | Itself, after it navigated to the remaining route |
//!
//! When presets nest, the outermost one decides the render method.
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Configuration loading and validation ([`Config`]) |
//! | `entrypoint` | Entrypoint model and the [`Resolver`] |
//! | `route` / `context` | [`Route`] values and the per-request [`Context`] |
//! | `dom` / `hydration` | Rendered [`Node`]s and live-node detection ([`get_live_nodes`]) |
//! | `preload` | The headless [`Preloader`] hook |
//! | `error` | Error types and handling ([`Error`]) |
//!
//! # Configuration
//!
//! ```toml
//! [render]
//! headless = true
//! route_manager_timeout = "5s"
//! preload_timeout = "5s"
//! base_origin = "{{ PUBLIC_ORIGIN }}"
//!
//! [logging]
//! format = "json"
//! ```
mod config;
mod context;
mod dom;
mod entrypoint;
mod error;
mod hydration;
mod preload;
mod route;

pub use config::*;
pub use context::*;
pub use dom::*;
pub use entrypoint::*;
pub use error::*;
pub use hydration::*;
pub use preload::*;
pub use route::*;

pub type Result<T> = std::result::Result<T, Error>;
