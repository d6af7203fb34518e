//! Entrypoints and their resolution.
//!
//! The functionality is split across submodules:
//!
//! - [`render_method`] - `RenderMethod`, `RenderPreset`, `HttpStatus` and the `render_*` helpers
//! - [`model`] - The `Entrypoint` union, its traits and `RouteMap`
//! - [`matcher`] - Route-map key patterns and best-match selection
//! - [`resolver`] - The resolution engine (`Resolver`)
//! - [`proxy`] - Entrypoint proxies, the backend proxy and `refetch_route`

mod matcher;
mod model;
mod proxy;
mod render_method;
mod resolver;

pub use matcher::*;
pub use model::*;
pub use proxy::*;
pub use render_method::*;
pub use resolver::*;

#[cfg(test)]
mod tests;
