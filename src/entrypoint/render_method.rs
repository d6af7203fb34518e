use {
    crate::Entrypoint,
    axum::http::StatusCode,
    serde::{Deserialize, Serialize},
    std::{fmt, sync::Arc},
};

/// How the work of rendering a route is split between server and client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMethod {
    /// Server pre-renders; the client hydrates live references and has the
    /// full runtime available.
    #[default]
    Hybrid,
    /// Server renders HTML; only serializable reactive bindings hydrate and
    /// no client runtime is shipped.
    Backend,
    /// HTML only, no client-side reactivity.
    Static,
    /// No server pre-render. The client fetches and renders everything.
    Dynamic,
    /// The content is an opaque payload served verbatim.
    Raw,
}

impl RenderMethod {
    /// Whether content rendered this way may cross the reactive-object
    /// protocol as a live remote reference.
    pub fn is_transmissible(self) -> bool {
        !matches!(self, RenderMethod::Backend | RenderMethod::Static)
    }

    /// Whether the live-node detector must run before transmission.
    pub fn needs_hydration(self) -> bool {
        matches!(self, RenderMethod::Hybrid | RenderMethod::Backend)
    }

    /// Whether the server renders HTML for this method.
    pub fn prerenders(self) -> bool {
        !matches!(self, RenderMethod::Dynamic | RenderMethod::Raw)
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderMethod::Hybrid => "hybrid",
            RenderMethod::Backend => "backend",
            RenderMethod::Static => "static",
            RenderMethod::Dynamic => "dynamic",
            RenderMethod::Raw => "raw",
        })
    }
}

/// A render method paired with the entrypoint it applies to.
///
/// When presets nest, the outermost one decides the method of the resolved
/// result. Inner presets only matter when no outer preset exists.
#[derive(Debug, Clone)]
pub struct RenderPreset {
    method: RenderMethod,
    content: Entrypoint,
    status_code: Option<StatusCode>,
}

impl RenderPreset {
    pub fn new(method: RenderMethod, content: impl Into<Entrypoint>) -> Self {
        Self {
            method,
            content: content.into(),
            status_code: None,
        }
    }

    /// Sets the status code applied after the inner content resolves.
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn method(&self) -> RenderMethod {
        self.method
    }

    pub fn content(&self) -> &Entrypoint {
        &self.content
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status_code
    }

    /// `Backend` and `Static` presets must never leak as live remote
    /// references. This is a flag for the serialization boundary and does
    /// not change the content.
    pub fn is_transmissible(&self) -> bool {
        self.method.is_transmissible()
    }
}

/// Sets an HTTP status on whatever its content resolves to.
#[derive(Debug, Clone)]
pub struct HttpStatus {
    code: StatusCode,
    content: Entrypoint,
}

impl HttpStatus {
    pub fn new(code: StatusCode, content: impl Into<Entrypoint>) -> Self {
        Self {
            code,
            content: content.into(),
        }
    }

    pub fn not_found(content: impl Into<Entrypoint>) -> Self {
        Self::new(StatusCode::NOT_FOUND, content)
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn content(&self) -> &Entrypoint {
        &self.content
    }
}

fn preset(method: RenderMethod, content: impl Into<Entrypoint>) -> Entrypoint {
    Entrypoint::Preset(Arc::new(RenderPreset::new(method, content)))
}

/// Server pre-render with full client hydration.
pub fn render_hybrid(content: impl Into<Entrypoint>) -> Entrypoint {
    preset(RenderMethod::Hybrid, content)
}

/// Server-rendered HTML with JSON-only hydration.
pub fn render_backend(content: impl Into<Entrypoint>) -> Entrypoint {
    preset(RenderMethod::Backend, content)
}

/// Static HTML, no client reactivity.
pub fn render_static(content: impl Into<Entrypoint>) -> Entrypoint {
    preset(RenderMethod::Static, content)
}

/// Client-only rendering.
pub fn render_dynamic(content: impl Into<Entrypoint>) -> Entrypoint {
    preset(RenderMethod::Dynamic, content)
}

/// Served verbatim.
pub fn render_raw(content: impl Into<Entrypoint>) -> Entrypoint {
    preset(RenderMethod::Raw, content)
}
