//! Error types and handling for entrypoint resolution.
//!
//! This module provides structured errors with stable error codes and an
//! HTTP status code mapping. Resolution itself never turns an error into
//! content: errors raised by generators, route handlers or route managers
//! propagate unchanged to the caller, and it is up to the HTTP layer to
//! turn them into a response. `Error` implements `IntoResponse` for that.
//!
//! # Design
//!
//! This module uses an opaque `Error` struct paired with an `ErrorKind` enum,
//! following the `std::io::Error` pattern. Application code creates its own
//! errors through the same constructors, so a failing generator looks the same
//! to the caller whether it came from this crate or from user code.
//!
//! # Example
//!
//! ```rust
//! use axum_entrypoint::{Error, ErrorKind};
//! use std::time::Duration;
//!
//! let error = Error::route_manager_deadlock("Navbar", Duration::from_secs(5));
//!
//! match error.kind() {
//!     ErrorKind::RouteManagerDeadlock => println!("deadlock: {}", error),
//!     ErrorKind::Generator => println!("generator failed: {}", error),
//!     _ => println!("other error: {}", error),
//! }
//!
//! use axum::http::StatusCode;
//! assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::{fmt, time::Duration};
use thiserror::Error;

/// The kind of error that occurred.
///
/// This enum categorizes errors for matching purposes. Use `Error::kind()`
/// to get the kind of an error.
///
/// # Stability
///
/// This enum is marked `#[non_exhaustive]`, so new variants may be added
/// in future versions without breaking existing code. Always include a
/// wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration error (invalid TOML, missing collaborator, bad values).
    #[error("configuration error")]
    Configuration,

    /// A route or route pattern could not be parsed.
    #[error("invalid route")]
    InvalidRoute,

    /// A generator entrypoint failed.
    #[error("generator error")]
    Generator,

    /// A route handler failed while producing a child entrypoint.
    #[error("route handler error")]
    RouteHandler,

    /// A route manager rejected while resolving its internal route.
    #[error("route manager error")]
    RouteManager,

    /// A route manager did not settle within the configured timeout.
    #[error("route manager deadlock")]
    RouteManagerDeadlock,

    /// I/O error (file operations).
    #[error("I/O error")]
    Io,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// An error that can occur while resolving entrypoints.
///
/// This is an opaque error type that wraps an underlying error source.
/// Use [`Error::kind()`] to determine the category of error for matching,
/// and the `Display` implementation to get a human-readable message.
///
/// # Creating Errors
///
/// ```rust
/// use axum_entrypoint::Error;
///
/// let err = Error::generator("user lookup failed");
/// let err = Error::invalid_route("unbalanced pattern group");
/// let err = Error::config("route_manager_timeout must be greater than zero");
/// ```
///
/// Or use [`Error::new()`] for full control:
///
/// ```rust
/// use axum_entrypoint::{Error, ErrorKind};
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
/// let err = Error::new(ErrorKind::Io, io_err);
/// ```
pub struct Error {
    kind: ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Creates a new error with the given kind and source.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error code string for this error.
    ///
    /// This is a stable identifier suitable for client-side error handling.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Configuration => "CONFIG_ERROR",
            ErrorKind::InvalidRoute => "INVALID_ROUTE",
            ErrorKind::Generator => "GENERATOR_ERROR",
            ErrorKind::RouteHandler => "ROUTE_HANDLER_ERROR",
            ErrorKind::RouteManager => "ROUTE_MANAGER_ERROR",
            ErrorKind::RouteManagerDeadlock => "ROUTE_MANAGER_DEADLOCK",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::InvalidRoute => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into a structured error response.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string())
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates an invalid route error.
    pub fn invalid_route(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRoute, msg.into())
    }

    /// Creates a generator error. Intended for application generators.
    pub fn generator(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generator, msg.into())
    }

    /// Creates a route handler error. Intended for application route handlers.
    pub fn route_handler(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RouteHandler, msg.into())
    }

    /// Creates a route manager error. Intended for application route managers.
    pub fn route_manager(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RouteManager, msg.into())
    }

    /// Creates the error raised when a route manager does not settle in time.
    ///
    /// The message names the manager so self-inflicted hangs in application
    /// navigation code can be traced back to their source.
    pub fn route_manager_deadlock(manager: impl AsRef<str>, timeout: Duration) -> Self {
        Self::new(
            ErrorKind::RouteManagerDeadlock,
            format!(
                "Route manager ({}) did not resolve after {}. There is probably a deadlock \
                 somewhere, for example a route handler awaiting its own rendering.",
                manager.as_ref(),
                humantime::format_duration(timeout),
            ),
        )
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = self.to_error_response();

        tracing::error!(
            error_code = %error_response.error_code,
            message = %error_response.message,
            status = %status.as_u16(),
            "Entrypoint resolution failed"
        );

        (status, Json(error_response)).into_response()
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::new(ErrorKind::InvalidRoute, err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::new(ErrorKind::InvalidRoute, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

// ============================================================================
// ErrorResponse
// ============================================================================

/// Structured error response with an error code and a message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Unique error code for client-side error handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
