//! Routing errors.

use crate::request::Method;

/// Errors that can occur while routing a request.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// No route matches the path.
    #[error("no route for {path}")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// A route matches the path but not the method.
    #[error("{method} not allowed for {path}")]
    MethodNotAllowed {
        /// The requested method.
        method: Method,
        /// The requested path.
        path: String,
    },
}
