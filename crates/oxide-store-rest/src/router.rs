//! Method-and-path routing over a fixed route table.
//!
//! Patterns are matched segment by segment; a `{name}` segment captures one
//! path component. The API surface is a small fixed table, so there is no
//! middleware chain and no wildcard support.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::RouterError;
use crate::request::{Method, PathParams, Request};
use crate::response::Response;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A segment in a path pattern.
#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path pattern, e.g. `/tables/{name}/rows`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern string.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .map_or_else(
                        || Segment::Literal(part.to_string()),
                        |name| Segment::Param(name.to_string()),
                    )
            })
            .collect();
        Self { segments }
    }

    /// Attempts to match a path, returning captured parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => params.insert(name.clone(), part),
            }
        }
        Some(params)
    }
}

/// A single route definition.
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

/// Dispatches requests to handlers by method and path.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    #[must_use]
    pub fn route<F, Fut>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: PathPattern::new(pattern),
            handler: Arc::new(move |req| Box::pin(handler(req))),
        });
        self
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get<F, Fut>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Get, pattern, handler)
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post<F, Fut>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, pattern, handler)
    }

    /// Adds a PATCH route.
    #[must_use]
    pub fn patch<F, Fut>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Patch, pattern, handler)
    }

    /// Adds a DELETE route.
    #[must_use]
    pub fn delete<F, Fut>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Delete, pattern, handler)
    }

    /// Handles a request, mapping routing failures to 404/405.
    pub async fn handle(&self, mut request: Request) -> Response {
        match self.find_route(&request) {
            Ok((route, params)) => {
                request.params = params;
                (route.handler)(request).await
            }
            Err(RouterError::MethodNotAllowed { .. }) => Response::method_not_allowed(),
            Err(RouterError::NotFound { .. }) => Response::not_found(),
        }
    }

    /// Finds the route matching a request.
    fn find_route(&self, request: &Request) -> Result<(&Route, PathParams), RouterError> {
        let mut path_matched = false;
        for route in &self.routes {
            if let Some(params) = route.pattern.match_path(&request.path) {
                if route.method == request.method {
                    return Ok((route, params));
                }
                path_matched = true;
            }
        }
        if path_matched {
            Err(RouterError::MethodNotAllowed {
                method: request.method,
                path: request.path.clone(),
            })
        } else {
            Err(RouterError::NotFound {
                path: request.path.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        let pattern = PathPattern::new("/tables/{name}/rows");
        let params = pattern.match_path("/tables/frog/rows").unwrap();
        assert_eq!(params.get("name"), Some("frog"));

        assert!(pattern.match_path("/tables/frog").is_none());
        assert!(pattern.match_path("/tables/frog/rows/extra").is_none());
        assert!(pattern.match_path("/ponds/frog/rows").is_none());
    }

    #[tokio::test]
    async fn dispatches_by_method_and_path() {
        let router = Router::new()
            .get("/schema", |_| async { Response::message(200, "schema") })
            .post("/tables", |_| async { Response::message(200, "created") });

        let response = router.handle(Request::get("/schema")).await;
        assert_eq!(response.status, 200);

        let response = router.handle(Request::get("/missing")).await;
        assert_eq!(response.status, 404);

        let response = router.handle(Request::delete("/tables")).await;
        assert_eq!(response.status, 405);
    }
}
