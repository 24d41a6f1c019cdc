//! HTTP response type.

use std::collections::HashMap;

use oxide_store_core::StoreError;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 response with JSON content.
    #[must_use]
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self {
                status: 200,
                headers: [("Content-Type".to_string(), "application/json".to_string())]
                    .into_iter()
                    .collect(),
                body,
            },
            Err(_) => Self::message(500, "response encoding failed"),
        }
    }

    /// Creates a `{"message": ...}` JSON response with the given status.
    #[must_use]
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let body = serde_json::json!({ "message": message });
        Self {
            status,
            headers: [("Content-Type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: body.to_string().into_bytes(),
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::message(400, message)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found() -> Self {
        Self::message(404, "not found")
    }

    /// Creates a 405 Method Not Allowed response.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::message(405, "method not allowed")
    }

    /// Maps a store error to its HTTP form.
    ///
    /// Domain errors are conflicts (409); internal failures are 500. The
    /// error's display string is forwarded verbatim as the message.
    #[must_use]
    pub fn store_error(error: &StoreError) -> Self {
        let status = if error.is_internal() { 500 } else { 409 };
        Self::message(status, error.to_string())
    }

    /// Returns the body as a string.
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}
