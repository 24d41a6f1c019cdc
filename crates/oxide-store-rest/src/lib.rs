//! # oxide-store-rest
//!
//! A thin REST facade over [`oxide_store_core`].
//!
//! This crate is transport-agnostic: it provides its own
//! [`Request`]/[`Response`] types and a [`Router`] over a fixed route table,
//! and the daemon bridges a real HTTP server onto them. Handlers translate
//! JSON request bodies into store commands and map results back:
//!
//! - success is 200 with `{"message": ...}` or a result array,
//! - any domain error is 409 with the error's stable message,
//! - internal failures are 500, unparseable bodies 400.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use oxide_store_core::Database;
//! use oxide_store_rest::{api_router, Request};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! # let dir = tempfile::tempdir().unwrap();
//! let db = Database::new(dir.path().join(".dump.json"), Duration::from_secs(60)).unwrap();
//! let router = api_router(Arc::clone(&db));
//!
//! let response = router
//!     .handle(Request::post("/tables").json_body(&serde_json::json!({
//!         "name": "frog",
//!         "schema": {"leg_length": "real"},
//!     })))
//!     .await;
//! assert_eq!(response.status, 200);
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod router;

pub use error::RouterError;
pub use handlers::api_router;
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::{Handler, PathPattern, Route, Router};
