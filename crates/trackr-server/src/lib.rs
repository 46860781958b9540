//! HTTP API for trackr issue tracking.
//!
//! Exposes project-scoped issue collections over REST:
//!
//! - `GET /api/issues/{project}` - list issues, query parameters filter
//! - `POST /api/issues/{project}` - create an issue
//! - `PUT /api/issues/{project}` - update fields of an issue by `_id`
//! - `DELETE /api/issues/{project}` - delete an issue by `_id`
//! - `GET /health` and `GET /ready` - liveness and readiness probes
//!
//! Request bodies may be JSON objects or urlencoded forms.

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod server;

pub use config::{Args, ServerConfig};
pub use context::StoreHandle;
pub use error::{ApiError, Error, Result};
pub use server::{router, run};

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "trackr=info,trackr_server=info,tower_http=info";
