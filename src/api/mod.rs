//! HTTP API.
//!
//! JSON endpoints under `/api/` plus the uploaded images under
//! `/static/uploads/`. `api_router()` returns a composable `Router`;
//! `server` owns the listener lifecycle.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
