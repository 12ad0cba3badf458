//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! JSON routes are nested under `/api/`; uploaded images are served
//! straight from the upload directory.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::types::{ApiContext, UPLOAD_URL_PREFIX};
use crate::core_state::CoreState;

/// Build the application router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let upload_dir = core.config.upload_dir.clone();
    let body_limit = core.config.max_upload_bytes;
    let ctx = ApiContext::new(core);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/upload", post(endpoints::upload::upload))
        .route("/get_treatment", post(endpoints::treatment::get_treatment))
        .route("/results", get(endpoints::results::list))
        .route("/result/:id", get(endpoints::results::detail))
        .route("/chat", post(endpoints::chat::send))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .nest_service(&format!("/{UPLOAD_URL_PREFIX}"), ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
}
