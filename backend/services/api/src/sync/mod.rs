pub mod handlers;
pub mod responses;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sync/full", post(handlers::request_full_sync))
        .route("/api/sync/status", get(handlers::get_sync_status))
}
