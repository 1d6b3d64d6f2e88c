// Route table for the judge API

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assemble", post(handlers::assemble_program))
        .route("/compare", post(handlers::compare_output))
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
}
