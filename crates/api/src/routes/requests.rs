use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/requests", get(handlers::requests::list_all))
        .route("/api/requests/pending", get(handlers::requests::list_pending))
        .route(
            "/api/requests/employee/:id",
            get(handlers::requests::list_for_employee),
        )
        .route(
            "/api/requests/shift-change",
            post(handlers::requests::submit_shift_change),
        )
        .route("/api/requests/swap", post(handlers::requests::submit_swap))
        .route("/api/requests/status", post(handlers::requests::update_status))
}
