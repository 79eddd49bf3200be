use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/portal/schedule", get(handlers::portal::my_schedule))
        .route("/api/portal/requests", get(handlers::portal::my_requests))
        .route(
            "/api/portal/notifications",
            get(handlers::portal::my_notifications),
        )
        .route(
            "/api/portal/notifications/read",
            post(handlers::portal::mark_notifications_read),
        )
        .route("/api/portal/password", post(handlers::portal::change_password))
        .route(
            "/api/portal/profile",
            get(handlers::portal::get_profile).put(handlers::portal::update_profile),
        )
}
