use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/roster/display", get(handlers::roster::get_display))
        .route("/api/roster/admin", get(handlers::roster::get_admin))
        .route("/api/roster/google", get(handlers::roster::get_google))
        .route("/api/roster/shift", post(handlers::roster::update_shift))
        .route("/api/roster/upload-csv", post(handlers::roster::upload_csv))
        .route("/api/roster/export-csv", get(handlers::roster::export))
        .route(
            "/api/roster/sync-google-sheets",
            post(handlers::roster::sync_google_sheets),
        )
        .route("/api/roster/sync-to-admin", post(handlers::roster::sync_to_admin))
        .route(
            "/api/roster/reset-admin",
            post(handlers::roster::reset_admin_to_google),
        )
        .route("/api/roster/hard-reset", post(handlers::roster::hard_reset))
}
