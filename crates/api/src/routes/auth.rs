use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/login", post(handlers::auth::admin_login))
        .route("/api/employee/login", post(handlers::auth::employee_login))
        .route("/api/developer/login", post(handlers::auth::developer_login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/me", get(handlers::auth::me))
}
