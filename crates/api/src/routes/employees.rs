use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/teams", post(handlers::employees::save_team))
        .route("/api/teams/:name", delete(handlers::employees::delete_team))
        .route("/api/employees", post(handlers::employees::save_employee))
        .route(
            "/api/employees/deactivate",
            post(handlers::employees::deactivate_employee),
        )
        .route(
            "/api/employees/reactivate",
            post(handlers::employees::reactivate_employee),
        )
        .route(
            "/api/employees/password",
            post(handlers::employees::set_employee_password),
        )
        .route(
            "/api/employees/:id/profile",
            get(handlers::employees::get_employee_profile),
        )
}
