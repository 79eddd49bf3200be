use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/developer/tenants",
            get(handlers::developer::list_tenants).post(handlers::developer::create_tenant),
        )
        .route(
            "/api/developer/tenants/:id",
            put(handlers::developer::update_tenant),
        )
        .route(
            "/api/developer/tenants/:id/deactivate",
            post(handlers::developer::deactivate_tenant),
        )
        .route(
            "/api/developer/tenants/:id/activate",
            post(handlers::developer::activate_tenant),
        )
        .route(
            "/api/developer/tenants/:id/admins",
            get(handlers::developer::list_admin_users).post(handlers::developer::create_admin_user),
        )
        .route(
            "/api/developer/tenants/:id/summary",
            get(handlers::developer::tenant_summary),
        )
        .route(
            "/api/developer/tenants/:id/subscription/activate",
            post(handlers::developer::activate_subscription),
        )
        .route(
            "/api/developer/tenants/:id/reset",
            post(handlers::developer::reset_tenant),
        )
        .route(
            "/api/developer/tenants/:id/export",
            get(handlers::developer::export_tenant),
        )
}
