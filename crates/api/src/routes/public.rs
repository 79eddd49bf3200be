use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/public/signup", post(handlers::public::signup))
        .route("/api/public/tenants/:slug", get(handlers::public::tenant_info))
}
