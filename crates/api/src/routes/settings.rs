use axum::{
    Router,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/settings/shift-definitions",
            get(handlers::settings::get_shift_definitions)
                .post(handlers::settings::upsert_shift_definition)
                .put(handlers::settings::replace_shift_definitions),
        )
        .route(
            "/api/settings/shift-definitions/:code",
            delete(handlers::settings::delete_shift_definition),
        )
        .route(
            "/api/settings/auto-sync",
            get(handlers::settings::get_auto_sync).post(handlers::settings::set_auto_sync),
        )
        .route(
            "/api/settings/google-links",
            get(handlers::settings::get_google_links).post(handlers::settings::add_google_link),
        )
        .route(
            "/api/settings/google-links/:month_year",
            delete(handlers::settings::delete_google_link),
        )
        .route(
            "/api/settings/organization",
            get(handlers::settings::get_organization).post(handlers::settings::set_organization),
        )
        .route(
            "/api/settings/modified-shifts",
            get(handlers::settings::modified_shifts),
        )
}
