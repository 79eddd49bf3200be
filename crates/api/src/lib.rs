//! # RosterDesk API
//!
//! The API crate provides the web server for the RosterDesk roster service.
//! It exposes JSON endpoints for tenant admins, employees and developers.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Check the session, lock the tenant, call into the core crate
//! - **Middleware**: Session gate and error mapping
//! - **Config**: Handle environment and application configuration
//!
//! Tenant data lives in the JSON file store from `rosterdesk-store`; every
//! handler that mutates a tenant holds that tenant's lock until its writes
//! are on disk.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Session gate and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::HeaderValue};
use eyre::Result;
use rosterdesk_store::{
    DataLayout, FileStore, HttpSheetSource, SheetSource, TenantRegistry, initialize_data_dir,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::config::ApiConfig;
use crate::middleware::{auth::SessionKeys, error_handling::AppError};

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rosterdesk_api::{ApiState, build_router, config::ApiConfig};
///
/// # async fn example() -> eyre::Result<()> {
/// let state = ApiState::new(ApiConfig::for_data_dir("data")).await?;
/// let app = build_router(Arc::new(state));
/// # Ok(())
/// # }
/// ```
pub struct ApiState {
    pub config: ApiConfig,
    /// Per-tenant JSON documents
    pub store: FileStore,
    /// `tenants.json` and `developers.json`
    pub registry: TenantRegistry,
    /// Session token signing keys
    pub sessions: SessionKeys,
    /// Where Google Sheets CSV exports are fetched from
    pub sheets: Arc<dyn SheetSource>,
}

impl ApiState {
    /// State backed by the real Google Sheets client.
    pub async fn new(config: ApiConfig) -> Result<Self> {
        let sheets = HttpSheetSource::new(Duration::from_secs(config.sheets_fetch_timeout))?;
        Self::with_sheet_source(config, Arc::new(sheets)).await
    }

    /// Initializes the data directory and opens the tenant registry.
    pub async fn with_sheet_source(config: ApiConfig, sheets: Arc<dyn SheetSource>) -> Result<Self> {
        let layout = DataLayout::new(&config.data_dir);
        initialize_data_dir(&layout).await?;
        let registry = TenantRegistry::open(layout.clone()).await?;
        let sessions = SessionKeys::new(
            &config.session_secret,
            config.session_ttl_hours,
            config.cookie_secure,
        );

        Ok(Self {
            store: FileStore::new(layout),
            registry,
            sessions,
            sheets,
            config,
        })
    }
}

/// Builds the application router with every route and layer attached.
pub fn build_router(state: Arc<ApiState>) -> Router {
    let config = state.config.clone();

    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Admin, employee and developer sign-in
        .merge(routes::auth::routes())
        // Roster tables, CSV and Google Sheets
        .merge(routes::roster::routes())
        // Team and employee management
        .merge(routes::employees::routes())
        // Shift-change and swap requests
        .merge(routes::requests::routes())
        // Tenant settings
        .merge(routes::settings::routes())
        // Employee self-service
        .merge(routes::portal::routes())
        // Developer console
        .merge(routes::developer::routes())
        // Unauthenticated tenant lookups
        .merge(routes::public::routes())
        .fallback(handlers::not_found)
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {}", origin);
                    None
                }
            })
            .collect();
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout
    app.layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
            .into_inner(),
    )
}

/// Starts the API server with the provided configuration
///
/// Sets up logging, opens the data directory, builds the router and serves
/// it until the process is stopped.
pub async fn start_server(config: ApiConfig) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let addr = config.server_addr();
    info!("Using data directory {}", config.data_dir.display());
    let state = Arc::new(ApiState::new(config).await?);
    let app = build_router(state);

    // Start the HTTP server
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Result type shared by every handler.
pub type ApiResult<T> = std::result::Result<T, AppError>;
