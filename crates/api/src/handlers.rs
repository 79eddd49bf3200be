pub mod auth;
pub mod developer;
pub mod employees;
pub mod portal;
pub mod public;
pub mod requests;
pub mod roster;
pub mod settings;

use axum::response::Response;
use rosterdesk_core::errors::RosterError;
use serde::Serialize;

use crate::middleware::error_handling::map_error;

/// Plain acknowledgement returned by mutations with nothing else to report.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Fallback for unknown routes, answered with the shared error body.
pub async fn not_found() -> Response {
    map_error(RosterError::not_found("Route"))
}
