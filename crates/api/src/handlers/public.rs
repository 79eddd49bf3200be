use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use rosterdesk_core::{
    errors::RosterError,
    models::tenant::{CreateTenantRequest, SignupRequest, Tenant, TenantInfo},
};
use serde::Serialize;
use tracing::info;

use crate::{ApiResult, ApiState};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub tenant: Tenant,
}

/// Branding for a tenant's login page. Inactive tenants are not found.
#[axum::debug_handler]
pub async fn tenant_info(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<TenantInfo>> {
    let tenant = state
        .registry
        .find_by_slug(&slug)
        .await
        .filter(|t| t.is_active)
        .ok_or_else(|| RosterError::not_found(format!("Tenant {}", slug)))?;
    Ok(Json(TenantInfo::from(&tenant)))
}

/// Self-service organization signup. The subscription starts out pending
/// and the first admin account is added from the developer console.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<SignupResponse>> {
    let Json(payload) = payload?;
    let (Some(plan), false, false) = (
        payload.plan,
        payload.name.trim().is_empty(),
        payload.slug.trim().is_empty(),
    ) else {
        return Err(
            RosterError::validation("name, slug and plan (monthly|yearly) are required").into(),
        );
    };

    let slug: String = payload
        .slug
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let tenant = state
        .registry
        .create(
            CreateTenantRequest {
                name: payload.name,
                slug,
                max_users: None,
                max_employees: None,
                plan: Some(plan),
                contact_email: payload.contact_email,
                contact_phone: payload.contact_phone,
            },
            Utc::now(),
        )
        .await?;

    info!("Signup created tenant {} ({})", tenant.slug, tenant.id);
    Ok(Json(SignupResponse {
        success: true,
        tenant,
    }))
}
