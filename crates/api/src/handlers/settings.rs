use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
};
use rosterdesk_core::{
    errors::RosterError,
    models::{
        modification::ModifiedShiftsData,
        settings::{
            AutoSyncRequest, GoogleLinkRequest, GoogleLinks, OrganizationNameRequest,
            ReplaceShiftDefinitionsRequest, ShiftDefinitionRequest,
        },
    },
};
use serde::Serialize;
use tracing::info;

use crate::{ApiResult, ApiState, middleware::auth::require_admin};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDefinitionsResponse {
    pub success: bool,
    pub shift_definitions: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct AutoSyncResponse {
    pub success: bool,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct GoogleLinksResponse {
    pub success: bool,
    pub links: GoogleLinks,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub success: bool,
    pub organization_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedShiftsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub data: ModifiedShiftsData,
}

fn shift_code(code: &str) -> Result<String, RosterError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(RosterError::validation("Shift code is required"));
    }
    Ok(code)
}

#[axum::debug_handler]
pub async fn get_shift_definitions(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ShiftDefinitionsResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(ShiftDefinitionsResponse {
        success: true,
        shift_definitions: docs.settings().shift_definitions(),
    }))
}

/// Adds or replaces one shift code. Codes are stored uppercased.
#[axum::debug_handler]
pub async fn upsert_shift_definition(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<ShiftDefinitionRequest>, JsonRejection>,
) -> ApiResult<Json<ShiftDefinitionsResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let code = shift_code(&payload.code)?;
    let description = payload.description.trim();
    if description.is_empty() {
        return Err(RosterError::validation("Shift description is required").into());
    }

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.settings_mut().upsert_shift_definition(&code, description);
    docs.save_settings().await?;

    info!("Tenant {}: shift {} set to {:?}", session.tenant.slug, code, description);
    Ok(Json(ShiftDefinitionsResponse {
        success: true,
        shift_definitions: docs.settings().shift_definitions(),
    }))
}

#[axum::debug_handler]
pub async fn delete_shift_definition(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> ApiResult<Json<ShiftDefinitionsResponse>> {
    let session = require_admin(&state, &headers).await?;
    let code = shift_code(&code)?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    if !docs.settings_mut().remove_shift_definition(&code) {
        return Err(RosterError::not_found(format!("Shift code {}", code)).into());
    }
    docs.save_settings().await?;

    info!("Tenant {}: shift {} removed", session.tenant.slug, code);
    Ok(Json(ShiftDefinitionsResponse {
        success: true,
        shift_definitions: docs.settings().shift_definitions(),
    }))
}

/// Replaces the whole code table. An empty table restores the defaults.
#[axum::debug_handler]
pub async fn replace_shift_definitions(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<ReplaceShiftDefinitionsRequest>, JsonRejection>,
) -> ApiResult<Json<ShiftDefinitionsResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let definitions = payload
        .shift_definitions
        .into_iter()
        .map(|(code, description)| Ok((shift_code(&code)?, description.trim().to_string())))
        .collect::<Result<BTreeMap<_, _>, RosterError>>()?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.settings_mut().shift_definitions = (!definitions.is_empty()).then_some(definitions);
    docs.save_settings().await?;

    Ok(Json(ShiftDefinitionsResponse {
        success: true,
        shift_definitions: docs.settings().shift_definitions(),
    }))
}

#[axum::debug_handler]
pub async fn get_auto_sync(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<AutoSyncResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(AutoSyncResponse {
        success: true,
        enabled: docs.settings().auto_sync_enabled,
    }))
}

#[axum::debug_handler]
pub async fn set_auto_sync(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<AutoSyncRequest>, JsonRejection>,
) -> ApiResult<Json<AutoSyncResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.settings_mut().auto_sync_enabled = payload.enabled;
    docs.save_settings().await?;

    Ok(Json(AutoSyncResponse {
        success: true,
        enabled: payload.enabled,
    }))
}

#[axum::debug_handler]
pub async fn get_google_links(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<GoogleLinksResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(GoogleLinksResponse {
        success: true,
        links: docs.google_links().clone(),
    }))
}

/// Stores the sheet link for a month, replacing any previous one.
#[axum::debug_handler]
pub async fn add_google_link(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<GoogleLinkRequest>, JsonRejection>,
) -> ApiResult<Json<GoogleLinksResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let month_year = payload.month_year.trim().to_string();
    if month_year.is_empty() {
        return Err(RosterError::validation("Month is required").into());
    }
    let link = payload
        .link
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| RosterError::validation("Sheet link is required"))?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.google_links_mut().insert(month_year.clone(), link);
    docs.save_google_links().await?;

    info!("Tenant {}: sheet link set for {}", session.tenant.slug, month_year);
    Ok(Json(GoogleLinksResponse {
        success: true,
        links: docs.google_links().clone(),
    }))
}

#[axum::debug_handler]
pub async fn delete_google_link(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(month_year): Path<String>,
) -> ApiResult<Json<GoogleLinksResponse>> {
    let session = require_admin(&state, &headers).await?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    if docs.google_links_mut().remove(month_year.trim()).is_none() {
        return Err(RosterError::not_found(format!("Sheet link for {}", month_year)).into());
    }
    docs.save_google_links().await?;

    Ok(Json(GoogleLinksResponse {
        success: true,
        links: docs.google_links().clone(),
    }))
}

#[axum::debug_handler]
pub async fn get_organization(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<OrganizationResponse>> {
    let session = require_admin(&state, &headers).await?;
    Ok(Json(OrganizationResponse {
        success: true,
        organization_name: session.tenant.display_name().to_string(),
    }))
}

#[axum::debug_handler]
pub async fn set_organization(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<OrganizationNameRequest>, JsonRejection>,
) -> ApiResult<Json<OrganizationResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;

    let tenant = state
        .registry
        .set_organization_name(&session.tenant.id, &payload.organization_name)
        .await?;

    info!("Tenant {}: organization renamed to {}", tenant.slug, tenant.display_name());
    Ok(Json(OrganizationResponse {
        success: true,
        organization_name: tenant.display_name().to_string(),
    }))
}

/// The modification log with its per-month statistics.
#[axum::debug_handler]
pub async fn modified_shifts(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ModifiedShiftsResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(ModifiedShiftsResponse {
        success: true,
        data: docs.modified_shifts().clone(),
    }))
}
