//! Developer console: tenant provisioning, admin accounts, subscriptions,
//! data reset and export.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, header},
};
use chrono::{DateTime, Utc};
use rosterdesk_core::{
    errors::RosterError,
    models::{
        modification::ModifiedShiftRecord,
        request::{ShiftChangeRequest, SwapRequest},
        roster::Employee,
        tenant::{
            AdminUser, AdminUserResponse, CreateAdminUserRequest, CreateTenantRequest, Tenant,
            TenantSummary, UpdateTenantRequest,
        },
    },
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    ApiResult, ApiState,
    handlers::{Ack, employees::validate_password},
    middleware::auth::{hash_password, require_developer},
};

#[derive(Debug, Serialize)]
pub struct TenantsResponse {
    pub success: bool,
    pub tenants: Vec<Tenant>,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub success: bool,
    pub tenant: Tenant,
}

#[derive(Debug, Serialize)]
pub struct AdminUsersResponse {
    pub success: bool,
    pub users: Vec<AdminUserResponse>,
}

#[derive(Debug, Serialize)]
pub struct AdminUserCreatedResponse {
    pub success: bool,
    pub user: AdminUserResponse,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: TenantSummary,
}

#[axum::debug_handler]
pub async fn list_tenants(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<TenantsResponse>> {
    require_developer(&state, &headers)?;
    Ok(Json(TenantsResponse {
        success: true,
        tenants: state.registry.list().await,
    }))
}

#[axum::debug_handler]
pub async fn create_tenant(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> ApiResult<Json<TenantResponse>> {
    let developer = require_developer(&state, &headers)?;
    let Json(payload) = payload?;

    let tenant = state.registry.create(payload, Utc::now()).await?;

    info!("Developer {} created tenant {}", developer.username, tenant.slug);
    Ok(Json(TenantResponse {
        success: true,
        tenant,
    }))
}

#[axum::debug_handler]
pub async fn update_tenant(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    payload: Result<Json<UpdateTenantRequest>, JsonRejection>,
) -> ApiResult<Json<TenantResponse>> {
    require_developer(&state, &headers)?;
    let Json(payload) = payload?;
    let tenant = state.registry.update(&tenant_id, payload).await?;
    Ok(Json(TenantResponse {
        success: true,
        tenant,
    }))
}

/// Deactivates a tenant and drops its cached documents. Its admins and
/// employees are refused from then on; the data stays on disk.
#[axum::debug_handler]
pub async fn deactivate_tenant(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<TenantResponse>> {
    let developer = require_developer(&state, &headers)?;
    let tenant = state.registry.set_active(&tenant_id, false).await?;
    state.store.clear_tenant_cache_for_tenant(&tenant.id).await;

    info!("Developer {} deactivated tenant {}", developer.username, tenant.slug);
    Ok(Json(TenantResponse {
        success: true,
        tenant,
    }))
}

#[axum::debug_handler]
pub async fn activate_tenant(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<TenantResponse>> {
    let developer = require_developer(&state, &headers)?;
    let tenant = state.registry.set_active(&tenant_id, true).await?;

    info!("Developer {} activated tenant {}", developer.username, tenant.slug);
    Ok(Json(TenantResponse {
        success: true,
        tenant,
    }))
}

#[axum::debug_handler]
pub async fn list_admin_users(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<AdminUsersResponse>> {
    require_developer(&state, &headers)?;
    let tenant = state.registry.require(&tenant_id).await?;
    let docs = state.store.lock_tenant(&tenant.id).await?;
    Ok(Json(AdminUsersResponse {
        success: true,
        users: docs.admin_users().users.iter().map(AdminUserResponse::from).collect(),
    }))
}

/// Adds an admin account to a tenant, within the tenant's user limit.
#[axum::debug_handler]
pub async fn create_admin_user(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    payload: Result<Json<CreateAdminUserRequest>, JsonRejection>,
) -> ApiResult<Json<AdminUserCreatedResponse>> {
    let developer = require_developer(&state, &headers)?;
    let Json(payload) = payload?;
    validate_password(&payload.password)?;
    let tenant = state.registry.require(&tenant_id).await?;

    let mut docs = state.store.lock_tenant(&tenant.id).await?;
    if let Some(max) = tenant.settings.max_users {
        if docs.admin_users().users.len() >= max as usize {
            return Err(RosterError::validation(format!(
                "This organization is limited to {} admin users",
                max
            ))
            .into());
        }
    }

    let user = AdminUser {
        username: payload.username.trim().to_string(),
        password_hash: hash_password(&payload.password)?,
        role: payload
            .role
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "admin".to_string()),
        full_name: payload.full_name.unwrap_or_default(),
        created_at: Utc::now(),
        tenant_id: tenant.id.clone(),
    };
    let response = AdminUserResponse::from(&user);
    docs.admin_users_mut().add(user)?;
    docs.save_admin_users().await?;

    info!(
        "Developer {} added admin {} to tenant {}",
        developer.username, response.username, tenant.slug
    );
    Ok(Json(AdminUserCreatedResponse {
        success: true,
        user: response,
    }))
}

#[axum::debug_handler]
pub async fn tenant_summary(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    require_developer(&state, &headers)?;
    let tenant = state.registry.require(&tenant_id).await?;
    let docs = state.store.lock_tenant(&tenant.id).await?;

    let display = docs.display();
    let summary = TenantSummary {
        employee_count: display.employee_count(),
        active_employee_count: display.all_employees.iter().filter(|e| e.is_active()).count(),
        team_count: display.teams.len(),
        pending_requests: docs.requests().pending_count,
        admin_user_count: docs.admin_users().users.len(),
        tenant,
    };
    Ok(Json(SummaryResponse {
        success: true,
        summary,
    }))
}

/// Starts a tenant's paid term and reactivates the tenant.
#[axum::debug_handler]
pub async fn activate_subscription(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<TenantResponse>> {
    let developer = require_developer(&state, &headers)?;
    let tenant = state
        .registry
        .activate_subscription(&tenant_id, Utc::now())
        .await?;

    info!("Developer {} activated the subscription of {}", developer.username, tenant.slug);
    Ok(Json(TenantResponse {
        success: true,
        tenant,
    }))
}

/// Clears a tenant's roster edits, request history and modification log.
/// The imported table, settings and accounts are kept.
#[axum::debug_handler]
pub async fn reset_tenant(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<Ack>> {
    let developer = require_developer(&state, &headers)?;
    let tenant = state.registry.require(&tenant_id).await?;
    let mut docs = state.store.lock_tenant(&tenant.id).await?;
    docs.reset_roster_edits().await?;

    warn!("Developer {} reset the data of tenant {}", developer.username, tenant.slug);
    Ok(Json(Ack::new("Tenant data reset successfully")))
}

#[derive(Debug, Serialize)]
pub struct RequestStats {
    pub pending_count: u64,
    pub approved_count: u64,
}

#[derive(Debug, Serialize)]
pub struct RequestsExport {
    pub shift_change_requests: Vec<ShiftChangeRequest>,
    pub swap_requests: Vec<SwapRequest>,
    pub stats: RequestStats,
}

#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    pub exported_at: DateTime<Utc>,
    pub exported_by: String,
    pub version: &'static str,
}

/// Full snapshot of a tenant. Password hashes are never included.
#[derive(Debug, Serialize)]
pub struct TenantExport {
    pub tenant: Tenant,
    pub admin_users: Vec<AdminUserResponse>,
    pub employees: Vec<Employee>,
    pub schedule_requests: RequestsExport,
    pub modified_shifts: Vec<ModifiedShiftRecord>,
    pub export_metadata: ExportMetadata,
}

/// Downloads a tenant snapshot as `tenant-<slug>-export-<date>.json`.
#[axum::debug_handler]
pub async fn export_tenant(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> ApiResult<([(HeaderName, HeaderValue); 1], Json<TenantExport>)> {
    let developer = require_developer(&state, &headers)?;
    let tenant = state.registry.require(&tenant_id).await?;
    let docs = state.store.lock_tenant(&tenant.id).await?;

    let now = Utc::now();
    let requests = docs.requests();
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"tenant-{}-export-{}.json\"",
        tenant.slug,
        now.format("%Y-%m-%d")
    ))
    .map_err(|e| RosterError::Internal(Box::new(e)))?;
    let export = TenantExport {
        admin_users: docs.admin_users().users.iter().map(AdminUserResponse::from).collect(),
        employees: docs.display().all_employees.clone(),
        schedule_requests: RequestsExport {
            shift_change_requests: requests.shift_change_requests.clone(),
            swap_requests: requests.swap_requests.clone(),
            stats: RequestStats {
                pending_count: requests.pending_count,
                approved_count: requests.approved_count,
            },
        },
        modified_shifts: docs.modified_shifts().modifications.clone(),
        export_metadata: ExportMetadata {
            exported_at: now,
            exported_by: developer.username.clone(),
            version: "1.0",
        },
        tenant,
    };

    info!("Developer {} exported tenant {}", developer.username, export.tenant.slug);
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(export)))
}
