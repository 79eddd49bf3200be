use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, header},
};
use rosterdesk_core::models::{
    credentials::{EmployeeLoginRequest, split_tenant_login},
    roster::EmployeeStatus,
    tenant::{AdminLoginRequest, DeveloperLoginRequest, Tenant, TenantInfo},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    ApiResult, ApiState,
    handlers::Ack,
    middleware::{
        auth::{Role, require_session, verify_password},
        error_handling::AppError,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
    pub role: Role,
    /// Same token as the cookie, for clients that send `Authorization: Bearer`.
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantInfo>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantInfo>,
}

type WithCookie<T> = ([(HeaderName, HeaderValue); 1], Json<T>);

fn signed_in(
    state: &ApiState,
    username: &str,
    role: Role,
    tenant: Option<&Tenant>,
) -> ApiResult<WithCookie<LoginResponse>> {
    let token = state
        .sessions
        .issue(username, role, tenant.map(|t| t.id.as_str()))?;
    let cookie = state.sessions.cookie(&token)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            username: username.to_string(),
            role,
            token,
            tenant: tenant.map(TenantInfo::from),
        }),
    ))
}

fn ensure_active(tenant: &Tenant) -> ApiResult<()> {
    if tenant.is_active {
        Ok(())
    } else {
        Err(AppError::forbidden("Tenant is inactive"))
    }
}

/// Signs in a tenant admin. Without a tenant slug every tenant is searched
/// and the first active one whose account matches username and password wins.
#[axum::debug_handler]
pub async fn admin_login(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> ApiResult<WithCookie<LoginResponse>> {
    let Json(payload) = payload?;
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let candidates = match payload.tenant_slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => match state.registry.find_by_slug(slug).await {
            Some(tenant) => vec![tenant],
            None => return Err(AppError::unauthorized(INVALID_CREDENTIALS)),
        },
        _ => state.registry.list().await,
    };

    let mut inactive_match = false;
    for tenant in candidates {
        let user = {
            let docs = state.store.lock_tenant(&tenant.id).await?;
            docs.admin_users().find(username).cloned()
        };
        let Some(user) = user else {
            continue;
        };

        // Usernames repeat across tenants; keep looking on a mismatch.
        if !verify_password(&payload.password, &user.password_hash) {
            warn!("Failed admin login for {} on tenant {}", username, tenant.slug);
            continue;
        }
        if !tenant.is_active {
            inactive_match = true;
            continue;
        }

        info!("Admin {} signed in to tenant {}", user.username, tenant.slug);
        return signed_in(&state, &user.username, Role::Admin, Some(&tenant));
    }

    if inactive_match {
        return Err(AppError::forbidden("Tenant is inactive"));
    }
    Err(AppError::unauthorized(INVALID_CREDENTIALS))
}

/// Signs in an employee with `slug@id`, `slug/id`, or a bare id plus `tenantSlug`.
#[axum::debug_handler]
pub async fn employee_login(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<EmployeeLoginRequest>, JsonRejection>,
) -> ApiResult<WithCookie<LoginResponse>> {
    let Json(payload) = payload?;
    let (slug, login_id) = split_tenant_login(&payload.employee_id);
    let slug = slug
        .map(str::to_string)
        .or_else(|| payload.tenant_slug.clone())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::unauthorized("Sign in as organization@employeeId"))?;

    let tenant = state
        .registry
        .find_by_slug(&slug)
        .await
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;
    ensure_active(&tenant)?;

    let credential = {
        let docs = state.store.lock_tenant(&tenant.id).await?;
        let employee_id = docs
            .display()
            .find_employee_ignore_case(login_id)
            .map(|e| e.id.clone())
            .unwrap_or_else(|| login_id.to_string());
        docs.credentials().find(&employee_id).cloned()
    };
    let credential = credential.ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&payload.password, &credential.password_hash) {
        warn!("Failed employee login for {} on tenant {}", login_id, tenant.slug);
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }
    if credential.status == EmployeeStatus::Inactive {
        return Err(AppError::forbidden("This employee account is deactivated"));
    }

    info!("Employee {} signed in to tenant {}", credential.employee_id, tenant.slug);
    signed_in(&state, &credential.employee_id, Role::Employee, Some(&tenant))
}

#[axum::debug_handler]
pub async fn developer_login(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<DeveloperLoginRequest>, JsonRejection>,
) -> ApiResult<WithCookie<LoginResponse>> {
    let Json(payload) = payload?;
    let developer = state
        .registry
        .find_developer(payload.username.trim())
        .await
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&payload.password, &developer.password_hash) {
        warn!("Failed developer login for {}", developer.username);
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    info!("Developer {} signed in", developer.username);
    signed_in(&state, &developer.username, Role::Developer, None)
}

/// Clears the session cookie. Works with or without a session.
#[axum::debug_handler]
pub async fn logout(State(state): State<Arc<ApiState>>) -> WithCookie<Ack> {
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(Ack::new("Signed out")),
    )
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let claims = require_session(&state, &headers)?;
    let tenant = match &claims.tid {
        Some(tid) => state.registry.get(tid).await,
        None => None,
    };

    Ok(Json(SessionResponse {
        success: true,
        username: claims.sub,
        role: claims.role,
        tenant_id: claims.tid,
        tenant: tenant.as_ref().map(TenantInfo::from),
    }))
}
