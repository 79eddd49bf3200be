use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
};
use chrono::Utc;
use rosterdesk_core::{
    errors::RosterError,
    models::{
        credentials::{EmployeeProfile, SetEmployeePasswordRequest},
        roster::{
            DeactivateEmployeeRequest, Employee, EmployeeStatus, ReactivateEmployeeRequest,
            SaveAction, SaveEmployeeRequest, SaveTeamRequest,
        },
    },
};
use serde::Serialize;
use tracing::info;

use crate::{
    ApiResult, ApiState,
    handlers::Ack,
    middleware::auth::{hash_password, require_admin},
};

/// Shortest password accepted for employee and admin accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn validate_password(password: &str) -> Result<(), RosterError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RosterError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub success: bool,
    pub employee: Employee,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTeamResponse {
    pub success: bool,
    pub employees_moved: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: EmployeeProfile,
}

/// Adds a team, or renames one when `action` is `edit`.
#[axum::debug_handler]
pub async fn save_team(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<SaveTeamRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let message = match payload.action {
        SaveAction::Add => {
            docs.admin_mut().add_team(&payload.team_name)?;
            format!("Team {} added", payload.team_name.trim())
        }
        SaveAction::Edit => {
            let old_name = payload
                .old_name
                .as_deref()
                .ok_or_else(|| RosterError::validation("The current team name is required"))?;
            docs.admin_mut().rename_team(old_name, &payload.team_name)?;
            format!("Team {} renamed to {}", old_name, payload.team_name.trim())
        }
    };
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    info!("Tenant {}: {}", session.tenant.slug, message);
    Ok(Json(Ack::new(message)))
}

/// Deletes a team; its members move to the Unassigned team.
#[axum::debug_handler]
pub async fn delete_team(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(team_name): Path<String>,
) -> ApiResult<Json<DeleteTeamResponse>> {
    let session = require_admin(&state, &headers).await?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let employees_moved = docs.admin_mut().delete_team(&team_name)?;
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    info!("Tenant {}: deleted team {}", session.tenant.slug, team_name);
    Ok(Json(DeleteTeamResponse {
        success: true,
        employees_moved,
    }))
}

/// Adds an employee to the Admin table, or edits one when `action` is `edit`.
///
/// New ids must be unused across the Admin table, the imported table and
/// the stored credentials.
#[axum::debug_handler]
pub async fn save_employee(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<SaveEmployeeRequest>, JsonRejection>,
) -> ApiResult<Json<EmployeeResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let new_id = payload.id.trim().to_string();

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let current_id = match payload.action {
        SaveAction::Add => None,
        SaveAction::Edit => Some(
            payload
                .old_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .unwrap_or(new_id.as_str())
                .to_string(),
        ),
    };

    if current_id.as_deref() != Some(new_id.as_str())
        && (docs.google().contains_employee(&new_id) || docs.credentials().find(&new_id).is_some())
    {
        return Err(RosterError::Conflict(format!("Employee ID \"{}\" already exists", new_id)).into());
    }

    match &current_id {
        None => {
            if let Some(max) = session.tenant.settings.max_employees {
                let active = docs.admin().all_employees.iter().filter(|e| e.is_active()).count();
                if active >= max as usize {
                    return Err(RosterError::validation(format!(
                        "This organization is limited to {} active employees",
                        max
                    ))
                    .into());
                }
            }
            docs.admin_mut()
                .add_employee(&new_id, &payload.name, &payload.team)?;
        }
        Some(current_id) => {
            docs.admin_mut()
                .edit_employee(current_id, &new_id, &payload.name, &payload.team)?;

            let google_team = docs
                .google()
                .find_employee(current_id)
                .map(|e| e.current_team.clone());
            if let Some(google_team) = google_team {
                docs.google_mut()
                    .edit_employee(current_id, &new_id, &payload.name, &google_team)?;
                docs.save_google().await?;
            }
            if current_id != &new_id {
                docs.credentials_mut().rename(current_id, &new_id);
                docs.save_credentials().await?;
                if docs.modified_shifts_mut().rename_employee(current_id, &new_id) > 0 {
                    docs.save_modified_shifts().await?;
                }
            }
        }
    }
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    let employee = docs
        .admin()
        .find_employee(&new_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", new_id)))?;
    info!("Tenant {}: saved employee {}", session.tenant.slug, employee.id);
    Ok(Json(EmployeeResponse {
        success: true,
        employee,
    }))
}

/// Soft-deletes an employee: parks them in the inactive team, flags the
/// imported copy and disables their portal login.
#[axum::debug_handler]
pub async fn deactivate_employee(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<DeactivateEmployeeRequest>, JsonRejection>,
) -> ApiResult<Json<EmployeeResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let now = Utc::now();

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.admin_mut().deactivate_employee(&payload.employee_id, now)?;
    if docs
        .google_mut()
        .mark_status(&payload.employee_id, EmployeeStatus::Inactive, now)
    {
        docs.save_google().await?;
    }
    if docs
        .credentials_mut()
        .set_status(&payload.employee_id, EmployeeStatus::Inactive, now)
    {
        docs.save_credentials().await?;
    }
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    let employee = docs
        .admin()
        .find_employee(&payload.employee_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", payload.employee_id)))?;
    info!("Tenant {}: deactivated employee {}", session.tenant.slug, employee.id);
    Ok(Json(EmployeeResponse {
        success: true,
        employee,
    }))
}

#[axum::debug_handler]
pub async fn reactivate_employee(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<ReactivateEmployeeRequest>, JsonRejection>,
) -> ApiResult<Json<EmployeeResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let now = Utc::now();

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.admin_mut()
        .reactivate_employee(&payload.employee_id, &payload.target_team)?;
    if docs
        .google_mut()
        .mark_status(&payload.employee_id, EmployeeStatus::Active, now)
    {
        docs.save_google().await?;
    }
    if docs
        .credentials_mut()
        .set_status(&payload.employee_id, EmployeeStatus::Active, now)
    {
        docs.save_credentials().await?;
    }
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    let employee = docs
        .admin()
        .find_employee(&payload.employee_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", payload.employee_id)))?;
    info!("Tenant {}: reactivated employee {}", session.tenant.slug, employee.id);
    Ok(Json(EmployeeResponse {
        success: true,
        employee,
    }))
}

/// Sets or replaces an employee's portal password.
#[axum::debug_handler]
pub async fn set_employee_password(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<SetEmployeePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    validate_password(&payload.password)?;
    let employee_id = payload.employee_id.trim();

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    if !docs.display().contains_employee(employee_id) {
        return Err(RosterError::not_found(format!("Employee {}", employee_id)).into());
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now();
    let credentials = docs.credentials_mut();
    credentials.set_password_hash(employee_id, password_hash, now);
    if let Some(email) = payload.email.map(|e| e.trim().to_string()) {
        if let Some(cred) = credentials
            .credentials
            .iter_mut()
            .find(|c| c.employee_id == employee_id)
        {
            cred.email = (!email.is_empty()).then_some(email);
        }
    }
    docs.save_credentials().await?;

    info!("Tenant {}: password set for employee {}", session.tenant.slug, employee_id);
    Ok(Json(Ack::new(format!("Password set for {}", employee_id))))
}

#[axum::debug_handler]
pub async fn get_employee_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    if !docs.display().contains_employee(&employee_id) {
        return Err(RosterError::not_found(format!("Employee {}", employee_id)).into());
    }
    let profile = docs.load_profile(&employee_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}
