//! Employee self-service: own schedule, own requests, notifications,
//! password and profile.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use chrono::Utc;
use rosterdesk_core::{
    errors::RosterError,
    models::{
        credentials::{ChangePasswordRequest, UpdateProfileRequest},
        request::RequestListResponse,
        roster::MyScheduleResponse,
    },
    notifications::{self, Notification},
    workflow,
};
use serde::Serialize;
use tracing::info;

use crate::{
    ApiResult, ApiState,
    handlers::{
        Ack,
        employees::{ProfileResponse, validate_password},
        requests::request_list,
    },
    middleware::{
        auth::{hash_password, require_employee, verify_password},
        error_handling::AppError,
    },
};

#[axum::debug_handler]
pub async fn my_schedule(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<MyScheduleResponse>> {
    let session = require_employee(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;

    let display = docs.display();
    let employee = display
        .find_employee(&session.employee_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", session.employee_id)))?;
    let teammates: Vec<_> = display
        .teams
        .get(&employee.current_team)
        .map(|members| {
            members
                .iter()
                .filter(|e| e.id != employee.id && e.is_active())
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Ok(Json(MyScheduleResponse {
        employee,
        headers: display.headers.clone(),
        shift_definitions: docs.settings().shift_definitions(),
        teammates,
    }))
}

/// Requests the employee filed or is the target of, newest first.
#[axum::debug_handler]
pub async fn my_requests(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RequestListResponse>> {
    let session = require_employee(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let requests = workflow::for_employee(docs.requests(), &session.employee_id);
    Ok(Json(request_list(docs.requests(), requests)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub success: bool,
    pub count: usize,
    pub unread_count: usize,
    pub notifications: Vec<Notification>,
}

/// Everything that happened to the employee since they last marked their
/// notifications read.
#[axum::debug_handler]
pub async fn my_notifications(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<NotificationsResponse>> {
    let session = require_employee(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let notifications = notifications::for_employee(
        docs.requests(),
        docs.modified_shifts(),
        &session.employee_id,
        docs.read_notifications().last_read(&session.employee_id),
        Utc::now(),
    );
    Ok(Json(NotificationsResponse {
        success: true,
        count: notifications.len(),
        unread_count: notifications.len(),
        notifications,
    }))
}

#[axum::debug_handler]
pub async fn mark_notifications_read(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Ack>> {
    let session = require_employee(&state, &headers).await?;
    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    docs.read_notifications_mut()
        .mark_read(&session.employee_id, Utc::now());
    docs.save_read_notifications().await?;
    Ok(Json(Ack::new("Notifications marked as read")))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let session = require_employee(&state, &headers).await?;
    let Json(payload) = payload?;
    validate_password(&payload.new_password)?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let current_hash = docs
        .credentials()
        .find(&session.employee_id)
        .map(|c| c.password_hash.clone())
        .ok_or_else(|| RosterError::not_found(format!("Credentials for {}", session.employee_id)))?;
    if !verify_password(&payload.current_password, &current_hash) {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }

    let password_hash = hash_password(&payload.new_password)?;
    docs.credentials_mut()
        .set_password_hash(&session.employee_id, password_hash, Utc::now());
    docs.save_credentials().await?;

    info!("Tenant {}: employee {} changed their password", session.tenant.slug, session.employee_id);
    Ok(Json(Ack::new("Password changed")))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ProfileResponse>> {
    let session = require_employee(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let profile = docs.load_profile(&session.employee_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

/// Updates the fields present in the body; an empty string clears a field.
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<ProfileResponse>> {
    let session = require_employee(&state, &headers).await?;
    let Json(payload) = payload?;

    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let mut profile = docs.load_profile(&session.employee_id).await?;
    profile.apply(payload, Utc::now());
    docs.save_profile(&profile).await?;

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}
