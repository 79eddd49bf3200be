use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
};
use chrono::Utc;
use rosterdesk_core::{
    errors::RosterError,
    models::request::{
        RequestListResponse, RequestStatus, ScheduleRequest, ScheduleRequestsFile,
        SubmitShiftChangeRequest, SubmitSwapRequest, UpdateRequestStatusRequest,
    },
    workflow,
};
use serde::Serialize;
use tracing::info;

use crate::{
    ApiResult, ApiState,
    middleware::auth::{require_admin, require_employee},
};

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub success: bool,
    pub request: ScheduleRequest,
}

pub(crate) fn request_list(file: &ScheduleRequestsFile, requests: Vec<ScheduleRequest>) -> RequestListResponse {
    RequestListResponse {
        success: true,
        requests,
        pending_count: file.pending_count,
        approved_count: file.approved_count,
    }
}

/// Files a shift-change request for the signed-in employee. Name and team
/// default to the employee's roster entry.
#[axum::debug_handler]
pub async fn submit_shift_change(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<SubmitShiftChangeRequest>, JsonRejection>,
) -> ApiResult<Json<RequestResponse>> {
    let session = require_employee(&state, &headers).await?;
    let Json(mut payload) = payload?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let employee = docs
        .display()
        .find_employee(&session.employee_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", session.employee_id)))?;
    payload.employee_id = Some(employee.id);
    payload.employee_name = payload.employee_name.or(Some(employee.name));
    payload.team = payload.team.or(Some(employee.current_team));

    let request = workflow::add_shift_change(docs.requests_mut(), payload, Utc::now())?;
    docs.save_requests().await?;

    info!(
        "Tenant {}: {} filed {} for {}",
        session.tenant.slug, request.employee_id, request.id, request.date
    );
    Ok(Json(RequestResponse {
        success: true,
        request: ScheduleRequest::ShiftChange(request),
    }))
}

/// Files a swap between the signed-in employee and another employee.
#[axum::debug_handler]
pub async fn submit_swap(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<SubmitSwapRequest>, JsonRejection>,
) -> ApiResult<Json<RequestResponse>> {
    let session = require_employee(&state, &headers).await?;
    let Json(mut payload) = payload?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let requester = docs
        .display()
        .find_employee(&session.employee_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", session.employee_id)))?;
    let target_id = payload
        .target_employee_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RosterError::validation("Target employee ID is required"))?;
    let target = docs
        .display()
        .find_employee(target_id)
        .cloned()
        .ok_or_else(|| RosterError::not_found(format!("Employee {}", target_id)))?;

    payload.requester_id = Some(requester.id);
    payload.requester_name = payload.requester_name.or(Some(requester.name));
    payload.team = payload.team.or(Some(requester.current_team));
    payload.target_employee_id = Some(target.id);
    payload.target_employee_name = payload.target_employee_name.or(Some(target.name));

    let request = workflow::add_swap(docs.requests_mut(), payload, Utc::now())?;
    docs.save_requests().await?;

    info!(
        "Tenant {}: {} filed {} with {}",
        session.tenant.slug, request.requester_id, request.id, request.target_employee_id
    );
    Ok(Json(RequestResponse {
        success: true,
        request: ScheduleRequest::Swap(request),
    }))
}

#[axum::debug_handler]
pub async fn list_pending(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RequestListResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let requests = workflow::pending(docs.requests());
    Ok(Json(request_list(docs.requests(), requests)))
}

/// Every request, pending first, newest first within each group.
#[axum::debug_handler]
pub async fn list_all(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RequestListResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let requests = workflow::all_sorted(docs.requests());
    Ok(Json(request_list(docs.requests(), requests)))
}

#[axum::debug_handler]
pub async fn list_for_employee(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<RequestListResponse>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let requests = workflow::for_employee(docs.requests(), &employee_id);
    Ok(Json(request_list(docs.requests(), requests)))
}

/// Approves or rejects a pending request. An approval writes the change into
/// the Admin table before the request is marked approved.
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<UpdateRequestStatusRequest>, JsonRejection>,
) -> ApiResult<Json<RequestResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let request = {
        let (file, admin, mods) = docs.workflow_parts();
        workflow::resolve_request(
            file,
            admin,
            mods,
            &payload.request_id,
            payload.status,
            &session.username,
            payload.admin_message,
            Utc::now(),
        )?
    };
    docs.save_requests().await?;
    if payload.status == RequestStatus::Approved {
        docs.save_admin().await?;
        docs.save_modified_shifts().await?;
        docs.merge_display_for_tenant().await?;
    }

    info!(
        "Tenant {}: {} marked {} as {:?}",
        session.tenant.slug,
        session.username,
        request.id(),
        request.status()
    );
    Ok(Json(RequestResponse {
        success: true,
        request,
    }))
}
