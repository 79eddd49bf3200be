//! Schedule request workflow.
//!
//! Requests are appended as `pending` and resolved exactly once. Approving a
//! request writes the change into the admin roster and logs one
//! [`ModifiedShiftRecord`] per touched cell, so a later re-import keeps it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{RosterError, RosterResult};
use crate::models::modification::{ModifiedShiftRecord, ModifiedShiftsData};
use crate::models::request::{
    RequestKind, RequestStatus, ScheduleRequest, ScheduleRequestsFile, ShiftChangeRequest,
    SubmitShiftChangeRequest, SubmitSwapRequest, SwapRequest,
};
use crate::models::roster::RosterData;

const SHIFT_CHANGE_PREFIX: &str = "shift_change_";
const SWAP_PREFIX: &str = "swap_";

fn required(value: Option<String>, field: &str) -> RosterResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RosterError::validation(format!("{} is required", field))),
    }
}

/// Shift values may legitimately be empty but must be sent.
fn present(value: Option<String>, field: &str) -> RosterResult<String> {
    value
        .map(|v| v.trim().to_string())
        .ok_or_else(|| RosterError::validation(format!("{} is required", field)))
}

fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let highest = existing
        .filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{}", prefix, highest + 1)
}

/// Recomputes `pending_count` from the stored requests.
pub fn recount(file: &mut ScheduleRequestsFile) {
    let pending_changes = file
        .shift_change_requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .count();
    let pending_swaps = file
        .swap_requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .count();
    file.pending_count = (pending_changes + pending_swaps) as u64;
}

pub fn add_shift_change(
    file: &mut ScheduleRequestsFile,
    submit: SubmitShiftChangeRequest,
    now: DateTime<Utc>,
) -> RosterResult<ShiftChangeRequest> {
    let request = ShiftChangeRequest {
        id: next_id(
            SHIFT_CHANGE_PREFIX,
            file.shift_change_requests.iter().map(|r| r.id.as_str()),
        ),
        employee_id: required(submit.employee_id, "Employee ID")?,
        employee_name: required(submit.employee_name, "Employee name")?,
        team: required(submit.team, "Team")?,
        date: required(submit.date, "Date")?,
        current_shift: present(submit.current_shift, "Current shift")?,
        requested_shift: present(submit.requested_shift, "Requested shift")?,
        reason: required(submit.reason, "Reason")?,
        status: RequestStatus::Pending,
        kind: RequestKind::ShiftChange,
        created_at: now,
        updated_at: None,
        approved_at: None,
        approved_by: None,
        admin_message: None,
    };
    file.shift_change_requests.push(request.clone());
    recount(file);
    Ok(request)
}

pub fn add_swap(
    file: &mut ScheduleRequestsFile,
    submit: SubmitSwapRequest,
    now: DateTime<Utc>,
) -> RosterResult<SwapRequest> {
    let requester_id = required(submit.requester_id, "Requester ID")?;
    let target_employee_id = required(submit.target_employee_id, "Target employee ID")?;
    if requester_id == target_employee_id {
        return Err(RosterError::validation("An employee cannot swap shifts with themselves"));
    }
    let request = SwapRequest {
        id: next_id(SWAP_PREFIX, file.swap_requests.iter().map(|r| r.id.as_str())),
        requester_id,
        requester_name: required(submit.requester_name, "Requester name")?,
        target_employee_id,
        target_employee_name: required(submit.target_employee_name, "Target employee name")?,
        team: required(submit.team, "Team")?,
        date: required(submit.date, "Date")?,
        requester_shift: present(submit.requester_shift, "Requester shift")?,
        target_shift: present(submit.target_shift, "Target shift")?,
        reason: required(submit.reason, "Reason")?,
        status: RequestStatus::Pending,
        kind: RequestKind::Swap,
        created_at: now,
        updated_at: None,
        approved_at: None,
        approved_by: None,
        admin_message: None,
    };
    file.swap_requests.push(request.clone());
    recount(file);
    Ok(request)
}

/// Finds the column a request date refers to. Accepts a header label as is
/// (`"1Nov"`) or an ISO date (`"2025-11-01"`), which is matched as `"1Nov"`.
pub fn resolve_date_column(headers: &[String], date: &str) -> Option<usize> {
    let date = date.trim();
    if let Some(idx) = headers.iter().position(|h| h == date) {
        return Some(idx);
    }
    let label = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| format!("{}{}", d.format("%-d"), d.format("%b")))?;
    headers.iter().position(|h| h.eq_ignore_ascii_case(&label))
}

fn date_column(admin: &RosterData, date: &str) -> RosterResult<usize> {
    resolve_date_column(&admin.headers, date)
        .ok_or_else(|| RosterError::not_found(format!("Date column {}", date)))
}

fn ensure_employee(admin: &RosterData, id: &str) -> RosterResult<()> {
    if admin.contains_employee(id) {
        Ok(())
    } else {
        Err(RosterError::not_found(format!("Employee {}", id)))
    }
}

/// Writes one approved cell and logs it.
fn write_cell(
    admin: &mut RosterData,
    mods: &mut ModifiedShiftsData,
    employee_id: &str,
    column: usize,
    value: &str,
    acting_user: &str,
    now: DateTime<Utc>,
) -> RosterResult<()> {
    let edit = admin.set_shift(employee_id, column, value)?;
    mods.record(ModifiedShiftRecord {
        employee_id: employee_id.to_string(),
        employee_name: edit.employee_name,
        team_name: edit.team_name,
        date_index: column,
        date_header: edit.date_header,
        old_shift: edit.old_shift,
        new_shift: value.to_string(),
        modified_by: acting_user.to_string(),
        timestamp: now,
        month_year: String::new(),
    });
    Ok(())
}

fn apply_shift_change(
    request: &ShiftChangeRequest,
    admin: &mut RosterData,
    mods: &mut ModifiedShiftsData,
    acting_user: &str,
    now: DateTime<Utc>,
) -> RosterResult<()> {
    ensure_employee(admin, &request.employee_id)?;
    let column = date_column(admin, &request.date)?;
    write_cell(
        admin,
        mods,
        &request.employee_id,
        column,
        &request.requested_shift,
        acting_user,
        now,
    )
}

/// Exchanges both cells. Everything is checked before the first write.
fn apply_swap(
    request: &SwapRequest,
    admin: &mut RosterData,
    mods: &mut ModifiedShiftsData,
    acting_user: &str,
    now: DateTime<Utc>,
) -> RosterResult<()> {
    ensure_employee(admin, &request.requester_id)?;
    ensure_employee(admin, &request.target_employee_id)?;
    let column = date_column(admin, &request.date)?;

    let shift_of = |id: &str| {
        admin
            .find_employee(id)
            .map(|e| e.shift(column).to_string())
            .unwrap_or_default()
    };
    let requester_shift = shift_of(&request.requester_id);
    let target_shift = shift_of(&request.target_employee_id);

    write_cell(admin, mods, &request.requester_id, column, &target_shift, acting_user, now)?;
    write_cell(admin, mods, &request.target_employee_id, column, &requester_shift, acting_user, now)
}

/// Resolves a pending request.
///
/// On approval the roster change is applied first; if it cannot be applied
/// the request is left pending and the error is returned.
#[allow(clippy::too_many_arguments)]
pub fn resolve_request(
    file: &mut ScheduleRequestsFile,
    admin: &mut RosterData,
    mods: &mut ModifiedShiftsData,
    request_id: &str,
    status: RequestStatus,
    acting_user: &str,
    admin_message: Option<String>,
    now: DateTime<Utc>,
) -> RosterResult<ScheduleRequest> {
    if status == RequestStatus::Pending {
        return Err(RosterError::validation("Status must be approved or rejected"));
    }
    let admin_message = admin_message.filter(|m| !m.trim().is_empty());

    let resolved = if let Some(request) = file
        .shift_change_requests
        .iter_mut()
        .find(|r| r.id == request_id)
    {
        ensure_pending(&request.id, request.status)?;
        if status == RequestStatus::Approved {
            apply_shift_change(request, admin, mods, acting_user, now)?;
            request.approved_at = Some(now);
            request.approved_by = Some(acting_user.to_string());
        }
        request.status = status;
        request.updated_at = Some(now);
        request.admin_message = admin_message;
        ScheduleRequest::ShiftChange(request.clone())
    } else if let Some(request) = file.swap_requests.iter_mut().find(|r| r.id == request_id) {
        ensure_pending(&request.id, request.status)?;
        if status == RequestStatus::Approved {
            apply_swap(request, admin, mods, acting_user, now)?;
            request.approved_at = Some(now);
            request.approved_by = Some(acting_user.to_string());
        }
        request.status = status;
        request.updated_at = Some(now);
        request.admin_message = admin_message;
        ScheduleRequest::Swap(request.clone())
    } else {
        return Err(RosterError::not_found(format!("Request {}", request_id)));
    };

    if status == RequestStatus::Approved {
        file.approved_count += 1;
    }
    recount(file);
    Ok(resolved)
}

fn ensure_pending(id: &str, status: RequestStatus) -> RosterResult<()> {
    if status == RequestStatus::Pending {
        Ok(())
    } else {
        Err(RosterError::validation(format!(
            "Request {} has already been {}",
            id,
            match status {
                RequestStatus::Approved => "approved",
                _ => "rejected",
            }
        )))
    }
}

fn all_requests(file: &ScheduleRequestsFile) -> impl Iterator<Item = ScheduleRequest> + '_ {
    file.shift_change_requests
        .iter()
        .cloned()
        .map(ScheduleRequest::ShiftChange)
        .chain(file.swap_requests.iter().cloned().map(ScheduleRequest::Swap))
}

/// Pending requests, newest first.
pub fn pending(file: &ScheduleRequestsFile) -> Vec<ScheduleRequest> {
    let mut requests: Vec<_> = all_requests(file)
        .filter(|r| r.status() == RequestStatus::Pending)
        .collect();
    requests.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    requests
}

/// Every request: pending ones first, then newest first.
pub fn all_sorted(file: &ScheduleRequestsFile) -> Vec<ScheduleRequest> {
    let mut requests: Vec<_> = all_requests(file).collect();
    requests.sort_by_key(|r| {
        (
            r.status() != RequestStatus::Pending,
            std::cmp::Reverse(r.created_at()),
        )
    });
    requests
}

/// Requests an employee filed or is the target of, newest first.
pub fn for_employee(file: &ScheduleRequestsFile, employee_id: &str) -> Vec<ScheduleRequest> {
    let mut requests: Vec<_> = all_requests(file)
        .filter(|r| r.involves(employee_id))
        .collect();
    requests.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    requests
}
