//! Employee notifications, derived on demand from the request history and
//! the modification log. Only the per-employee "read up to" marker is stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    modification::ModifiedShiftsData,
    request::{RequestKind, RequestStatus, ScheduleRequestsFile},
};

/// Resolved requests and shift edits older than this are not reported.
pub const NOTIFICATION_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RequestApproved,
    RequestRejected,
    ShiftModified,
    SwapRequestReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
    pub date: String,
    pub timestamp: DateTime<Utc>,
    pub priority: Priority,
}

/// `read_notifications.json`: when each employee last cleared their list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadNotifications(pub BTreeMap<String, DateTime<Utc>>);

impl ReadNotifications {
    pub fn last_read(&self, employee_id: &str) -> Option<DateTime<Utc>> {
        self.0.get(employee_id).copied()
    }

    pub fn mark_read(&mut self, employee_id: &str, now: DateTime<Utc>) {
        self.0.insert(employee_id.to_string(), now);
    }
}

fn request_label(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::ShiftChange => "shift change",
        RequestKind::Swap => "swap",
    }
}

fn shift_label(shift: &str) -> &str {
    if shift.is_empty() { "(blank)" } else { shift }
}

struct Resolved<'a> {
    id: &'a str,
    kind: RequestKind,
    date: &'a str,
    status: RequestStatus,
    updated_at: Option<DateTime<Utc>>,
    admin_message: Option<&'a str>,
}

fn resolved_notification(r: Resolved<'_>) -> Option<Notification> {
    let timestamp = r.updated_at?;
    let (kind, title, verb, id, priority) = match r.status {
        RequestStatus::Approved => (
            NotificationKind::RequestApproved,
            "Request Approved",
            "has been approved",
            format!("req-{}", r.id),
            Priority::High,
        ),
        RequestStatus::Rejected => (
            NotificationKind::RequestRejected,
            "Request Rejected",
            "was rejected",
            format!("req-rej-{}", r.id),
            Priority::Medium,
        ),
        RequestStatus::Pending => return None,
    };
    let admin_message = r.admin_message.filter(|m| !m.trim().is_empty());
    let mut message = format!("Your {} request for {} {}", request_label(r.kind), r.date, verb);
    if let Some(note) = admin_message {
        message.push_str(&format!(". Message from admin: {}", note));
    }
    Some(Notification {
        id,
        kind,
        title: title.to_string(),
        message,
        admin_message: admin_message.map(str::to_string),
        date: r.date.to_string(),
        timestamp,
        priority,
    })
}

/// Unread notifications of one employee, newest first.
///
/// - approved or rejected requests the employee filed, resolved within the window
/// - admin edits of the employee's cells within the window
/// - pending swaps that name the employee as the other side
pub fn for_employee(
    requests: &ScheduleRequestsFile,
    mods: &ModifiedShiftsData,
    employee_id: &str,
    last_read: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let cutoff = now - Duration::days(NOTIFICATION_WINDOW_DAYS);
    let unread = |at: DateTime<Utc>| last_read.is_none_or(|read| at > read);
    let fresh = |at: Option<DateTime<Utc>>| at.is_some_and(|at| at > cutoff && unread(at));

    let mut out = Vec::new();

    for r in requests
        .shift_change_requests
        .iter()
        .filter(|r| r.employee_id == employee_id && fresh(r.updated_at))
    {
        out.extend(resolved_notification(Resolved {
            id: &r.id,
            kind: r.kind,
            date: &r.date,
            status: r.status,
            updated_at: r.updated_at,
            admin_message: r.admin_message.as_deref(),
        }));
    }

    for r in &requests.swap_requests {
        if r.requester_id == employee_id && fresh(r.updated_at) {
            out.extend(resolved_notification(Resolved {
                id: &r.id,
                kind: r.kind,
                date: &r.date,
                status: r.status,
                updated_at: r.updated_at,
                admin_message: r.admin_message.as_deref(),
            }));
        }
        if r.target_employee_id == employee_id
            && r.status == RequestStatus::Pending
            && unread(r.created_at)
        {
            let requester = if r.requester_name.trim().is_empty() {
                "A colleague"
            } else {
                r.requester_name.as_str()
            };
            out.push(Notification {
                id: format!("swap-target-{}", r.id),
                kind: NotificationKind::SwapRequestReceived,
                title: "Swap Request".to_string(),
                message: format!("{} wants to swap shifts with you on {}", requester, r.date),
                admin_message: None,
                date: r.date.clone(),
                timestamp: r.created_at,
                priority: Priority::Medium,
            });
        }
    }

    for m in mods
        .for_employee(employee_id)
        .filter(|m| fresh(Some(m.timestamp)))
    {
        let date = if m.date_header.is_empty() {
            m.date_index.to_string()
        } else {
            m.date_header.clone()
        };
        out.push(Notification {
            id: format!("shift-{}-{}-{}", date, m.employee_id, m.timestamp.timestamp_millis()),
            kind: NotificationKind::ShiftModified,
            title: "Shift Updated".to_string(),
            message: format!(
                "Your shift on {} has been changed from {} to {}",
                date,
                shift_label(&m.old_shift),
                shift_label(&m.new_shift)
            ),
            admin_message: None,
            date,
            timestamp: m.timestamp,
            priority: Priority::High,
        });
    }

    out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    out
}
