use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    ShiftChange,
    Swap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftChangeRequest {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub team: String,
    pub date: String,
    pub current_shift: String,
    pub requested_shift: String,
    pub reason: String,
    pub status: RequestStatus,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub target_employee_id: String,
    pub target_employee_name: String,
    pub team: String,
    pub date: String,
    pub requester_shift: String,
    pub target_shift: String,
    pub reason: String,
    pub status: RequestStatus,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
}

/// Either kind of request, serialized as the underlying record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleRequest {
    ShiftChange(ShiftChangeRequest),
    Swap(SwapRequest),
}

impl ScheduleRequest {
    pub fn id(&self) -> &str {
        match self {
            ScheduleRequest::ShiftChange(r) => &r.id,
            ScheduleRequest::Swap(r) => &r.id,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            ScheduleRequest::ShiftChange(r) => r.status,
            ScheduleRequest::Swap(r) => r.status,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ScheduleRequest::ShiftChange(r) => r.created_at,
            ScheduleRequest::Swap(r) => r.created_at,
        }
    }

    /// True if the employee filed the request or is the other side of a swap.
    pub fn involves(&self, employee_id: &str) -> bool {
        match self {
            ScheduleRequest::ShiftChange(r) => r.employee_id == employee_id,
            ScheduleRequest::Swap(r) => {
                r.requester_id == employee_id || r.target_employee_id == employee_id
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequestsFile {
    #[serde(default)]
    pub shift_change_requests: Vec<ShiftChangeRequest>,
    #[serde(default)]
    pub swap_requests: Vec<SwapRequest>,
    #[serde(default)]
    pub approved_count: u64,
    #[serde(default)]
    pub pending_count: u64,
}

/// Shift-change submission. Every field is optional on the wire so that a
/// missing value and an empty one can be told apart during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitShiftChangeRequest {
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub team: Option<String>,
    pub date: Option<String>,
    pub current_shift: Option<String>,
    pub requested_shift: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSwapRequest {
    pub requester_id: Option<String>,
    pub requester_name: Option<String>,
    pub target_employee_id: Option<String>,
    pub target_employee_name: Option<String>,
    pub team: Option<String>,
    pub date: Option<String>,
    pub requester_shift: Option<String>,
    pub target_shift: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatusRequest {
    pub request_id: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub admin_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub requests: Vec<ScheduleRequest>,
    pub pending_count: u64,
    pub approved_count: u64,
}
