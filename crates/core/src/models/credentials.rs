use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roster::EmployeeStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeCredential {
    pub employee_id: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeCredentialsFile {
    #[serde(default)]
    pub credentials: Vec<EmployeeCredential>,
}

impl EmployeeCredentialsFile {
    pub fn find(&self, employee_id: &str) -> Option<&EmployeeCredential> {
        self.credentials.iter().find(|c| c.employee_id == employee_id)
    }

    /// Inserts or replaces the stored hash, keeping the original creation time.
    pub fn set_password_hash(&mut self, employee_id: &str, password_hash: String, now: DateTime<Utc>) {
        match self
            .credentials
            .iter_mut()
            .find(|c| c.employee_id == employee_id)
        {
            Some(existing) => {
                existing.password_hash = password_hash;
                existing.last_updated = now;
            }
            None => self.credentials.push(EmployeeCredential {
                employee_id: employee_id.to_string(),
                password_hash,
                created_at: now,
                last_updated: now,
                email: None,
                status: EmployeeStatus::Active,
                deleted_at: None,
            }),
        }
    }

    /// Flips the credential's status. Returns false if the employee has none.
    pub fn set_status(&mut self, employee_id: &str, status: EmployeeStatus, now: DateTime<Utc>) -> bool {
        let Some(cred) = self
            .credentials
            .iter_mut()
            .find(|c| c.employee_id == employee_id)
        else {
            return false;
        };
        cred.status = status;
        cred.deleted_at = match status {
            EmployeeStatus::Active => None,
            EmployeeStatus::Inactive => Some(now),
        };
        true
    }

    pub fn rename(&mut self, old_id: &str, new_id: &str) {
        for cred in self.credentials.iter_mut().filter(|c| c.employee_id == old_id) {
            cred.employee_id = new_id.to_string();
        }
    }
}

/// Contact details an employee maintains about themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
}

impl EmployeeProfile {
    /// Applies the fields present in `update`; an empty string clears a field.
    pub fn apply(&mut self, update: UpdateProfileRequest, now: DateTime<Utc>) {
        fn merge(slot: &mut Option<String>, value: Option<String>) {
            if let Some(value) = value {
                let value = value.trim().to_string();
                *slot = if value.is_empty() { None } else { Some(value) };
            }
        }
        merge(&mut self.email, update.email);
        merge(&mut self.phone, update.phone);
        merge(&mut self.address, update.address);
        merge(&mut self.emergency_contact, update.emergency_contact);
        self.updated_at = Some(now);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeLoginRequest {
    /// Either `slug@employeeId`, `slug/employeeId`, or a bare id with `tenant_slug` set.
    pub employee_id: String,
    pub password: String,
    #[serde(default)]
    pub tenant_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEmployeePasswordRequest {
    pub employee_id: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Splits `slug@id` / `slug/id` into its parts; a bare id yields no slug.
pub fn split_tenant_login(login: &str) -> (Option<&str>, &str) {
    for sep in ['@', '/'] {
        if let Some((slug, id)) = login.split_once(sep) {
            let (slug, id) = (slug.trim(), id.trim());
            if !slug.is_empty() && !id.is_empty() && !id.contains(sep) {
                return (Some(slug), id);
            }
        }
    }
    (None, login.trim())
}
