use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RosterError, RosterResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_employees: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn term(self) -> Months {
        match self {
            SubscriptionPlan::Monthly => Months::new(1),
            SubscriptionPlan::Yearly => Months::new(12),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Starts the paid term at `now`.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Active;
        self.started_at = Some(now);
        self.expires_at = now.checked_add_months(self.plan.term());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub settings: OrganizationSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

impl Tenant {
    /// Name shown to users: the configured organization name, or the tenant name.
    pub fn display_name(&self) -> &str {
        self.settings
            .organization_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantsFile {
    #[serde(default)]
    pub tenants: Vec<Tenant>,
}

/// Slugs are used in URLs and employee logins (`slug@employee`).
pub fn validate_slug(slug: &str) -> RosterResult<()> {
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if slug.len() < 2 || slug.len() > 63 || !valid_chars || slug.starts_with('-') || slug.ends_with('-') {
        return Err(RosterError::validation(format!(
            "Invalid slug \"{}\": use 2-63 lowercase letters, digits or hyphens",
            slug
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub username: String,
    pub password_hash: String,
    #[serde(default = "default_admin_role")]
    pub role: String,
    #[serde(default)]
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub tenant_id: String,
}

fn default_admin_role() -> String {
    "admin".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUsersFile {
    #[serde(default)]
    pub users: Vec<AdminUser>,
}

impl AdminUsersFile {
    /// Usernames are matched case-insensitively.
    pub fn find(&self, username: &str) -> Option<&AdminUser> {
        self.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username.trim()))
    }

    pub fn add(&mut self, user: AdminUser) -> RosterResult<()> {
        if user.username.trim().is_empty() {
            return Err(RosterError::validation("Username is required"));
        }
        if self.find(&user.username).is_some() {
            return Err(RosterError::Conflict(format!(
                "Admin user {} already exists",
                user.username
            )));
        }
        self.users.push(user);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperUser {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevelopersFile {
    #[serde(default)]
    pub developers: Vec<DeveloperUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub max_users: Option<u32>,
    #[serde(default)]
    pub max_employees: Option<u32>,
    #[serde(default)]
    pub plan: Option<SubscriptionPlan>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Public signup form. Every field may be missing on the wire so the handler
/// can answer with one validation message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub plan: Option<SubscriptionPlan>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTenantRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub settings: Option<OrganizationSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserResponse {
    pub username: String,
    pub role: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub tenant_id: String,
}

impl From<&AdminUser> for AdminUserResponse {
    fn from(user: &AdminUser) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role.clone(),
            full_name: user.full_name.clone(),
            created_at: user.created_at,
            tenant_id: user.tenant_id.clone(),
        }
    }
}

/// Public view of a tenant, served to the login pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantInfo {
    pub name: String,
    pub slug: String,
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl From<&Tenant> for TenantInfo {
    fn from(tenant: &Tenant) -> Self {
        Self {
            name: tenant.name.clone(),
            slug: tenant.slug.clone(),
            organization_name: tenant.display_name().to_string(),
            logo_url: tenant.settings.logo_url.clone(),
        }
    }
}

/// Developer-console roll-up of a tenant's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSummary {
    pub tenant: Tenant,
    pub employee_count: usize,
    pub active_employee_count: usize,
    pub team_count: usize,
    pub pending_requests: u64,
    pub admin_user_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    /// Optional when the username is unique across tenants.
    #[serde(default)]
    pub tenant_slug: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperLoginRequest {
    pub username: String,
    pub password: String,
}
