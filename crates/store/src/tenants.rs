use chrono::{DateTime, Utc};
use eyre::Result;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use rosterdesk_core::errors::{RosterError, RosterResult};
use rosterdesk_core::models::tenant::{
    CreateTenantRequest, DeveloperUser, DevelopersFile, OrganizationSettings, Subscription,
    SubscriptionStatus, Tenant, TenantsFile, UpdateTenantRequest, validate_slug,
};

use crate::json::{load_json, write_json};
use crate::layout::DataLayout;

/// `tenants.json` and `developers.json`, cached in memory. Writers hold the
/// write lock across the mutation and the save.
#[derive(Debug)]
pub struct TenantRegistry {
    layout: DataLayout,
    tenants: RwLock<TenantsFile>,
    developers: RwLock<DevelopersFile>,
}

impl TenantRegistry {
    pub async fn open(layout: DataLayout) -> Result<Self> {
        let tenants: TenantsFile = load_json(&layout.tenants_file()).await?.into_inner();
        let developers: DevelopersFile = load_json(&layout.developers_file()).await?.into_inner();
        debug!(
            "Tenant registry opened: {} tenants, {} developers",
            tenants.tenants.len(),
            developers.developers.len()
        );
        Ok(Self {
            layout,
            tenants: RwLock::new(tenants),
            developers: RwLock::new(developers),
        })
    }

    pub async fn list(&self) -> Vec<Tenant> {
        self.tenants.read().await.tenants.clone()
    }

    pub async fn get(&self, tenant_id: &str) -> Option<Tenant> {
        self.tenants
            .read()
            .await
            .tenants
            .iter()
            .find(|t| t.id == tenant_id)
            .cloned()
    }

    pub async fn require(&self, tenant_id: &str) -> RosterResult<Tenant> {
        self.get(tenant_id)
            .await
            .ok_or_else(|| RosterError::not_found(format!("Tenant {}", tenant_id)))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Option<Tenant> {
        let slug = slug.trim().to_ascii_lowercase();
        self.tenants
            .read()
            .await
            .tenants
            .iter()
            .find(|t| t.slug == slug)
            .cloned()
    }

    pub async fn create(&self, request: CreateTenantRequest, now: DateTime<Utc>) -> RosterResult<Tenant> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(RosterError::validation("Tenant name is required"));
        }
        let slug = request.slug.trim().to_ascii_lowercase();
        validate_slug(&slug)?;

        let mut file = self.tenants.write().await;
        if file.tenants.iter().any(|t| t.slug == slug) {
            return Err(RosterError::Conflict(format!("Slug {} is already taken", slug)));
        }

        let tenant = Tenant {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            created_at: now,
            is_active: true,
            settings: OrganizationSettings {
                organization_name: None,
                logo_url: None,
                max_users: request.max_users,
                max_employees: request.max_employees,
            },
            subscription: request.plan.map(|plan| Subscription {
                plan,
                status: SubscriptionStatus::Pending,
                created_at: now,
                started_at: None,
                expires_at: None,
            }),
            contact_email: request.contact_email.filter(|e| !e.trim().is_empty()),
            contact_phone: request.contact_phone.filter(|p| !p.trim().is_empty()),
        };

        tokio::fs::create_dir_all(self.layout.tenant(&tenant.id)?.dir())
            .await
            .map_err(|e| RosterError::Storage(eyre::eyre!("Failed to create tenant directory: {}", e)))?;
        file.tenants.push(tenant.clone());
        write_json(&self.layout.tenants_file(), &*file).await?;

        info!("Created tenant {} ({})", tenant.slug, tenant.id);
        Ok(tenant)
    }

    /// Applies `update` to the tenant and persists the registry.
    pub async fn update(&self, tenant_id: &str, update: UpdateTenantRequest) -> RosterResult<Tenant> {
        let mut file = self.tenants.write().await;

        let slug = match update.slug.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            Some(slug) => {
                validate_slug(&slug)?;
                if file.tenants.iter().any(|t| t.slug == slug && t.id != tenant_id) {
                    return Err(RosterError::Conflict(format!("Slug {} is already taken", slug)));
                }
                Some(slug)
            }
            None => None,
        };

        let tenant = file
            .tenants
            .iter_mut()
            .find(|t| t.id == tenant_id)
            .ok_or_else(|| RosterError::not_found(format!("Tenant {}", tenant_id)))?;
        if let Some(name) = update.name.map(|n| n.trim().to_string()) {
            if name.is_empty() {
                return Err(RosterError::validation("Tenant name cannot be empty"));
            }
            tenant.name = name;
        }
        if let Some(slug) = slug {
            tenant.slug = slug;
        }
        if let Some(is_active) = update.is_active {
            tenant.is_active = is_active;
        }
        if let Some(settings) = update.settings {
            tenant.settings = settings;
        }
        let updated = tenant.clone();

        write_json(&self.layout.tenants_file(), &*file).await?;
        info!("Updated tenant {}", tenant_id);
        Ok(updated)
    }

    pub async fn set_active(&self, tenant_id: &str, is_active: bool) -> RosterResult<Tenant> {
        self.update(
            tenant_id,
            UpdateTenantRequest {
                is_active: Some(is_active),
                ..UpdateTenantRequest::default()
            },
        )
        .await
    }

    pub async fn set_organization_name(&self, tenant_id: &str, name: &str) -> RosterResult<Tenant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::validation("Organization name is required"));
        }
        let mut settings = self.require(tenant_id).await?.settings;
        settings.organization_name = Some(name.to_string());
        self.update(
            tenant_id,
            UpdateTenantRequest {
                settings: Some(settings),
                ..UpdateTenantRequest::default()
            },
        )
        .await
    }

    pub async fn activate_subscription(&self, tenant_id: &str, now: DateTime<Utc>) -> RosterResult<Tenant> {
        let mut file = self.tenants.write().await;
        let tenant = file
            .tenants
            .iter_mut()
            .find(|t| t.id == tenant_id)
            .ok_or_else(|| RosterError::not_found(format!("Tenant {}", tenant_id)))?;
        let subscription = tenant
            .subscription
            .as_mut()
            .ok_or_else(|| RosterError::validation("Tenant has no subscription"))?;
        subscription.activate(now);
        tenant.is_active = true;
        let updated = tenant.clone();

        write_json(&self.layout.tenants_file(), &*file).await?;
        info!("Activated subscription for tenant {}", tenant_id);
        Ok(updated)
    }

    pub async fn find_developer(&self, username: &str) -> Option<DeveloperUser> {
        self.developers
            .read()
            .await
            .developers
            .iter()
            .find(|d| d.username.eq_ignore_ascii_case(username))
            .cloned()
    }

    pub async fn add_developer(&self, developer: DeveloperUser) -> RosterResult<()> {
        let mut file = self.developers.write().await;
        if file
            .developers
            .iter()
            .any(|d| d.username.eq_ignore_ascii_case(&developer.username))
        {
            return Err(RosterError::Conflict(format!(
                "Developer {} already exists",
                developer.username
            )));
        }
        info!("Added developer {}", developer.username);
        file.developers.push(developer);
        write_json(&self.layout.developers_file(), &*file).await?;
        Ok(())
    }
}
