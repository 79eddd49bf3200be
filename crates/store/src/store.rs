use std::collections::HashMap;
use std::sync::Arc;

use eyre::Result;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use crate::documents::TenantDocuments;
use crate::layout::DataLayout;

pub type TenantGuard = OwnedMutexGuard<TenantDocuments>;

/// Tenant-scoped document cache.
///
/// Each tenant gets its own mutex; holding the guard serializes every
/// load-mutate-save sequence for that tenant while other tenants proceed.
#[derive(Debug)]
pub struct FileStore {
    layout: DataLayout,
    tenants: RwLock<HashMap<String, Arc<Mutex<TenantDocuments>>>>,
}

impl FileStore {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            tenants: RwLock::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    async fn slot(&self, tenant_id: &str) -> Result<Arc<Mutex<TenantDocuments>>> {
        if let Some(slot) = self.tenants.read().await.get(tenant_id) {
            return Ok(slot.clone());
        }
        let paths = self.layout.tenant(tenant_id)?;
        let mut tenants = self.tenants.write().await;
        let slot = tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TenantDocuments::unloaded(tenant_id, paths))));
        Ok(slot.clone())
    }

    /// Locks the tenant's documents, reading them from disk on first access.
    pub async fn lock_tenant(&self, tenant_id: &str) -> Result<TenantGuard> {
        let mut guard = self.slot(tenant_id).await?.lock_owned().await;
        if !guard.is_loaded() {
            guard.load().await?;
        }
        Ok(guard)
    }

    /// Ensures the tenant is cached. A no-op when it already is.
    pub async fn load_all_for_tenant(&self, tenant_id: &str) -> Result<()> {
        self.lock_tenant(tenant_id).await.map(drop)
    }

    /// Re-reads every document of the tenant from disk.
    pub async fn reload_all_for_tenant(&self, tenant_id: &str) -> Result<TenantGuard> {
        let mut guard = self.slot(tenant_id).await?.lock_owned().await;
        debug!("Reloading tenant {} from disk", tenant_id);
        guard.load().await?;
        Ok(guard)
    }

    /// Drops the cached documents; the next access reads from disk again.
    pub async fn clear_tenant_cache_for_tenant(&self, tenant_id: &str) {
        if self.tenants.write().await.remove(tenant_id).is_some() {
            info!("Evicted tenant {} from the cache", tenant_id);
        }
    }

    pub async fn is_cached(&self, tenant_id: &str) -> bool {
        self.tenants.read().await.contains_key(tenant_id)
    }
}
