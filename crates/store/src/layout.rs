use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, eyre};
use tracing::info;

pub const TENANTS_FILE: &str = "tenants.json";
pub const DEVELOPERS_FILE: &str = "developers.json";
pub const TENANTS_DIR: &str = "tenants";

pub const GOOGLE_DATA_FILE: &str = "google_data.json";
pub const ADMIN_DATA_FILE: &str = "admin_data.json";
pub const DISPLAY_DATA_FILE: &str = "display_data.json";
pub const MODIFIED_SHIFTS_FILE: &str = "modified_shifts.json";
pub const SCHEDULE_REQUESTS_FILE: &str = "schedule_requests.json";
pub const GOOGLE_LINKS_FILE: &str = "google_links.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const EMPLOYEE_CREDENTIALS_FILE: &str = "employee_credentials.json";
pub const ADMIN_USERS_FILE: &str = "admin_users.json";
pub const READ_NOTIFICATIONS_FILE: &str = "read_notifications.json";
pub const EMPLOYEES_DIR: &str = "employees";

/// Root of the on-disk data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tenants_file(&self) -> PathBuf {
        self.root.join(TENANTS_FILE)
    }

    pub fn developers_file(&self) -> PathBuf {
        self.root.join(DEVELOPERS_FILE)
    }

    pub fn tenant(&self, tenant_id: &str) -> Result<TenantPaths> {
        ensure_file_name(tenant_id, "tenant id")?;
        Ok(TenantPaths {
            dir: self.root.join(TENANTS_DIR).join(tenant_id),
        })
    }
}

/// Files of one tenant, all under `data/tenants/<id>/`.
#[derive(Debug, Clone)]
pub struct TenantPaths {
    dir: PathBuf,
}

impl TenantPaths {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn profile(&self, employee_id: &str) -> Result<PathBuf> {
        ensure_file_name(employee_id, "employee id")?;
        Ok(self
            .dir
            .join(EMPLOYEES_DIR)
            .join(format!("{}.profile.json", employee_id)))
    }
}

/// Ids end up in paths; refuse anything that could escape the data directory.
fn ensure_file_name(value: &str, what: &str) -> Result<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(eyre!("Invalid {}: {:?}", what, value));
    }
    Ok(())
}

/// Creates the data directory skeleton. Existing files are left untouched.
pub async fn initialize_data_dir(layout: &DataLayout) -> Result<()> {
    info!("Initializing data directory at {}", layout.root().display());

    tokio::fs::create_dir_all(layout.root().join(TENANTS_DIR))
        .await
        .wrap_err("Failed to create tenants directory")?;

    for path in [layout.tenants_file(), layout.developers_file()] {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        let empty = if path.ends_with(TENANTS_FILE) {
            serde_json::json!({ "tenants": [] })
        } else {
            serde_json::json!({ "developers": [] })
        };
        crate::json::write_json(&path, &empty).await?;
        info!("Created {}", path.display());
    }

    Ok(())
}
