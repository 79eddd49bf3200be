//! Prepares a data directory and creates accounts without the HTTP API.
//!
//! ```text
//! provision                 # create the data directory skeleton only
//! provision developer       # DEVELOPER_USERNAME, DEVELOPER_PASSWORD
//! provision tenant          # TENANT_NAME, TENANT_SLUG, ADMIN_USERNAME,
//!                           # ADMIN_PASSWORD, optional TENANT_PLAN
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use dotenv::dotenv;
use rosterdesk_api::middleware::auth::hash_password;
use rosterdesk_core::models::tenant::{
    AdminUser, CreateTenantRequest, DeveloperUser, SubscriptionPlan,
};
use rosterdesk_store::{DataLayout, FileStore, TenantRegistry, initialize_data_dir};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| eyre!("{} must be set", name))
}

async fn provision_developer(registry: &TenantRegistry) -> Result<()> {
    let username = required_var("DEVELOPER_USERNAME")?;
    let password = required_var("DEVELOPER_PASSWORD")?;

    registry
        .add_developer(DeveloperUser {
            username: username.trim().to_string(),
            password_hash: hash_password(&password)?,
            full_name: env::var("DEVELOPER_FULL_NAME").unwrap_or_default(),
            created_at: Utc::now(),
        })
        .await
        .wrap_err("Failed to add developer")?;

    println!("Developer {} created.", username.trim());
    Ok(())
}

async fn provision_tenant(registry: &TenantRegistry, store: &FileStore) -> Result<()> {
    let plan = match env::var("TENANT_PLAN").ok().as_deref() {
        None | Some("") => None,
        Some("monthly") => Some(SubscriptionPlan::Monthly),
        Some("yearly") => Some(SubscriptionPlan::Yearly),
        Some(other) => bail!("Unknown TENANT_PLAN {}: use monthly or yearly", other),
    };
    let admin_username = required_var("ADMIN_USERNAME")?;
    let admin_password = required_var("ADMIN_PASSWORD")?;

    let now = Utc::now();
    let tenant = registry
        .create(
            CreateTenantRequest {
                name: required_var("TENANT_NAME")?,
                slug: required_var("TENANT_SLUG")?,
                max_users: None,
                max_employees: None,
                plan,
                contact_email: env::var("TENANT_CONTACT_EMAIL").ok(),
                contact_phone: None,
            },
            now,
        )
        .await
        .wrap_err("Failed to create tenant")?;

    let mut docs = store.lock_tenant(&tenant.id).await?;
    docs.admin_users_mut()
        .add(AdminUser {
            username: admin_username.trim().to_string(),
            password_hash: hash_password(&admin_password)?,
            role: "admin".to_string(),
            full_name: env::var("ADMIN_FULL_NAME").unwrap_or_default(),
            created_at: now,
            tenant_id: tenant.id.clone(),
        })
        .wrap_err("Failed to add admin user")?;
    docs.save_admin_users().await?;

    println!("Tenant {} ({}) created.", tenant.slug, tenant.id);
    println!("Admin {} can sign in at /api/admin/login.", admin_username.trim());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| Level::from_str(&l).ok())
        .unwrap_or(Level::INFO);
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())
        .wrap_err("Failed to install log subscriber")?;

    let data_dir = env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    let layout = DataLayout::new(data_dir);

    info!("Initializing data directory {}", layout.root().display());
    initialize_data_dir(&layout).await?;
    let registry = TenantRegistry::open(layout.clone()).await?;

    match env::args().nth(1).as_deref() {
        None => println!("Data directory ready."),
        Some("developer") => provision_developer(&registry).await?,
        Some("tenant") => provision_tenant(&registry, &FileStore::new(layout)).await?,
        Some(other) => bail!("Unknown command {}: use developer or tenant", other),
    }

    Ok(())
}
