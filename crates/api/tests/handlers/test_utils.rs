use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use chrono::Utc;
use rosterdesk_api::{
    ApiState, build_router,
    config::ApiConfig,
    middleware::auth::hash_password,
};
use rosterdesk_core::{
    csv::import_csv,
    merge::sync_google_into_admin,
    models::tenant::{AdminUser, CreateTenantRequest, DeveloperUser, Tenant},
};
use rosterdesk_store::mock::MockSheetSource;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const DEVELOPER_PASSWORD: &str = "dev-secret";
pub const EMPLOYEE_PASSWORD: &str = "employee-secret";

pub const ROSTER_CSV: &str = "November Roster,,,,\n\
                              Team,Name,ID,1Nov,2Nov\n\
                              ,,Date,,\n\
                              Support,Alice,A1,M2,D1\n\
                              ,Bob,B7,M3,DO\n\
                              Sales,Cara,C3,D1,D1\n";

pub struct TestContext {
    // Keeps the data directory alive for the duration of the test
    pub dir: TempDir,
    pub state: Arc<ApiState>,
    pub server: TestServer,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_sheets(MockSheetSource::new()).await
    }

    // Build state on a fresh data directory with the given sheet source
    pub async fn with_sheets(sheets: MockSheetSource) -> Self {
        let dir = TempDir::new().unwrap();
        let config = ApiConfig::for_data_dir(dir.path());
        let state = Arc::new(
            ApiState::with_sheet_source(config, Arc::new(sheets))
                .await
                .unwrap(),
        );
        let server = TestServer::new(build_router(state.clone())).unwrap();
        Self { dir, state, server }
    }

    /// Creates an active tenant with one admin user named `admin`.
    pub async fn create_tenant(&self, slug: &str) -> Tenant {
        let tenant = self
            .state
            .registry
            .create(
                CreateTenantRequest {
                    name: format!("{} Inc", slug),
                    slug: slug.to_string(),
                    max_users: None,
                    max_employees: None,
                    plan: None,
                    contact_email: None,
                    contact_phone: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let mut docs = self.state.store.lock_tenant(&tenant.id).await.unwrap();
        docs.admin_users_mut()
            .add(AdminUser {
                username: "admin".to_string(),
                password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
                role: "admin".to_string(),
                full_name: "Ada Admin".to_string(),
                created_at: Utc::now(),
                tenant_id: tenant.id.clone(),
            })
            .unwrap();
        docs.save_admin_users().await.unwrap();
        tenant
    }

    /// Imports `csv` into the tenant's Google table and merges it into Admin.
    pub async fn seed_roster(&self, tenant: &Tenant, csv: &str) {
        let mut docs = self.state.store.lock_tenant(&tenant.id).await.unwrap();
        import_csv(docs.google_mut(), csv).unwrap();
        {
            let (google, admin, mods) = docs.sync_parts();
            sync_google_into_admin(google, admin, mods);
        }
        docs.save_google().await.unwrap();
        docs.save_admin().await.unwrap();
        docs.merge_display_for_tenant().await.unwrap();
    }

    pub async fn set_employee_password(&self, tenant: &Tenant, employee_id: &str) {
        let mut docs = self.state.store.lock_tenant(&tenant.id).await.unwrap();
        docs.credentials_mut().set_password_hash(
            employee_id,
            hash_password(EMPLOYEE_PASSWORD).unwrap(),
            Utc::now(),
        );
        docs.save_credentials().await.unwrap();
    }

    pub async fn admin_token(&self, slug: &str) -> String {
        let response = self
            .server
            .post("/api/admin/login")
            .json(&json!({ "tenantSlug": slug, "username": "admin", "password": ADMIN_PASSWORD }))
            .await;
        response.assert_status_ok();
        token_of(&response.json::<Value>())
    }

    pub async fn employee_token(&self, slug: &str, employee_id: &str) -> String {
        let response = self
            .server
            .post("/api/employee/login")
            .json(&json!({
                "employeeId": format!("{}@{}", slug, employee_id),
                "password": EMPLOYEE_PASSWORD
            }))
            .await;
        response.assert_status_ok();
        token_of(&response.json::<Value>())
    }

    pub async fn developer_token(&self) -> String {
        self.state
            .registry
            .add_developer(DeveloperUser {
                username: "devon".to_string(),
                password_hash: hash_password(DEVELOPER_PASSWORD).unwrap(),
                full_name: "Devon Developer".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let response = self
            .server
            .post("/api/developer/login")
            .json(&json!({ "username": "devon", "password": DEVELOPER_PASSWORD }))
            .await;
        response.assert_status_ok();
        token_of(&response.json::<Value>())
    }
}

fn token_of(body: &Value) -> String {
    body["token"].as_str().unwrap().to_string()
}

/// `Authorization: Bearer <token>` header pair.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// `Cookie: roster_session=<token>` header pair.
pub fn session_cookie(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::COOKIE,
        HeaderValue::from_str(&format!("theme=dark; roster_session={}", token)).unwrap(),
    )
}

/// Attaches a bearer session to a request.
pub fn authed(request: TestRequest, token: &str) -> TestRequest {
    let (name, value) = bearer(token);
    request.add_header(name, value)
}
