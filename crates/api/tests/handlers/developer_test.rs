use axum::http::{StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{ROSTER_CSV, TestContext, authed};

#[tokio::test]
async fn test_developer_routes_need_developer_session() {
    let ctx = TestContext::new().await;
    ctx.create_tenant("acme").await;
    let admin = ctx.admin_token("acme").await;

    ctx.server
        .get("/api/developer/tenants")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    authed(ctx.server.get("/api/developer/tenants"), &admin)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let developer = ctx.developer_token().await;
    authed(ctx.server.get("/api/roster/display"), &developer)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_tenant() {
    let ctx = TestContext::new().await;
    let developer = ctx.developer_token().await;

    let response = authed(ctx.server.post("/api/developer/tenants"), &developer)
        .json(&json!({
            "name": "Globex",
            "slug": "Globex-West",
            "plan": "yearly",
            "max_users": 2,
            "contact_email": "ops@globex.example"
        }))
        .await;

    response.assert_status_ok();
    let tenant = &response.json::<Value>()["tenant"];
    assert_eq!(tenant["slug"], "globex-west");
    assert_eq!(tenant["is_active"], true);
    assert_eq!(tenant["settings"]["max_users"], 2);
    assert_eq!(tenant["subscription"]["plan"], "yearly");
    assert_eq!(tenant["subscription"]["status"], "pending");

    let list = authed(ctx.server.get("/api/developer/tenants"), &developer)
        .await
        .json::<Value>();
    assert_eq!(list["tenants"].as_array().unwrap().len(), 1);

    let info = ctx.server.get("/api/public/tenants/globex-west").await;
    info.assert_status_ok();
    assert_eq!(info.json::<Value>()["organization_name"], "Globex");
}

#[tokio::test]
async fn test_create_tenant_validation() {
    let ctx = TestContext::new().await;
    ctx.create_tenant("acme").await;
    let developer = ctx.developer_token().await;

    let taken = authed(ctx.server.post("/api/developer/tenants"), &developer)
        .json(&json!({ "name": "Other Acme", "slug": "ACME" }))
        .await;
    taken.assert_status(StatusCode::CONFLICT);

    let bad_slug = authed(ctx.server.post("/api/developer/tenants"), &developer)
        .json(&json!({ "name": "Spaces", "slug": "has spaces" }))
        .await;
    bad_slug.assert_status(StatusCode::BAD_REQUEST);

    let no_name = authed(ctx.server.post("/api/developer/tenants"), &developer)
        .json(&json!({ "name": " ", "slug": "blank" }))
        .await;
    no_name.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_tenant() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.create_tenant("globex").await;
    let developer = ctx.developer_token().await;
    let path = format!("/api/developer/tenants/{}", tenant.id);

    let renamed = authed(ctx.server.put(&path), &developer)
        .json(&json!({ "name": "Acme Corp", "slug": "acme-corp" }))
        .await;
    renamed.assert_status_ok();
    assert_eq!(renamed.json::<Value>()["tenant"]["slug"], "acme-corp");

    let clash = authed(ctx.server.put(&path), &developer)
        .json(&json!({ "slug": "globex" }))
        .await;
    clash.assert_status(StatusCode::CONFLICT);

    let unknown = authed(ctx.server.put("/api/developer/tenants/missing"), &developer)
        .json(&json!({ "name": "Nobody" }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivate_and_activate_tenant() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    let admin = ctx.admin_token("acme").await;
    let developer = ctx.developer_token().await;

    let response = authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/deactivate", tenant.id)),
        &developer,
    )
    .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["tenant"]["is_active"], false);
    assert!(!ctx.state.store.is_cached(&tenant.id).await);

    authed(ctx.server.get("/api/roster/display"), &admin)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    ctx.server
        .get("/api/public/tenants/acme")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/activate", tenant.id)),
        &developer,
    )
    .await
    .assert_status_ok();

    authed(ctx.server.get("/api/roster/display"), &admin)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_admin_users() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    let developer = ctx.developer_token().await;
    let path = format!("/api/developer/tenants/{}/admins", tenant.id);

    let created = authed(ctx.server.post(&path), &developer)
        .json(&json!({ "username": "maria", "password": "maria-secret", "full_name": "Maria" }))
        .await;
    created.assert_status_ok();
    let user = &created.json::<Value>()["user"];
    assert_eq!(user["username"], "maria");
    assert_eq!(user["role"], "admin");
    assert!(user["password_hash"].is_null());

    let duplicate = authed(ctx.server.post(&path), &developer)
        .json(&json!({ "username": "MARIA", "password": "another-secret" }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let weak = authed(ctx.server.post(&path), &developer)
        .json(&json!({ "username": "lee", "password": "123" }))
        .await;
    weak.assert_status(StatusCode::BAD_REQUEST);

    let list = authed(ctx.server.get(&path), &developer)
        .await
        .json::<Value>();
    let names: Vec<&str> = list["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "maria"]);

    ctx.server
        .post("/api/admin/login")
        .json(&json!({ "tenantSlug": "acme", "username": "maria", "password": "maria-secret" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_admin_user_limit() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.state
        .registry
        .update(
            &tenant.id,
            serde_json::from_value(json!({ "settings": { "max_users": 1 } })).unwrap(),
        )
        .await
        .unwrap();
    let developer = ctx.developer_token().await;

    let response = authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/admins", tenant.id)),
        &developer,
    )
    .json(&json!({ "username": "maria", "password": "maria-secret" }))
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tenant_summary() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.seed_roster(&tenant, ROSTER_CSV).await;
    let admin = ctx.admin_token("acme").await;
    authed(ctx.server.post("/api/employees/deactivate"), &admin)
        .json(&json!({ "employeeId": "C3" }))
        .await
        .assert_status_ok();
    let developer = ctx.developer_token().await;

    let response = authed(
        ctx.server
            .get(&format!("/api/developer/tenants/{}/summary", tenant.id)),
        &developer,
    )
    .await;

    response.assert_status_ok();
    let summary = &response.json::<Value>()["summary"];
    assert_eq!(summary["employee_count"], 3);
    assert_eq!(summary["active_employee_count"], 2);
    assert_eq!(summary["pending_requests"], 0);
    assert_eq!(summary["admin_user_count"], 1);
    assert_eq!(summary["tenant"]["slug"], "acme");
}

#[tokio::test]
async fn test_activate_subscription() {
    let ctx = TestContext::new().await;
    let developer = ctx.developer_token().await;
    let created = authed(ctx.server.post("/api/developer/tenants"), &developer)
        .json(&json!({ "name": "Initech", "slug": "initech", "plan": "monthly" }))
        .await
        .json::<Value>();
    let id = created["tenant"]["id"].as_str().unwrap().to_string();
    let plain = ctx.create_tenant("acme").await;

    let response = authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/subscription/activate", id)),
        &developer,
    )
    .await;

    response.assert_status_ok();
    let subscription = &response.json::<Value>()["tenant"]["subscription"];
    assert_eq!(subscription["status"], "active");
    assert!(subscription["started_at"].is_string());
    assert!(subscription["expires_at"].is_string());

    let no_plan = authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/subscription/activate", plain.id)),
        &developer,
    )
    .await;
    no_plan.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_tenant_clears_edits_and_requests() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.seed_roster(&tenant, ROSTER_CSV).await;
    ctx.set_employee_password(&tenant, "A1").await;
    let alice = ctx.employee_token("acme", "A1").await;
    authed(ctx.server.post("/api/requests/shift-change"), &alice)
        .json(&json!({
            "date": "1Nov",
            "currentShift": "M2",
            "requestedShift": "DO",
            "reason": "Doctor appointment"
        }))
        .await
        .assert_status_ok();
    let developer = ctx.developer_token().await;

    let response = authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/reset", tenant.id)),
        &developer,
    )
    .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    let docs = ctx.state.store.lock_tenant(&tenant.id).await.unwrap();
    assert_eq!(docs.admin().employee_count(), 0);
    assert!(docs.requests().shift_change_requests.is_empty());
    assert_eq!(docs.requests().pending_count, 0);
    assert!(docs.modified_shifts().modifications.is_empty());
    // The imported table survives and still feeds the display view.
    assert_eq!(docs.google().employee_count(), 3);
    assert_eq!(docs.display().employee_count(), 3);
    assert!(docs.credentials().find("A1").is_some());
}

#[tokio::test]
async fn test_export_tenant() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.seed_roster(&tenant, ROSTER_CSV).await;
    let developer = ctx.developer_token().await;

    let response = authed(
        ctx.server
            .get(&format!("/api/developer/tenants/{}/export", tenant.id)),
        &developer,
    )
    .await;

    response.assert_status_ok();
    let disposition = response.header(header::CONTENT_DISPOSITION);
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"tenant-acme-export-"));
    assert!(disposition.ends_with(".json\""));

    let body = response.json::<Value>();
    assert_eq!(body["tenant"]["slug"], "acme");
    assert_eq!(body["admin_users"][0]["username"], "admin");
    assert!(body["admin_users"][0]["password_hash"].is_null());
    assert_eq!(body["employees"].as_array().unwrap().len(), 3);
    assert_eq!(body["schedule_requests"]["stats"]["pending_count"], 0);
    assert_eq!(body["export_metadata"]["exported_by"], "devon");
    assert_eq!(body["export_metadata"]["version"], "1.0");

    authed(
        ctx.server.get("/api/developer/tenants/missing/export"),
        &developer,
    )
    .await
    .assert_status(StatusCode::NOT_FOUND);
}
