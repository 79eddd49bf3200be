use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{EMPLOYEE_PASSWORD, ROSTER_CSV, TestContext, authed};

async fn employee(id: &str) -> (TestContext, String) {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.seed_roster(&tenant, ROSTER_CSV).await;
    ctx.set_employee_password(&tenant, id).await;
    let token = ctx.employee_token("acme", id).await;
    (ctx, token)
}

#[tokio::test]
async fn test_my_schedule_lists_active_teammates() {
    let (ctx, token) = employee("A1").await;

    let response = authed(ctx.server.get("/api/portal/schedule"), &token).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["employee"]["id"], "A1");
    assert_eq!(body["employee"]["schedule"], json!(["M2", "D1"]));
    assert_eq!(body["headers"], json!(["1Nov", "2Nov"]));
    assert_eq!(body["shiftDefinitions"]["M2"], "8 AM – 5 PM");
    let teammates = body["teammates"].as_array().unwrap();
    assert_eq!(teammates.len(), 1);
    assert_eq!(teammates[0]["id"], "B7");
}

#[tokio::test]
async fn test_my_schedule_requires_employee_session() {
    let ctx = TestContext::new().await;
    ctx.create_tenant("acme").await;
    let admin = ctx.admin_token("acme").await;

    let response = authed(ctx.server.get("/api/portal/schedule"), &admin).await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_change_password() {
    let (ctx, token) = employee("B7").await;

    let wrong = authed(ctx.server.post("/api/portal/password"), &token)
        .json(&json!({ "currentPassword": "guess", "newPassword": "brand-new-secret" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);

    let short = authed(ctx.server.post("/api/portal/password"), &token)
        .json(&json!({ "currentPassword": EMPLOYEE_PASSWORD, "newPassword": "123" }))
        .await;
    short.assert_status(StatusCode::BAD_REQUEST);

    authed(ctx.server.post("/api/portal/password"), &token)
        .json(&json!({ "currentPassword": EMPLOYEE_PASSWORD, "newPassword": "brand-new-secret" }))
        .await
        .assert_status_ok();

    let old = ctx
        .server
        .post("/api/employee/login")
        .json(&json!({ "employeeId": "acme@B7", "password": EMPLOYEE_PASSWORD }))
        .await;
    old.assert_status(StatusCode::UNAUTHORIZED);

    let new = ctx
        .server
        .post("/api/employee/login")
        .json(&json!({ "employeeId": "acme@B7", "password": "brand-new-secret" }))
        .await;
    new.assert_status_ok();
}

#[tokio::test]
async fn test_profile_update_and_clear() {
    let (ctx, token) = employee("C3").await;

    let empty = authed(ctx.server.get("/api/portal/profile"), &token).await;
    empty.assert_status_ok();
    assert_eq!(
        empty.json::<Value>()["profile"],
        json!({ "employee_id": "C3" })
    );

    let updated = authed(ctx.server.put("/api/portal/profile"), &token)
        .json(&json!({ "phone": " 555-0100 ", "address": "1 Main St" }))
        .await;
    updated.assert_status_ok();
    let profile = &updated.json::<Value>()["profile"];
    assert_eq!(profile["phone"], "555-0100");
    assert_eq!(profile["address"], "1 Main St");
    assert!(profile["updated_at"].is_string());

    authed(ctx.server.put("/api/portal/profile"), &token)
        .json(&json!({ "address": "" }))
        .await
        .assert_status_ok();

    let reread = authed(ctx.server.get("/api/portal/profile"), &token)
        .await
        .json::<Value>();
    assert_eq!(reread["profile"]["phone"], "555-0100");
    assert!(reread["profile"]["address"].is_null());

    // Admins see the same stored profile.
    let admin = ctx.admin_token("acme").await;
    let seen = authed(ctx.server.get("/api/employees/C3/profile"), &admin)
        .await
        .json::<Value>();
    assert_eq!(seen["profile"]["phone"], "555-0100");
}

#[tokio::test]
async fn test_deactivated_tenant_locks_out_employees() {
    let (ctx, token) = employee("A1").await;
    let tenant = ctx.state.registry.find_by_slug("acme").await.unwrap();
    let developer = ctx.developer_token().await;

    authed(
        ctx.server
            .post(&format!("/api/developer/tenants/{}/deactivate", tenant.id)),
        &developer,
    )
    .await
    .assert_status_ok();

    let response = authed(ctx.server.get("/api/portal/schedule"), &token).await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_notifications_until_marked_read() {
    let (ctx, token) = employee("A1").await;
    let admin = ctx.admin_token("acme").await;

    let empty = authed(ctx.server.get("/api/portal/notifications"), &token)
        .await
        .json::<Value>();
    assert_eq!(empty["count"], 0);

    let request = authed(ctx.server.post("/api/requests/shift-change"), &token)
        .json(&json!({
            "date": "1Nov",
            "currentShift": "M2",
            "requestedShift": "DO",
            "reason": "Doctor appointment"
        }))
        .await
        .json::<Value>();
    authed(ctx.server.post("/api/requests/status"), &admin)
        .json(&json!({
            "requestId": request["request"]["id"],
            "status": "approved",
            "adminMessage": "Get well"
        }))
        .await
        .assert_status_ok();

    let response = authed(ctx.server.get("/api/portal/notifications"), &token).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["count"], 2);
    assert_eq!(body["unreadCount"], 2);
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications[0]["type"], "request_approved");
    assert_eq!(
        notifications[0]["message"],
        "Your shift change request for 1Nov has been approved. Message from admin: Get well"
    );
    assert_eq!(notifications[1]["type"], "shift_modified");
    assert_eq!(
        notifications[1]["message"],
        "Your shift on 1Nov has been changed from M2 to DO"
    );

    authed(ctx.server.post("/api/portal/notifications/read"), &token)
        .await
        .assert_status_ok();

    let cleared = authed(ctx.server.get("/api/portal/notifications"), &token)
        .await
        .json::<Value>();
    assert_eq!(cleared["count"], 0);
    assert_eq!(cleared["notifications"], json!([]));
}
