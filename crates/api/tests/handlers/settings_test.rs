use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, authed};

async fn admin() -> (TestContext, String) {
    let ctx = TestContext::new().await;
    ctx.create_tenant("acme").await;
    let token = ctx.admin_token("acme").await;
    (ctx, token)
}

#[tokio::test]
async fn test_default_shift_definitions() {
    let (ctx, token) = admin().await;

    let response = authed(ctx.server.get("/api/settings/shift-definitions"), &token).await;

    response.assert_status_ok();
    let defs = &response.json::<Value>()["shiftDefinitions"];
    assert_eq!(defs["DO"], "OFF");
    assert_eq!(defs["SL"], "Sick Leave");
    assert_eq!(defs[""], "N/A");
}

#[tokio::test]
async fn test_upsert_and_delete_shift_definition() {
    let (ctx, token) = admin().await;

    let response = authed(ctx.server.post("/api/settings/shift-definitions"), &token)
        .json(&json!({ "code": " n1 ", "description": "Night 10 PM – 7 AM" }))
        .await;
    response.assert_status_ok();
    let defs = &response.json::<Value>()["shiftDefinitions"];
    assert_eq!(defs["N1"], "Night 10 PM – 7 AM");
    assert_eq!(defs["M2"], "8 AM – 5 PM");

    let deleted = authed(ctx.server.delete("/api/settings/shift-definitions/n1"), &token).await;
    deleted.assert_status_ok();
    assert!(deleted.json::<Value>()["shiftDefinitions"]["N1"].is_null());

    let again = authed(ctx.server.delete("/api/settings/shift-definitions/N1"), &token).await;
    again.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shift_definition_needs_description() {
    let (ctx, token) = admin().await;

    let response = authed(ctx.server.post("/api/settings/shift-definitions"), &token)
        .json(&json!({ "code": "X1", "description": " " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_shift_definitions() {
    let (ctx, token) = admin().await;

    let response = authed(ctx.server.put("/api/settings/shift-definitions"), &token)
        .json(&json!({ "shiftDefinitions": { "a": "Early", "b": "Late" } }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["shiftDefinitions"],
        json!({ "A": "Early", "B": "Late" })
    );

    let restored = authed(ctx.server.put("/api/settings/shift-definitions"), &token)
        .json(&json!({ "shiftDefinitions": {} }))
        .await;
    assert_eq!(restored.json::<Value>()["shiftDefinitions"]["DO"], "OFF");
}

#[tokio::test]
async fn test_auto_sync_toggle() {
    let (ctx, token) = admin().await;

    let initial = authed(ctx.server.get("/api/settings/auto-sync"), &token).await;
    assert_eq!(initial.json::<Value>()["enabled"], false);

    authed(ctx.server.post("/api/settings/auto-sync"), &token)
        .json(&json!({ "enabled": true }))
        .await
        .assert_status_ok();

    let updated = authed(ctx.server.get("/api/settings/auto-sync"), &token).await;
    assert_eq!(updated.json::<Value>()["enabled"], true);
}

#[tokio::test]
async fn test_google_links() {
    let (ctx, token) = admin().await;

    let missing_link = authed(ctx.server.post("/api/settings/google-links"), &token)
        .json(&json!({ "monthYear": "November 2025" }))
        .await;
    missing_link.assert_status(StatusCode::BAD_REQUEST);

    let added = authed(ctx.server.post("/api/settings/google-links"), &token)
        .json(&json!({ "monthYear": "November 2025", "link": " https://sheets.example/nov " }))
        .await;
    added.assert_status_ok();
    assert_eq!(
        added.json::<Value>()["links"],
        json!({ "November 2025": "https://sheets.example/nov" })
    );

    let removed = authed(
        ctx.server.delete("/api/settings/google-links/November%202025"),
        &token,
    )
    .await;
    removed.assert_status_ok();
    assert_eq!(removed.json::<Value>()["links"], json!({}));

    let again = authed(
        ctx.server.delete("/api/settings/google-links/November%202025"),
        &token,
    )
    .await;
    again.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organization_name() {
    let (ctx, token) = admin().await;

    let initial = authed(ctx.server.get("/api/settings/organization"), &token).await;
    assert_eq!(initial.json::<Value>()["organizationName"], "acme Inc");

    let renamed = authed(ctx.server.post("/api/settings/organization"), &token)
        .json(&json!({ "organizationName": "Acme Support" }))
        .await;
    renamed.assert_status_ok();
    assert_eq!(renamed.json::<Value>()["organizationName"], "Acme Support");

    let blank = authed(ctx.server.post("/api/settings/organization"), &token)
        .json(&json!({ "organizationName": "  " }))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);

    let info = ctx.server.get("/api/public/tenants/acme").await;
    assert_eq!(info.json::<Value>()["organization_name"], "Acme Support");
}

#[tokio::test]
async fn test_settings_are_tenant_scoped() {
    let ctx = TestContext::new().await;
    ctx.create_tenant("acme").await;
    ctx.create_tenant("globex").await;
    let acme = ctx.admin_token("acme").await;
    let globex = ctx.admin_token("globex").await;

    authed(ctx.server.post("/api/settings/auto-sync"), &acme)
        .json(&json!({ "enabled": true }))
        .await
        .assert_status_ok();

    let other = authed(ctx.server.get("/api/settings/auto-sync"), &globex).await;
    assert_eq!(other.json::<Value>()["enabled"], false);
}
