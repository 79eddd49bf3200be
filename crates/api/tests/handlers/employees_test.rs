use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{EMPLOYEE_PASSWORD, ROSTER_CSV, TestContext, authed};

async fn seeded() -> (TestContext, String) {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.seed_roster(&tenant, ROSTER_CSV).await;
    let token = ctx.admin_token("acme").await;
    (ctx, token)
}

async fn admin_table(ctx: &TestContext, token: &str) -> Value {
    authed(ctx.server.get("/api/roster/admin"), token)
        .await
        .json::<Value>()
}

fn team_ids(roster: &Value, team: &str) -> Vec<String> {
    roster["teams"][team]
        .as_array()
        .map(|members| {
            members
                .iter()
                .map(|e| e["id"].as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_add_employee_gets_blank_schedule() {
    let (ctx, token) = seeded().await;

    let response = authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({ "name": "Dan", "id": "D4", "team": "Sales", "action": "add" }))
        .await;

    response.assert_status_ok();
    let employee = &response.json::<Value>()["employee"];
    assert_eq!(employee["currentTeam"], "Sales");
    assert_eq!(employee["schedule"], json!(["", ""]));
    assert_eq!(team_ids(&admin_table(&ctx, &token).await, "Sales"), vec!["C3", "D4"]);
}

#[tokio::test]
async fn test_add_duplicate_id_conflicts() {
    let (ctx, token) = seeded().await;

    let response = authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({ "name": "Alicia", "id": "A1", "team": "Sales", "action": "add" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_add_requires_name() {
    let (ctx, token) = seeded().await;

    let response = authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({ "name": "  ", "id": "E5", "team": "Sales", "action": "add" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_employee_limit_is_enforced() {
    let ctx = TestContext::new().await;
    let tenant = ctx.create_tenant("acme").await;
    ctx.seed_roster(&tenant, ROSTER_CSV).await;
    ctx.state
        .registry
        .update(
            &tenant.id,
            serde_json::from_value(json!({ "settings": { "max_employees": 3 } })).unwrap(),
        )
        .await
        .unwrap();
    let token = ctx.admin_token("acme").await;

    let response = authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({ "name": "Dan", "id": "D4", "team": "Sales", "action": "add" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("limited to 3"));
}

#[tokio::test]
async fn test_edit_employee_renames_everywhere() {
    let (ctx, token) = seeded().await;
    let tenant = ctx.state.registry.find_by_slug("acme").await.unwrap();
    ctx.set_employee_password(&tenant, "B7").await;

    let response = authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({
            "name": "Robert",
            "id": "B8",
            "oldId": "B7",
            "team": "Sales",
            "action": "edit"
        }))
        .await;

    response.assert_status_ok();
    let admin = admin_table(&ctx, &token).await;
    assert_eq!(team_ids(&admin, "Sales"), vec!["C3", "B8"]);
    assert_eq!(team_ids(&admin, "Support"), vec!["A1"]);

    let google = authed(ctx.server.get("/api/roster/google"), &token)
        .await
        .json::<Value>();
    assert_eq!(team_ids(&google, "Support"), vec!["A1", "B8"]);

    // The portal login follows the new id.
    ctx.employee_token("acme", "B8").await;
}

#[tokio::test]
async fn test_edited_cells_stay_protected_after_id_change() {
    let (ctx, token) = seeded().await;
    authed(ctx.server.post("/api/roster/shift"), &token)
        .json(&json!({ "employeeId": "A1", "dateIndex": 0, "newShift": "SL" }))
        .await
        .assert_status_ok();
    authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({
            "name": "Alice",
            "id": "A2",
            "oldId": "A1",
            "team": "Support",
            "action": "edit"
        }))
        .await
        .assert_status_ok();

    let upload = authed(ctx.server.post("/api/roster/upload-csv"), &token)
        .text(
            "Team,Name,ID,1Nov,2Nov\n\
             Support,Alice,A2,D1,D1\n\
             Support,Bob,B7,M3,DO\n\
             Sales,Cara,C3,D1,D1\n",
        )
        .await;
    upload.assert_status_ok();

    let admin = admin_table(&ctx, &token).await;
    let alice = admin["teams"]["Support"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "A2")
        .unwrap()
        .clone();
    assert_eq!(alice["schedule"], json!(["SL", "D1"]));

    let mods = authed(ctx.server.get("/api/settings/modified-shifts"), &token)
        .await
        .json::<Value>();
    assert_eq!(mods["modifications"][0]["employee_id"], "A2");
    assert_eq!(mods["modifications"][0]["new_shift"], "SL");
}

#[tokio::test]
async fn test_edit_onto_existing_id_conflicts() {
    let (ctx, token) = seeded().await;

    let response = authed(ctx.server.post("/api/employees"), &token)
        .json(&json!({
            "name": "Bob",
            "id": "C3",
            "oldId": "B7",
            "team": "Support",
            "action": "edit"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deactivate_and_reactivate() {
    let (ctx, token) = seeded().await;
    let tenant = ctx.state.registry.find_by_slug("acme").await.unwrap();
    ctx.set_employee_password(&tenant, "A1").await;

    let response = authed(ctx.server.post("/api/employees/deactivate"), &token)
        .json(&json!({ "employeeId": "A1" }))
        .await;
    response.assert_status_ok();
    let employee = &response.json::<Value>()["employee"];
    assert_eq!(employee["status"], "inactive");
    assert!(employee["deleted_at"].is_string());

    let admin = admin_table(&ctx, &token).await;
    assert_eq!(team_ids(&admin, "Inactive Employees"), vec!["A1"]);
    assert_eq!(team_ids(&admin, "Support"), vec!["B7"]);

    let blocked = ctx
        .server
        .post("/api/employee/login")
        .json(&json!({ "employeeId": "acme@A1", "password": EMPLOYEE_PASSWORD }))
        .await;
    blocked.assert_status(StatusCode::FORBIDDEN);

    let response = authed(ctx.server.post("/api/employees/reactivate"), &token)
        .json(&json!({ "employeeId": "A1", "targetTeam": "Sales" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["employee"]["status"], "active");
    assert_eq!(team_ids(&admin_table(&ctx, &token).await, "Sales"), vec!["C3", "A1"]);

    ctx.employee_token("acme", "A1").await;
}

#[tokio::test]
async fn test_deactivation_ends_open_employee_sessions() {
    let (ctx, token) = seeded().await;
    let tenant = ctx.state.registry.find_by_slug("acme").await.unwrap();
    ctx.set_employee_password(&tenant, "B7").await;
    let employee = ctx.employee_token("acme", "B7").await;
    authed(ctx.server.get("/api/portal/schedule"), &employee)
        .await
        .assert_status_ok();

    authed(ctx.server.post("/api/employees/deactivate"), &token)
        .json(&json!({ "employeeId": "B7" }))
        .await
        .assert_status_ok();

    authed(ctx.server.get("/api/portal/schedule"), &employee)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    authed(ctx.server.post("/api/requests/shift-change"), &employee)
        .json(&json!({
            "date": "1Nov",
            "currentShift": "M3",
            "requestedShift": "DO",
            "reason": "Appointment"
        }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reactivate_into_inactive_team_is_rejected() {
    let (ctx, token) = seeded().await;
    authed(ctx.server.post("/api/employees/deactivate"), &token)
        .json(&json!({ "employeeId": "C3" }))
        .await
        .assert_status_ok();

    let response = authed(ctx.server.post("/api/employees/reactivate"), &token)
        .json(&json!({ "employeeId": "C3", "targetTeam": "Inactive Employees" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivate_unknown_employee() {
    let (ctx, token) = seeded().await;

    let response = authed(ctx.server.post("/api/employees/deactivate"), &token)
        .json(&json!({ "employeeId": "nobody" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_team_lifecycle() {
    let (ctx, token) = seeded().await;

    authed(ctx.server.post("/api/teams"), &token)
        .json(&json!({ "teamName": "Night Shift", "action": "add" }))
        .await
        .assert_status_ok();

    let rename = authed(ctx.server.post("/api/teams"), &token)
        .json(&json!({ "teamName": "Helpdesk", "oldName": "Support", "action": "edit" }))
        .await;
    rename.assert_status_ok();

    let admin = admin_table(&ctx, &token).await;
    assert!(admin["teams"]["Night Shift"].as_array().unwrap().is_empty());
    assert_eq!(team_ids(&admin, "Helpdesk"), vec!["A1", "B7"]);
    assert!(admin["teams"]["Support"].is_null());

    let delete = authed(ctx.server.delete("/api/teams/Helpdesk"), &token).await;
    delete.assert_status_ok();
    assert_eq!(delete.json::<Value>()["employeesMoved"], 2);
    assert_eq!(
        team_ids(&admin_table(&ctx, &token).await, "Unassigned"),
        vec!["A1", "B7"]
    );
}

#[tokio::test]
async fn test_team_errors() {
    let (ctx, token) = seeded().await;

    let missing_old = authed(ctx.server.post("/api/teams"), &token)
        .json(&json!({ "teamName": "Helpdesk", "action": "edit" }))
        .await;
    missing_old.assert_status(StatusCode::BAD_REQUEST);

    let taken = authed(ctx.server.post("/api/teams"), &token)
        .json(&json!({ "teamName": "Sales", "oldName": "Support", "action": "edit" }))
        .await;
    taken.assert_status(StatusCode::CONFLICT);

    let unknown = authed(ctx.server.delete("/api/teams/Marketing"), &token).await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_password_enables_login() {
    let (ctx, token) = seeded().await;

    let short = authed(ctx.server.post("/api/employees/password"), &token)
        .json(&json!({ "employeeId": "C3", "password": "abc" }))
        .await;
    short.assert_status(StatusCode::BAD_REQUEST);

    let unknown = authed(ctx.server.post("/api/employees/password"), &token)
        .json(&json!({ "employeeId": "Z9", "password": EMPLOYEE_PASSWORD }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);

    authed(ctx.server.post("/api/employees/password"), &token)
        .json(&json!({
            "employeeId": "C3",
            "password": EMPLOYEE_PASSWORD,
            "email": "cara@example.com"
        }))
        .await
        .assert_status_ok();

    ctx.employee_token("acme", "C3").await;
    let tenant = ctx.state.registry.find_by_slug("acme").await.unwrap();
    let docs = ctx.state.store.lock_tenant(&tenant.id).await.unwrap();
    assert_eq!(
        docs.credentials().find("C3").unwrap().email.as_deref(),
        Some("cara@example.com")
    );
}

#[tokio::test]
async fn test_admin_reads_employee_profile() {
    let (ctx, token) = seeded().await;

    let response = authed(ctx.server.get("/api/employees/A1/profile"), &token).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["profile"]["employee_id"], "A1");

    let unknown = authed(ctx.server.get("/api/employees/Z9/profile"), &token).await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}
