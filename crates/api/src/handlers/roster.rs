//! Roster tables, cell edits, CSV import/export and Google Sheets sync.
//!
//! Every import path feeds the Google table and then folds it into Admin
//! through the same merge, so admin-edited cells survive a re-import. Only
//! `reset_admin_to_google` replaces the Admin table wholesale.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, header},
};
use chrono::Utc;
use rosterdesk_core::{
    csv::{ImportSummary, export_csv, import_csv},
    errors::RosterError,
    merge::{SyncSummary, sync_google_into_admin},
    models::{
        modification::ModifiedShiftRecord,
        roster::{RosterData, UpdateShiftRequest},
    },
};
use rosterdesk_store::TenantGuard;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ApiResult, ApiState, handlers::Ack, middleware::auth::require_admin};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShiftResponse {
    pub success: bool,
    pub employee_id: String,
    pub date_index: usize,
    pub date_header: String,
    pub old_shift: String,
    pub new_shift: String,
    /// Whether the edit was logged as a modification of the imported value.
    pub recorded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    pub import: ImportSummary,
    pub sync: SyncSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSyncResult {
    pub month_year: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsSyncResponse {
    /// True when at least one sheet was imported.
    pub success: bool,
    pub sheets: Vec<SheetSyncResult>,
    pub sync: SyncSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub sync: SyncSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardResetResponse {
    pub success: bool,
    pub deleted_files: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSource {
    #[default]
    Display,
    Admin,
    Google,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Comma-separated month abbreviations, e.g. `Nov,Dec`.
    #[serde(default)]
    pub months: Option<String>,
    #[serde(default)]
    pub source: ExportSource,
}

/// Merges Google into Admin, then persists both tables and the display view.
async fn sync_and_persist(docs: &mut TenantGuard) -> ApiResult<SyncSummary> {
    let summary = {
        let (google, admin, mods) = docs.sync_parts();
        sync_google_into_admin(google, admin, mods)
    };
    docs.save_google().await?;
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;
    Ok(summary)
}

#[axum::debug_handler]
pub async fn get_display(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RosterData>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(docs.display().clone()))
}

#[axum::debug_handler]
pub async fn get_admin(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RosterData>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(docs.admin().clone()))
}

#[axum::debug_handler]
pub async fn get_google(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RosterData>> {
    let session = require_admin(&state, &headers).await?;
    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    Ok(Json(docs.google().clone()))
}

/// Writes one Admin cell. The edit is logged when it differs from the
/// imported value, which protects the cell from later re-imports.
#[axum::debug_handler]
pub async fn update_shift(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Result<Json<UpdateShiftRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateShiftResponse>> {
    let session = require_admin(&state, &headers).await?;
    let Json(payload) = payload?;
    let new_shift = payload.new_shift.trim().to_string();

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let edit = docs
        .admin_mut()
        .set_shift(&payload.employee_id, payload.date_index, &new_shift)?;

    let google_shift = match payload.google_shift {
        Some(shift) => shift.trim().to_string(),
        None => {
            let google = docs.google();
            google
                .header_index(&edit.date_header)
                .zip(google.find_employee(&payload.employee_id))
                .map(|(idx, emp)| emp.shift(idx).to_string())
                .unwrap_or_default()
        }
    };

    let recorded = new_shift != google_shift;
    if recorded {
        docs.modified_shifts_mut().record(ModifiedShiftRecord {
            employee_id: payload.employee_id.clone(),
            employee_name: edit.employee_name.clone(),
            team_name: edit.team_name.clone(),
            date_index: payload.date_index,
            date_header: edit.date_header.clone(),
            old_shift: edit.old_shift.clone(),
            new_shift: new_shift.clone(),
            modified_by: session.username.clone(),
            timestamp: Utc::now(),
            month_year: String::new(),
        });
        docs.save_modified_shifts().await?;
    }
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    info!(
        "Tenant {}: {} set {} @ {} from {:?} to {:?}",
        session.tenant.slug,
        session.username,
        payload.employee_id,
        edit.date_header,
        edit.old_shift,
        new_shift
    );

    Ok(Json(UpdateShiftResponse {
        success: true,
        employee_id: payload.employee_id,
        date_index: payload.date_index,
        date_header: edit.date_header,
        old_shift: edit.old_shift,
        new_shift,
        recorded,
    }))
}

/// Imports a CSV body into the Google table and merges it into Admin.
#[axum::debug_handler]
pub async fn upload_csv(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let session = require_admin(&state, &headers).await?;
    if body.trim().is_empty() {
        return Err(RosterError::validation("CSV body is empty").into());
    }

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let import = import_csv(docs.google_mut(), &body)?;
    let sync = sync_and_persist(&mut docs).await?;

    info!(
        "Tenant {}: imported {} employees from CSV ({} new in admin)",
        session.tenant.slug, import.employees_imported, sync.employees_added
    );
    Ok(Json(ImportResponse {
        success: true,
        import,
        sync,
    }))
}

#[axum::debug_handler]
pub async fn export(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<ExportQuery>,
) -> ApiResult<([(HeaderName, &'static str); 2], String)> {
    let session = require_admin(&state, &headers).await?;
    let months: Option<Vec<String>> = query.months.map(|m| {
        m.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    });

    let docs = state.store.lock_tenant(&session.tenant.id).await?;
    let roster = match query.source {
        ExportSource::Display => docs.display(),
        ExportSource::Admin => docs.admin(),
        ExportSource::Google => docs.google(),
    };
    let csv = export_csv(roster, months.as_deref())?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"roster.csv\""),
        ],
        csv,
    ))
}

/// Downloads every configured Google Sheet and imports the ones that load.
///
/// Sheets are fetched without holding the tenant lock.
#[axum::debug_handler]
pub async fn sync_google_sheets(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SheetsSyncResponse>> {
    let session = require_admin(&state, &headers).await?;
    let links = state
        .store
        .lock_tenant(&session.tenant.id)
        .await?
        .google_links()
        .clone();
    if links.is_empty() {
        return Err(RosterError::validation("No Google Sheets links are configured").into());
    }

    let mut fetched = Vec::with_capacity(links.len());
    for (month_year, link) in links {
        let result = state.sheets.fetch_csv(&link).await;
        if let Err(e) = &result {
            warn!("Tenant {}: failed to fetch {}: {:#}", session.tenant.slug, month_year, e);
        }
        fetched.push((month_year, result));
    }

    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let mut sheets = Vec::with_capacity(fetched.len());
    for (month_year, result) in fetched {
        let outcome = result
            .map_err(|e| format!("Failed to fetch sheet: {}", e))
            .and_then(|csv| import_csv(docs.google_mut(), &csv).map_err(|e| e.to_string()));
        sheets.push(match outcome {
            Ok(import) => SheetSyncResult {
                month_year,
                success: true,
                import: Some(import),
                error: None,
            },
            Err(error) => SheetSyncResult {
                month_year,
                success: false,
                import: None,
                error: Some(error),
            },
        });
    }

    let imported = sheets.iter().filter(|s| s.success).count();
    let sync = if imported > 0 {
        sync_and_persist(&mut docs).await?
    } else {
        SyncSummary::default()
    };

    info!(
        "Tenant {}: Google Sheets sync imported {}/{} sheets",
        session.tenant.slug,
        imported,
        sheets.len()
    );
    Ok(Json(SheetsSyncResponse {
        success: imported > 0,
        sheets,
        sync,
    }))
}

/// Re-runs the Google to Admin merge without importing anything new.
#[axum::debug_handler]
pub async fn sync_to_admin(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SyncResponse>> {
    let session = require_admin(&state, &headers).await?;
    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    if docs.google().is_empty() {
        return Err(RosterError::validation("No imported data to sync").into());
    }
    let sync = sync_and_persist(&mut docs).await?;
    Ok(Json(SyncResponse {
        success: true,
        sync,
    }))
}

/// Replaces the Admin table with a copy of the Google table.
///
/// Earlier modification records stay in the history but stop protecting
/// their cells, so later imports flow through until the next edit.
#[axum::debug_handler]
pub async fn reset_admin_to_google(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Ack>> {
    let session = require_admin(&state, &headers).await?;
    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    if docs.google().is_empty() {
        return Err(RosterError::validation("No imported data to reset to").into());
    }

    let google = docs.google().clone();
    docs.set_admin(google);
    docs.modified_shifts_mut().reset_at = Some(Utc::now());
    docs.save_modified_shifts().await?;
    docs.save_admin().await?;
    docs.merge_display_for_tenant().await?;

    info!("Tenant {}: {} reset admin data to the imported copy", session.tenant.slug, session.username);
    Ok(Json(Ack::new("Admin data reset to the imported roster")))
}

/// Deletes the roster, modification and request files of the tenant.
#[axum::debug_handler]
pub async fn hard_reset(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<Json<HardResetResponse>> {
    let session = require_admin(&state, &headers).await?;
    let mut docs = state.store.lock_tenant(&session.tenant.id).await?;
    let deleted_files = docs.hard_reset().await?;

    warn!("Tenant {}: hard reset by {}", session.tenant.slug, session.username);
    Ok(Json(HardResetResponse {
        success: true,
        deleted_files,
    }))
}
