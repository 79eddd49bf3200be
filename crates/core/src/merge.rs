//! # Roster Merge
//!
//! Reconciles the imported base table ("Google") with the admin-edited table
//! ("Admin") and derives the display table both portals read.
//!
//! ## Rules
//!
//! - Admin owns identity: name and team of an employee present in both tables
//!   always come from Admin.
//! - Google owns cells, except cells that have a modification record. Those
//!   were edited by an admin (directly or through an approved request) and are
//!   never overwritten by a re-import.
//! - Records written before the last reset to Google no longer protect cells.
//! - Headers only grow. Google headers missing from Admin are appended and
//!   every Admin schedule is back-filled with empty cells.
//! - Schedules are re-aligned by header label, never by position, so tables
//!   with different header sets merge cleanly. Missing cells read as `""`.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{modification::ModifiedShiftsData, roster::RosterData};

/// Counts reported back to the admin after a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub employees_added: usize,
    pub headers_added: usize,
    pub cells_updated: usize,
    pub cells_kept: usize,
}

/// Re-aligns a schedule laid out for `from` headers onto `to` headers.
pub fn reindex_schedule(schedule: &[String], from: &[String], to: &[String]) -> Vec<String> {
    to.iter()
        .map(|header| {
            from.iter()
                .position(|h| h == header)
                .and_then(|idx| schedule.get(idx))
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

/// `(employee_id, date_header)` pairs that carry an admin modification.
///
/// Records older than the last reset are ignored. Older records may lack a
/// header label; their index is resolved against the admin headers.
pub fn protected_cells(mods: &ModifiedShiftsData, admin_headers: &[String]) -> HashSet<(String, String)> {
    mods.active()
        .filter_map(|m| {
            let header = if m.date_header.is_empty() {
                admin_headers.get(m.date_index)?.clone()
            } else {
                m.date_header.clone()
            };
            Some((m.employee_id.clone(), header))
        })
        .collect()
}

/// Folds freshly imported Google data into the Admin table in place.
///
/// An Admin table without employees also takes over Google's team list, so
/// empty teams from the import show up next to the ones the admin created.
pub fn sync_google_into_admin(
    google: &RosterData,
    admin: &mut RosterData,
    mods: &ModifiedShiftsData,
) -> SyncSummary {
    if admin.employee_count() == 0 {
        for team in google.teams.keys() {
            admin.teams.entry(team.clone()).or_default();
        }
    }

    let protected = protected_cells(mods, &admin.headers);
    let mut summary = SyncSummary {
        headers_added: admin.extend_headers(&google.headers),
        ..SyncSummary::default()
    };

    // (google column, admin column, header label)
    let columns: Vec<(usize, usize, String)> = google
        .headers
        .iter()
        .enumerate()
        .filter_map(|(gi, header)| {
            admin
                .header_index(header)
                .map(|ai| (gi, ai, header.clone()))
        })
        .collect();
    let admin_headers = admin.headers.clone();

    for (team, members) in &google.teams {
        for g in members {
            match admin.find_employee_mut(&g.id) {
                Some(a) => {
                    for (gi, ai, header) in &columns {
                        if protected.contains(&(g.id.clone(), header.clone())) {
                            summary.cells_kept += 1;
                            continue;
                        }
                        let value = g.shift(*gi);
                        if a.schedule[*ai] != value {
                            a.schedule[*ai] = value.to_string();
                            summary.cells_updated += 1;
                        }
                    }
                }
                None => {
                    let home = if g.current_team.is_empty() {
                        team.clone()
                    } else {
                        g.current_team.clone()
                    };
                    let mut emp = g.clone();
                    emp.schedule = reindex_schedule(&g.schedule, &google.headers, &admin_headers);
                    emp.current_team = home.clone();
                    admin.teams.entry(home).or_default().push(emp);
                    summary.employees_added += 1;
                }
            }
        }
    }

    admin.normalize();
    summary
}

/// Builds the display table: Admin over Google.
pub fn merge_display(google: &RosterData, admin: &RosterData) -> RosterData {
    let mut display = RosterData {
        headers: admin.headers.clone(),
        ..RosterData::default()
    };
    display.extend_headers(&google.headers);

    for (team, members) in &admin.teams {
        let target = display.teams.entry(team.clone()).or_default();
        for a in members {
            let mut emp = a.clone();
            emp.schedule = reindex_schedule(&a.schedule, &admin.headers, &display.headers);
            target.push(emp);
        }
    }

    let admin_ids: HashSet<&str> = admin.teams.values().flatten().map(|e| e.id.as_str()).collect();
    for (team, members) in &google.teams {
        for g in members.iter().filter(|g| !admin_ids.contains(g.id.as_str())) {
            let home = if g.current_team.is_empty() {
                team.clone()
            } else {
                g.current_team.clone()
            };
            let mut emp = g.clone();
            emp.schedule = reindex_schedule(&g.schedule, &google.headers, &display.headers);
            emp.current_team = home.clone();
            display.teams.entry(home).or_default().push(emp);
        }
    }

    display.normalize();
    display
}
