//! CSV roster import and export.
//!
//! Layout shared with the spreadsheets admins maintain:
//!
//! ```text
//! November Roster            <- optional title/spacer rows, ignored
//! Team,Name,ID,1Nov,2Nov     <- header row
//! ,,Date,,                   <- optional spacer, skipped (no employee id)
//! Support,Alice,A1,M2,DO
//! ,Bob,B7,D1,M3              <- blank team cell continues "Support"
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::errors::{RosterError, RosterResult};
use crate::models::roster::{Employee, RosterData, UNASSIGNED_TEAM};
use crate::merge::reindex_schedule;

/// Outcome of importing a CSV into the base table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub detected_month: Option<String>,
    pub employees_imported: usize,
    pub employees_added: usize,
    pub headers_added: usize,
}

/// Splits CSV text into rows of fields. Handles quoted fields with embedded
/// separators, newlines and doubled quotes, and both `\n` and `\r\n` endings.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

fn is_header_row(row: &[String]) -> bool {
    let cell = move |i: usize| row.get(i).map(|c| c.trim()).unwrap_or("");
    cell(0).eq_ignore_ascii_case("team")
        && cell(1).eq_ignore_ascii_case("name")
        && cell(2).eq_ignore_ascii_case("id")
}

/// Builds a roster table from parsed CSV rows.
pub fn roster_from_rows(rows: &[Vec<String>]) -> RosterResult<RosterData> {
    let header_at = rows
        .iter()
        .position(|r| is_header_row(r))
        .ok_or_else(|| RosterError::validation("CSV is missing the Team,Name,ID header row"))?;

    // (csv column, header label), skipping blank and repeated labels
    let mut seen = HashSet::new();
    let columns: Vec<(usize, String)> = rows[header_at]
        .iter()
        .enumerate()
        .skip(3)
        .map(|(idx, h)| (idx, h.trim().to_string()))
        .filter(|(_, h)| !h.is_empty() && seen.insert(h.clone()))
        .collect();

    let mut roster = RosterData {
        headers: columns.iter().map(|(_, h)| h.clone()).collect(),
        ..RosterData::default()
    };
    let mut current_team: Option<String> = None;
    let mut ids = HashSet::new();

    for row in &rows[header_at + 1..] {
        let cell = move |i: usize| row.get(i).map(|c| c.trim()).unwrap_or("");
        if !cell(0).is_empty() {
            current_team = Some(cell(0).to_string());
        }
        let (name, id) = (cell(1), cell(2));
        if id.is_empty() || id.eq_ignore_ascii_case("date") || !ids.insert(id.to_string()) {
            continue;
        }
        let team = current_team.clone().unwrap_or_else(|| UNASSIGNED_TEAM.to_string());
        let mut emp = Employee::new(id, if name.is_empty() { id } else { name }, team.clone());
        emp.schedule = columns.iter().map(|(idx, _)| cell(*idx).to_string()).collect();
        roster.teams.entry(team).or_default().push(emp);
    }

    roster.normalize();
    Ok(roster)
}

/// Alphabetic month part of a date header: `"1Nov"` -> `"Nov"`.
pub fn header_month(header: &str) -> Option<&str> {
    let start = header.find(|c: char| c.is_ascii_alphabetic())?;
    let rest = &header[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

pub fn detect_month(headers: &[String]) -> Option<String> {
    headers.iter().find_map(|h| header_month(h)).map(str::to_string)
}

/// Merges an imported table into the base table. The import is authoritative
/// for every cell, name and team it carries; employees and headers it does
/// not mention are left alone.
pub fn merge_import(base: &mut RosterData, imported: &RosterData) -> ImportSummary {
    let mut summary = ImportSummary {
        detected_month: detect_month(&imported.headers),
        employees_imported: imported.employee_count(),
        headers_added: base.extend_headers(&imported.headers),
        ..ImportSummary::default()
    };

    let columns: Vec<(usize, usize)> = imported
        .headers
        .iter()
        .enumerate()
        .filter_map(|(ii, h)| base.header_index(h).map(|bi| (ii, bi)))
        .collect();
    let base_headers = base.headers.clone();

    for imp in imported.teams.values().flatten() {
        let existing = base
            .teams
            .values_mut()
            .find_map(|members| {
                members
                    .iter()
                    .position(|e| e.id == imp.id)
                    .map(|pos| members.remove(pos))
            });
        let emp = match existing {
            Some(mut emp) => {
                emp.name = imp.name.clone();
                emp.schedule.resize(base_headers.len(), String::new());
                for (ii, bi) in &columns {
                    emp.schedule[*bi] = imp.shift(*ii).to_string();
                }
                emp.current_team = imp.current_team.clone();
                emp
            }
            None => {
                summary.employees_added += 1;
                let mut emp = imp.clone();
                emp.schedule = reindex_schedule(&imp.schedule, &imported.headers, &base_headers);
                emp
            }
        };
        base.teams.entry(emp.current_team.clone()).or_default().push(emp);
    }

    base.normalize();
    summary
}

/// Parses CSV text and merges it into `base`.
pub fn import_csv(base: &mut RosterData, text: &str) -> RosterResult<ImportSummary> {
    let imported = roster_from_rows(&parse_csv(text))?;
    if imported.employee_count() == 0 {
        return Err(RosterError::validation("CSV contains no employee rows"));
    }
    Ok(merge_import(base, &imported))
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders the table as CSV. `months` keeps only headers whose month part is
/// listed (case-insensitive); `None` or an empty list exports everything.
pub fn export_csv(roster: &RosterData, months: Option<&[String]>) -> RosterResult<String> {
    if roster.headers.is_empty() {
        return Err(RosterError::validation("No data available"));
    }

    let selected: Vec<usize> = match months {
        Some(months) if !months.is_empty() => roster
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                header_month(h).is_some_and(|m| months.iter().any(|want| want.eq_ignore_ascii_case(m)))
            })
            .map(|(idx, _)| idx)
            .collect(),
        _ => (0..roster.headers.len()).collect(),
    };
    if selected.is_empty() {
        return Err(RosterError::validation("No data found for selected months"));
    }

    let mut lines = Vec::with_capacity(roster.employee_count() + 2);
    let mut header = vec!["Team".to_string(), "Name".to_string(), "ID".to_string()];
    header.extend(selected.iter().map(|&i| escape(&roster.headers[i])));
    lines.push(header.join(","));

    let mut spacer = vec![String::new(), String::new(), "Date".to_string()];
    spacer.extend(selected.iter().map(|_| String::new()));
    lines.push(spacer.join(","));

    for (team, members) in &roster.teams {
        for emp in members {
            let mut row = vec![escape(team), escape(&emp.name), escape(&emp.id)];
            row.extend(selected.iter().map(|&i| escape(emp.shift(i))));
            lines.push(row.join(","));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
