//! Roster tables: teams of employees with one shift code per date header.
//!
//! A tenant keeps three of these: the imported "Google" base, the admin-edited
//! overlay and the derived display view. All three share the same shape and the
//! same invariants, enforced by [`RosterData::normalize`]:
//!
//! - every employee listed under `teams` appears exactly once in `all_employees`
//! - an employee id appears under exactly one team
//! - every `schedule` has one cell per entry in `headers`

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RosterError, RosterResult};

/// Synthetic team that soft-deleted employees are parked in.
pub const INACTIVE_TEAM: &str = "Inactive Employees";

/// Team that receives the members of a deleted team.
pub const UNASSIGNED_TEAM: &str = "Unassigned";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub current_team: String,
    #[serde(default)]
    pub schedule: Vec<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default, rename = "deleted_at", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_team: team.into(),
            schedule: Vec::new(),
            status: EmployeeStatus::Active,
            deleted_at: None,
        }
    }

    /// Shift at `index`, treating anything past the end as an empty cell.
    pub fn shift(&self, index: usize) -> &str {
        self.schedule.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Result of writing a single schedule cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftEdit {
    pub employee_name: String,
    pub team_name: String,
    pub date_header: String,
    pub old_shift: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterData {
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<Employee>>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub all_employees: Vec<Employee>,
}

impl RosterData {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.teams.values().all(Vec::is_empty)
    }

    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn employee_count(&self) -> usize {
        self.teams.values().map(Vec::len).sum()
    }

    pub fn find_employee(&self, id: &str) -> Option<&Employee> {
        self.teams.values().flatten().find(|e| e.id == id)
    }

    pub fn find_employee_mut(&mut self, id: &str) -> Option<&mut Employee> {
        self.teams.values_mut().flatten().find(|e| e.id == id)
    }

    /// Case-insensitive lookup used by the employee login flow.
    pub fn find_employee_ignore_case(&self, id: &str) -> Option<&Employee> {
        self.teams
            .values()
            .flatten()
            .find(|e| e.id.eq_ignore_ascii_case(id))
    }

    pub fn contains_employee(&self, id: &str) -> bool {
        self.find_employee(id).is_some()
    }

    /// Restores the table invariants after arbitrary edits.
    ///
    /// When an employee shows up under more than one team (a team change that
    /// was appended rather than moved), the copy filed under its own
    /// `current_team` wins; otherwise the first copy is kept.
    pub fn normalize(&mut self) {
        let mut chosen: BTreeMap<String, String> = BTreeMap::new();
        for (team, employees) in &self.teams {
            for emp in employees {
                let home = if emp.current_team.is_empty() {
                    team.as_str()
                } else {
                    emp.current_team.as_str()
                };
                match chosen.get(&emp.id) {
                    Some(existing) if existing == home => {}
                    Some(_) if team != home => {}
                    _ => {
                        chosen.insert(emp.id.clone(), team.clone());
                    }
                }
            }
        }

        let width = self.headers.len();
        for (team, employees) in self.teams.iter_mut() {
            let mut seen = HashSet::new();
            employees.retain(|e| chosen.get(&e.id) == Some(team) && seen.insert(e.id.clone()));
            for emp in employees.iter_mut() {
                emp.current_team = team.clone();
                emp.schedule.resize(width, String::new());
            }
        }

        self.rebuild_all_employees();
    }

    pub fn rebuild_all_employees(&mut self) {
        self.all_employees = self.teams.values().flatten().cloned().collect();
    }

    /// Appends headers this table does not have yet, padding every schedule.
    /// Returns the number of headers added.
    pub fn extend_headers<'a>(&mut self, headers: impl IntoIterator<Item = &'a String>) -> usize {
        let before = self.headers.len();
        for header in headers {
            if !self.headers.contains(header) {
                self.headers.push(header.clone());
            }
        }
        let width = self.headers.len();
        for emp in self.teams.values_mut().flatten() {
            emp.schedule.resize(width, String::new());
        }
        width - before
    }

    pub fn add_team(&mut self, name: &str) -> RosterResult<()> {
        let name = validate_team_name(name)?;
        self.teams.entry(name.to_string()).or_default();
        Ok(())
    }

    pub fn rename_team(&mut self, old_name: &str, new_name: &str) -> RosterResult<()> {
        let new_name = validate_team_name(new_name)?;
        if old_name == new_name {
            return Ok(());
        }
        if self.teams.contains_key(new_name) {
            return Err(RosterError::Conflict(format!("Team {} already exists", new_name)));
        }
        let mut members = self
            .teams
            .remove(old_name)
            .ok_or_else(|| RosterError::not_found(format!("Team {}", old_name)))?;
        for emp in members.iter_mut() {
            emp.current_team = new_name.to_string();
        }
        self.teams.insert(new_name.to_string(), members);
        self.rebuild_all_employees();
        Ok(())
    }

    /// Removes a team, moving its members to [`UNASSIGNED_TEAM`].
    /// Returns how many employees were moved.
    pub fn delete_team(&mut self, name: &str) -> RosterResult<usize> {
        if name == UNASSIGNED_TEAM {
            return Err(RosterError::validation("The Unassigned team cannot be deleted"));
        }
        let members = self
            .teams
            .remove(name)
            .ok_or_else(|| RosterError::not_found(format!("Team {}", name)))?;
        let moved = members.len();
        let target = self.teams.entry(UNASSIGNED_TEAM.to_string()).or_default();
        for mut emp in members {
            emp.current_team = UNASSIGNED_TEAM.to_string();
            target.push(emp);
        }
        self.rebuild_all_employees();
        Ok(moved)
    }

    pub fn add_employee(&mut self, id: &str, name: &str, team: &str) -> RosterResult<&Employee> {
        let id = required(id, "Employee ID")?;
        let name = required(name, "Employee name")?;
        let team = validate_team_name(team)?;
        if self.contains_employee(id) {
            return Err(RosterError::Conflict(format!(
                "Employee ID \"{}\" already exists",
                id
            )));
        }
        let mut emp = Employee::new(id, name, team);
        emp.schedule = vec![String::new(); self.headers.len()];
        let members = self.teams.entry(team.to_string()).or_default();
        members.push(emp);
        self.rebuild_all_employees();
        self.find_employee(id)
            .ok_or_else(|| RosterError::not_found(format!("Employee {}", id)))
    }

    /// Renames, re-keys and/or moves an existing employee.
    pub fn edit_employee(
        &mut self,
        current_id: &str,
        new_id: &str,
        name: &str,
        team: &str,
    ) -> RosterResult<()> {
        let new_id = required(new_id, "Employee ID")?;
        let name = required(name, "Employee name")?;
        let team = validate_team_name(team)?;
        if new_id != current_id && self.contains_employee(new_id) {
            return Err(RosterError::Conflict(format!(
                "Employee ID \"{}\" already exists",
                new_id
            )));
        }
        let emp = self
            .find_employee_mut(current_id)
            .ok_or_else(|| RosterError::not_found(format!("Employee {}", current_id)))?;
        emp.id = new_id.to_string();
        emp.name = name.to_string();
        self.move_employee(new_id, team)?;
        self.rebuild_all_employees();
        Ok(())
    }

    /// Soft-deletes an employee by parking it in [`INACTIVE_TEAM`].
    pub fn deactivate_employee(&mut self, id: &str, now: DateTime<Utc>) -> RosterResult<()> {
        if !self.contains_employee(id) {
            return Err(RosterError::not_found(format!("Employee {}", id)));
        }
        self.move_employee(id, INACTIVE_TEAM)?;
        if let Some(emp) = self.find_employee_mut(id) {
            if emp.is_active() {
                emp.status = EmployeeStatus::Inactive;
                emp.deleted_at = Some(now);
            }
        }
        self.rebuild_all_employees();
        Ok(())
    }

    pub fn reactivate_employee(&mut self, id: &str, target_team: &str) -> RosterResult<()> {
        let target_team = validate_team_name(target_team)?;
        if target_team == INACTIVE_TEAM {
            return Err(RosterError::validation(
                "Employees cannot be reactivated into the inactive team",
            ));
        }
        if !self.contains_employee(id) {
            return Err(RosterError::not_found(format!("Employee {}", id)));
        }
        self.move_employee(id, target_team)?;
        if let Some(emp) = self.find_employee_mut(id) {
            emp.status = EmployeeStatus::Active;
            emp.deleted_at = None;
        }
        self.rebuild_all_employees();
        Ok(())
    }

    /// Flags the employee's status without moving it between teams.
    /// Used on the imported base table, which keeps its original grouping.
    pub fn mark_status(&mut self, id: &str, status: EmployeeStatus, now: DateTime<Utc>) -> bool {
        let Some(emp) = self.find_employee_mut(id) else {
            return false;
        };
        emp.status = status;
        emp.deleted_at = match status {
            EmployeeStatus::Active => None,
            EmployeeStatus::Inactive => emp.deleted_at.or(Some(now)),
        };
        self.rebuild_all_employees();
        true
    }

    /// Writes one schedule cell and reports the value it replaced.
    pub fn set_shift(&mut self, id: &str, date_index: usize, value: &str) -> RosterResult<ShiftEdit> {
        let date_header = self
            .headers
            .get(date_index)
            .cloned()
            .ok_or_else(|| RosterError::not_found(format!("Date column {}", date_index)))?;
        let width = self.headers.len();
        let emp = self
            .find_employee_mut(id)
            .ok_or_else(|| RosterError::not_found(format!("Employee {}", id)))?;
        if emp.schedule.len() < width {
            emp.schedule.resize(width, String::new());
        }
        let old_shift = std::mem::replace(&mut emp.schedule[date_index], value.to_string());
        let edit = ShiftEdit {
            employee_name: emp.name.clone(),
            team_name: emp.current_team.clone(),
            date_header,
            old_shift,
        };
        self.rebuild_all_employees();
        Ok(edit)
    }

    fn move_employee(&mut self, id: &str, target_team: &str) -> RosterResult<()> {
        let mut taken = None;
        for (team, members) in self.teams.iter_mut() {
            if team == target_team {
                continue;
            }
            if let Some(pos) = members.iter().position(|e| e.id == id) {
                taken = Some(members.remove(pos));
                break;
            }
        }
        let target = self.teams.entry(target_team.to_string()).or_default();
        match taken {
            Some(mut emp) => {
                emp.current_team = target_team.to_string();
                target.push(emp);
                Ok(())
            }
            None if target.iter().any(|e| e.id == id) => Ok(()),
            None => Err(RosterError::not_found(format!("Employee {}", id))),
        }
    }
}

fn required<'a>(value: &'a str, field: &str) -> RosterResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RosterError::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

fn validate_team_name(name: &str) -> RosterResult<&str> {
    required(name, "Team name")
}

/// The signed-in employee's own row, as served by the employee portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyScheduleResponse {
    pub employee: Employee,
    pub headers: Vec<String>,
    pub shift_definitions: BTreeMap<String, String>,
    pub teammates: Vec<Employee>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShiftRequest {
    pub employee_id: String,
    pub date_index: usize,
    pub new_shift: String,
    /// Value the imported base holds for this cell; an edit back to it is
    /// not recorded as a modification.
    #[serde(default)]
    pub google_shift: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    Add,
    Edit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTeamRequest {
    pub team_name: String,
    pub action: SaveAction,
    #[serde(default)]
    pub old_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTeamRequest {
    pub team_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEmployeeRequest {
    pub name: String,
    pub id: String,
    pub team: String,
    pub action: SaveAction,
    #[serde(default)]
    pub old_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateEmployeeRequest {
    pub employee_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactivateEmployeeRequest {
    pub employee_id: String,
    pub target_team: String,
}
