use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One admin edit of a schedule cell. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedShiftRecord {
    pub employee_id: String,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub team_name: String,
    pub date_index: usize,
    #[serde(default)]
    pub date_header: String,
    pub old_shift: String,
    pub new_shift: String,
    pub modified_by: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub month_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub total_modifications: u64,
    pub employees_modified: Vec<String>,
    pub modifications_by_user: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifiedShiftsData {
    #[serde(default)]
    pub modifications: Vec<ModifiedShiftRecord>,
    #[serde(default)]
    pub monthly_stats: BTreeMap<String, MonthlyStats>,
    /// Last time Admin was reset to the imported table. Records at or before
    /// this instant stay in the history but no longer protect their cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// Label the monthly statistics are grouped under, e.g. "November 2025".
pub fn month_year(at: DateTime<Utc>) -> String {
    at.format("%B %Y").to_string()
}

impl ModifiedShiftsData {
    /// Appends a record and folds it into the statistics of its month.
    pub fn record(&mut self, mut record: ModifiedShiftRecord) {
        if record.month_year.is_empty() {
            record.month_year = month_year(record.timestamp);
        }

        let stats = self
            .monthly_stats
            .entry(record.month_year.clone())
            .or_default();
        stats.total_modifications += 1;
        if !stats.employees_modified.contains(&record.employee_id) {
            stats.employees_modified.push(record.employee_id.clone());
        }
        *stats
            .modifications_by_user
            .entry(record.modified_by.clone())
            .or_default() += 1;

        self.modifications.push(record);
    }

    /// Re-keys the history of an employee whose ID changed.
    /// Returns how many records were moved.
    pub fn rename_employee(&mut self, old_id: &str, new_id: &str) -> usize {
        if old_id == new_id {
            return 0;
        }
        let mut moved = 0;
        for m in self.modifications.iter_mut().filter(|m| m.employee_id == old_id) {
            m.employee_id = new_id.to_string();
            moved += 1;
        }
        for stats in self.monthly_stats.values_mut() {
            if let Some(pos) = stats.employees_modified.iter().position(|id| id == old_id) {
                if stats.employees_modified.iter().any(|id| id == new_id) {
                    stats.employees_modified.remove(pos);
                } else {
                    stats.employees_modified[pos] = new_id.to_string();
                }
            }
        }
        moved
    }

    /// Records that still shield their cell from re-imports.
    pub fn active(&self) -> impl Iterator<Item = &ModifiedShiftRecord> {
        let reset_at = self.reset_at;
        self.modifications
            .iter()
            .filter(move |m| reset_at.is_none_or(|at| m.timestamp > at))
    }

    pub fn for_employee<'a>(&'a self, employee_id: &'a str) -> impl Iterator<Item = &'a ModifiedShiftRecord> {
        self.modifications
            .iter()
            .filter(move |m| m.employee_id == employee_id)
    }
}
