use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Month-year label (e.g. "November 2025") to published Google Sheet URL.
pub type GoogleLinks = BTreeMap<String, String>;

/// Per-tenant `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSettings {
    #[serde(default)]
    pub auto_sync_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_definitions: Option<BTreeMap<String, String>>,
}

impl RosterSettings {
    /// Tenant-specific shift codes, or the built-in set when none are configured.
    pub fn shift_definitions(&self) -> BTreeMap<String, String> {
        match &self.shift_definitions {
            Some(defs) if !defs.is_empty() => defs.clone(),
            _ => default_shift_definitions(),
        }
    }

    pub fn upsert_shift_definition(&mut self, code: &str, description: &str) {
        let mut defs = self.shift_definitions();
        defs.insert(code.to_string(), description.to_string());
        self.shift_definitions = Some(defs);
    }

    /// Returns false if the code was not defined.
    pub fn remove_shift_definition(&mut self, code: &str) -> bool {
        let mut defs = self.shift_definitions();
        let removed = defs.remove(code).is_some();
        if removed {
            self.shift_definitions = Some(defs);
        }
        removed
    }
}

pub fn default_shift_definitions() -> BTreeMap<String, String> {
    [
        ("M2", "8 AM – 5 PM"),
        ("M3", "9 AM – 6 PM"),
        ("M4", "10 AM – 7 PM"),
        ("D1", "12 PM – 9 PM"),
        ("D2", "1 PM – 10 PM"),
        ("DO", "OFF"),
        ("SL", "Sick Leave"),
        ("CL", "Casual Leave"),
        ("EL", "Emergency Leave"),
        ("HL", "Holiday Leave"),
        ("", "N/A"),
    ]
    .into_iter()
    .map(|(code, label)| (code.to_string(), label.to_string()))
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDefinitionRequest {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceShiftDefinitionsRequest {
    pub shift_definitions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLinkRequest {
    pub month_year: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSyncRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationNameRequest {
    pub organization_name: String,
}
