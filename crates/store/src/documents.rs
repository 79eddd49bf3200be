//! Cached JSON documents of one tenant.
//!
//! Accessors only touch the in-memory copy. Every change that must survive a
//! restart is followed by the matching `save_*` call while the tenant lock is
//! still held.

use std::path::PathBuf;

use eyre::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use rosterdesk_core::merge::merge_display;
use rosterdesk_core::notifications::ReadNotifications;
use rosterdesk_core::models::{
    credentials::{EmployeeCredentialsFile, EmployeeProfile},
    modification::ModifiedShiftsData,
    request::ScheduleRequestsFile,
    roster::RosterData,
    settings::{GoogleLinks, RosterSettings},
    tenant::AdminUsersFile,
};

use crate::json::{DefaultReason, LoadResult, load_json, remove_file, write_json};
use crate::layout::{
    ADMIN_DATA_FILE, ADMIN_USERS_FILE, DISPLAY_DATA_FILE, EMPLOYEE_CREDENTIALS_FILE,
    GOOGLE_DATA_FILE, GOOGLE_LINKS_FILE, MODIFIED_SHIFTS_FILE, READ_NOTIFICATIONS_FILE,
    SCHEDULE_REQUESTS_FILE, SETTINGS_FILE, TenantPaths,
};

#[derive(Debug, Clone)]
pub struct TenantDocuments {
    tenant_id: String,
    paths: TenantPaths,
    loaded: bool,
    google: RosterData,
    admin: RosterData,
    display: RosterData,
    modified_shifts: ModifiedShiftsData,
    requests: ScheduleRequestsFile,
    google_links: GoogleLinks,
    settings: RosterSettings,
    credentials: EmployeeCredentialsFile,
    admin_users: AdminUsersFile,
    read_notifications: ReadNotifications,
}

async fn load_logged<T>(tenant_id: &str, paths: &TenantPaths, name: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let result = load_json(&paths.file(name)).await?;
    if let LoadResult::Default {
        reason: DefaultReason::Corrupt(reason),
        ..
    } = &result
    {
        warn!("Tenant {}: {} is corrupt ({}), starting from an empty document", tenant_id, name, reason);
    }
    Ok(result.into_inner())
}

impl TenantDocuments {
    pub(crate) fn unloaded(tenant_id: &str, paths: TenantPaths) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            paths,
            loaded: false,
            google: RosterData::default(),
            admin: RosterData::default(),
            display: RosterData::default(),
            modified_shifts: ModifiedShiftsData::default(),
            requests: ScheduleRequestsFile::default(),
            google_links: GoogleLinks::default(),
            settings: RosterSettings::default(),
            credentials: EmployeeCredentialsFile::default(),
            admin_users: AdminUsersFile::default(),
            read_notifications: ReadNotifications::default(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads every document from disk, replacing the cached copies.
    pub(crate) async fn load(&mut self) -> Result<()> {
        let (id, paths) = (self.tenant_id.as_str(), &self.paths);
        let mut google: RosterData = load_logged(id, paths, GOOGLE_DATA_FILE).await?;
        let mut admin: RosterData = load_logged(id, paths, ADMIN_DATA_FILE).await?;
        let modified_shifts = load_logged(id, paths, MODIFIED_SHIFTS_FILE).await?;
        let mut requests: ScheduleRequestsFile = load_logged(id, paths, SCHEDULE_REQUESTS_FILE).await?;
        let google_links = load_logged(id, paths, GOOGLE_LINKS_FILE).await?;
        let settings = load_logged(id, paths, SETTINGS_FILE).await?;
        let credentials = load_logged(id, paths, EMPLOYEE_CREDENTIALS_FILE).await?;
        let admin_users = load_logged(id, paths, ADMIN_USERS_FILE).await?;
        let read_notifications = load_logged(id, paths, READ_NOTIFICATIONS_FILE).await?;

        google.normalize();
        admin.normalize();
        rosterdesk_core::workflow::recount(&mut requests);

        self.display = merge_display(&google, &admin);
        self.google = google;
        self.admin = admin;
        self.modified_shifts = modified_shifts;
        self.requests = requests;
        self.google_links = google_links;
        self.settings = settings;
        self.credentials = credentials;
        self.admin_users = admin_users;
        self.read_notifications = read_notifications;
        self.loaded = true;

        info!(
            "Loaded tenant {}: {} admin employees, {} headers, {} pending requests",
            self.tenant_id,
            self.admin.employee_count(),
            self.admin.headers.len(),
            self.requests.pending_count
        );
        Ok(())
    }

    async fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        debug!("Tenant {}: saving {}", self.tenant_id, name);
        write_json(&self.paths.file(name), value).await
    }

    pub fn google(&self) -> &RosterData {
        &self.google
    }

    pub fn google_mut(&mut self) -> &mut RosterData {
        &mut self.google
    }

    pub fn set_google(&mut self, data: RosterData) {
        self.google = data;
    }

    pub async fn save_google(&self) -> Result<()> {
        self.save(GOOGLE_DATA_FILE, &self.google).await
    }

    pub fn admin(&self) -> &RosterData {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut RosterData {
        &mut self.admin
    }

    pub fn set_admin(&mut self, data: RosterData) {
        self.admin = data;
    }

    pub async fn save_admin(&self) -> Result<()> {
        self.save(ADMIN_DATA_FILE, &self.admin).await
    }

    pub fn display(&self) -> &RosterData {
        &self.display
    }

    /// Recomputes the display table from Google and Admin and persists it.
    pub async fn merge_display_for_tenant(&mut self) -> Result<()> {
        self.display = merge_display(&self.google, &self.admin);
        self.save(DISPLAY_DATA_FILE, &self.display).await
    }

    pub fn modified_shifts(&self) -> &ModifiedShiftsData {
        &self.modified_shifts
    }

    pub fn modified_shifts_mut(&mut self) -> &mut ModifiedShiftsData {
        &mut self.modified_shifts
    }

    pub async fn save_modified_shifts(&self) -> Result<()> {
        self.save(MODIFIED_SHIFTS_FILE, &self.modified_shifts).await
    }

    pub fn requests(&self) -> &ScheduleRequestsFile {
        &self.requests
    }

    pub fn requests_mut(&mut self) -> &mut ScheduleRequestsFile {
        &mut self.requests
    }

    pub async fn save_requests(&self) -> Result<()> {
        self.save(SCHEDULE_REQUESTS_FILE, &self.requests).await
    }

    /// Split borrow used when resolving a request, which touches the request
    /// log, the Admin table and the modification log together.
    pub fn workflow_parts(
        &mut self,
    ) -> (&mut ScheduleRequestsFile, &mut RosterData, &mut ModifiedShiftsData) {
        (&mut self.requests, &mut self.admin, &mut self.modified_shifts)
    }

    /// Split borrow for a Google to Admin sync.
    pub fn sync_parts(&mut self) -> (&RosterData, &mut RosterData, &ModifiedShiftsData) {
        (&self.google, &mut self.admin, &self.modified_shifts)
    }

    pub fn google_links(&self) -> &GoogleLinks {
        &self.google_links
    }

    pub fn google_links_mut(&mut self) -> &mut GoogleLinks {
        &mut self.google_links
    }

    pub async fn save_google_links(&self) -> Result<()> {
        self.save(GOOGLE_LINKS_FILE, &self.google_links).await
    }

    pub fn settings(&self) -> &RosterSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RosterSettings {
        &mut self.settings
    }

    pub async fn save_settings(&self) -> Result<()> {
        self.save(SETTINGS_FILE, &self.settings).await
    }

    pub fn credentials(&self) -> &EmployeeCredentialsFile {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut EmployeeCredentialsFile {
        &mut self.credentials
    }

    pub async fn save_credentials(&self) -> Result<()> {
        self.save(EMPLOYEE_CREDENTIALS_FILE, &self.credentials).await
    }

    pub fn admin_users(&self) -> &AdminUsersFile {
        &self.admin_users
    }

    pub fn admin_users_mut(&mut self) -> &mut AdminUsersFile {
        &mut self.admin_users
    }

    pub async fn save_admin_users(&self) -> Result<()> {
        self.save(ADMIN_USERS_FILE, &self.admin_users).await
    }

    pub fn read_notifications(&self) -> &ReadNotifications {
        &self.read_notifications
    }

    pub fn read_notifications_mut(&mut self) -> &mut ReadNotifications {
        &mut self.read_notifications
    }

    pub async fn save_read_notifications(&self) -> Result<()> {
        self.save(READ_NOTIFICATIONS_FILE, &self.read_notifications).await
    }

    /// Empties the Admin table, the request history and the modification log,
    /// keeping the imported table, settings and accounts.
    pub async fn reset_roster_edits(&mut self) -> Result<()> {
        self.admin = RosterData::default();
        self.requests = ScheduleRequestsFile::default();
        self.modified_shifts = ModifiedShiftsData::default();
        self.save(ADMIN_DATA_FILE, &self.admin).await?;
        self.save(SCHEDULE_REQUESTS_FILE, &self.requests).await?;
        self.save(MODIFIED_SHIFTS_FILE, &self.modified_shifts).await?;
        info!("Tenant {}: roster edits, requests and modifications reset", self.tenant_id);
        self.merge_display_for_tenant().await
    }

    fn profile_path(&self, employee_id: &str) -> Result<PathBuf> {
        self.paths.profile(employee_id)
    }

    /// Profiles are read straight from disk; a missing file yields an empty profile.
    pub async fn load_profile(&self, employee_id: &str) -> Result<EmployeeProfile> {
        let mut profile: EmployeeProfile = load_json(&self.profile_path(employee_id)?)
            .await?
            .into_inner();
        profile.employee_id = employee_id.to_string();
        Ok(profile)
    }

    pub async fn save_profile(&self, profile: &EmployeeProfile) -> Result<()> {
        write_json(&self.profile_path(&profile.employee_id)?, profile).await
    }

    /// Deletes the roster, modification and request files and reloads.
    /// Returns the names of the files that existed.
    pub async fn hard_reset(&mut self) -> Result<Vec<&'static str>> {
        let mut deleted = Vec::new();
        for name in [
            GOOGLE_DATA_FILE,
            ADMIN_DATA_FILE,
            DISPLAY_DATA_FILE,
            MODIFIED_SHIFTS_FILE,
            SCHEDULE_REQUESTS_FILE,
        ] {
            if remove_file(&self.paths.file(name)).await? {
                deleted.push(name);
            }
        }
        info!("Tenant {}: hard reset removed {:?}", self.tenant_id, deleted);
        self.load().await?;
        Ok(deleted)
    }
}
