use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use tracing::debug;

/// Source of the CSV behind a Google Sheets link.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_csv(&self, link: &str) -> Result<String>;
}

/// Fetches the CSV export of a sheet over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    client: reqwest::Client,
}

impl HttpSheetSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    async fn fetch_csv(&self, link: &str) -> Result<String> {
        let url = csv_export_url(link);
        debug!("Fetching sheet CSV from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(eyre!(
                "Failed to fetch sheet: {} returned {}",
                url,
                response.status()
            ));
        }

        response.text().await.wrap_err("Failed to read sheet body")
    }
}

/// Rewrites a sheet link into its CSV export URL.
///
/// - published links (`/spreadsheets/d/e/<key>/pubhtml`) become `.../pub?output=csv`
/// - edit links (`/spreadsheets/d/<id>/edit#gid=7`) become
///   `.../export?format=csv&gid=7`
/// - anything else, including links that already ask for CSV, is kept
pub fn csv_export_url(link: &str) -> String {
    let link = link.trim();
    if link.contains("output=csv") || link.contains("format=csv") {
        return link.to_string();
    }

    if let Some(idx) = link.find("/spreadsheets/d/e/") {
        let key_start = idx + "/spreadsheets/d/e/".len();
        let key: String = link[key_start..]
            .chars()
            .take_while(|c| *c != '/' && *c != '?' && *c != '#')
            .collect();
        let mut url = format!("{}/spreadsheets/d/e/{}/pub?output=csv", &link[..idx], key);
        if let Some(gid) = gid(link) {
            url.push_str(&format!("&gid={}", gid));
        }
        return url;
    }

    if let Some(idx) = link.find("/spreadsheets/d/") {
        let id_start = idx + "/spreadsheets/d/".len();
        let id: String = link[id_start..]
            .chars()
            .take_while(|c| *c != '/' && *c != '?' && *c != '#')
            .collect();
        let mut url = format!("{}/spreadsheets/d/{}/export?format=csv", &link[..idx], id);
        if let Some(gid) = gid(link) {
            url.push_str(&format!("&gid={}", gid));
        }
        return url;
    }

    link.to_string()
}

fn gid(link: &str) -> Option<&str> {
    let start = link.find("gid=")? + "gid=".len();
    let rest = &link[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}
