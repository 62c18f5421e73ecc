//! HTTP client for the yearly participation archives.

use reqwest::blocking::Client;

use crate::data::archive::ArchiveSource;
use crate::error::AppError;

/// Placeholder substituted with the year in a URL template.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Fetches one archive per year from a URL template.
///
/// Requests are blocking and sequential, use the client's default timeouts,
/// and are never retried.
pub struct HttpArchiveSource {
    client: Client,
    url_template: String,
}

impl HttpArchiveSource {
    pub fn new(url_template: impl Into<String>) -> Result<Self, AppError> {
        let url_template = url_template.into();
        if !url_template.contains(YEAR_PLACEHOLDER) {
            return Err(AppError::io(format!(
                "URL template '{url_template}' must contain {YEAR_PLACEHOLDER}."
            )));
        }
        Ok(Self {
            client: Client::new(),
            url_template,
        })
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn fetch(&self, year: i32) -> Result<Vec<u8>, AppError> {
        let url = archive_url(&self.url_template, year);
        log::info!("Fetching {year} archive: {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::fetch(format!("Archive request for {year} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "Archive request for {year} failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::fetch(format!("Failed to read {year} archive body: {e}")))?;
        log::debug!("Fetched {} bytes for {year}", body.len());
        Ok(body.to_vec())
    }
}

/// Substitute `year` into a URL template.
pub fn archive_url(template: &str, year: i32) -> String {
    template.replace(YEAR_PLACEHOLDER, &year.to_string())
}
