use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION};
use tracing::debug;

use crate::error::Result;
use crate::report::ReportDescriptor;
use crate::runlog::RunLog;

/// Production endpoint of the vendor REST API.
const DEFAULT_BASE_URL: &str = "https://api.smartsheet.com/2.0";

/// MIME type that asks the vendor to render a report as an Excel workbook.
const EXCEL_MIME: &str = "application/vnd.ms-excel";

/// Escapes everything outside the URI unreserved set when encoding the
/// impersonated-user identity for the `Assume-User` header.
const ASSUME_USER_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Client for the vendor report API.
///
/// Authenticates once per run with a bearer token and, when configured, acts
/// on behalf of an impersonated user for every request.
pub struct ReportClient {
    http: Client,
    base_url: String,
    token: String,
    assume_user: Option<String>,
}

impl ReportClient {
    pub fn new(token: String, assume_user: Option<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), token, assume_user)
    }

    /// Builds a client against an explicit endpoint. Tests point this at a
    /// local server; production code uses [`ReportClient::new`].
    pub fn with_base_url(
        base_url: String,
        token: String,
        assume_user: Option<String>,
    ) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(120)).build()?;
        Ok(ReportClient {
            http,
            base_url,
            token,
            assume_user,
        })
    }

    /// Downloads every report into `staging_dir`, one attempt per descriptor.
    ///
    /// The staging directory is created if needed and cleared of previously
    /// staged files first. A failed download is logged against its report
    /// name and never aborts the rest of the batch.
    pub fn fetch_all(
        &self,
        reports: &[ReportDescriptor],
        staging_dir: &Path,
        log: &mut RunLog,
    ) -> Result<()> {
        fs::create_dir_all(staging_dir)?;
        clear_staged_files(staging_dir)?;

        log.log("DOWNLOADING SHEETS ===========================");
        for report in reports {
            log.log(format!("  downloading sheet: {}", report.name));
            match self.download_report(report, staging_dir) {
                Ok(path) => debug!(report = %report.name, path = %path.display(), "staged"),
                Err(err) => {
                    log.error(format!("    ERROR DOWNLOADING SHEET: {err}"));
                }
            }
        }
        Ok(())
    }

    /// Fetches one report as an Excel export and writes it into `dest_dir`
    /// under the vendor-chosen filename.
    fn download_report(&self, report: &ReportDescriptor, dest_dir: &Path) -> Result<PathBuf> {
        let url = format!("{}/reports/{}", self.base_url, report.id);
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, EXCEL_MIME);
        if let Some(user) = &self.assume_user {
            request = request.header("Assume-User", encode_assume_user(user));
        }

        let response = request.send()?.error_for_status()?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| format!("{}.xlsx", report.name));

        let dest_path = dest_dir.join(filename);
        let bytes = response.bytes()?;
        fs::write(&dest_path, &bytes)?;
        Ok(dest_path)
    }
}

/// Removes every regular file left over from a previous run.
fn clear_staged_files(staging_dir: &Path) -> Result<()> {
    for entry in fs::read_dir(staging_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Extracts the filename from a `Content-Disposition` header value.
///
/// Only the final path component is kept: the value comes from the vendor,
/// and a name carrying separators must not escape the staging directory.
fn disposition_filename(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let name = rest
        .split(';')
        .next()
        .unwrap_or(rest)
        .trim()
        .trim_matches('"');
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if name.is_empty() || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

/// Percent-encodes the impersonated-user identity, which the vendor API
/// expects URI-encoded.
fn encode_assume_user(value: &str) -> String {
    utf8_percent_encode(value, ASSUME_USER_ENCODE_SET).to_string()
}
