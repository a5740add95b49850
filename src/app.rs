use std::fmt;
use std::path::{Path, PathBuf};

use crate::auth::token_manager::TokenManager;
use crate::batch::fetch_unread;
use crate::config::Config;
use crate::export::xlsx::XlsxExporter;
use crate::export::{ExportError, Exporter};
use crate::mail::gmail::{GmailClient, MailProvider, ProviderError};

pub const LOCKED_FILE_MESSAGE: &str =
    "Cannot save file. Please close any open Excel files and try again.";

/// Failure of a whole run, classified once for reporting.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("authentication failed: {0:#}")]
    Authentication(anyhow::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("{0:#}")]
    Other(anyhow::Error),
}

impl RunError {
    /// The line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            RunError::Authentication(e) => format!("Authentication failed: {e:#}"),
            RunError::Export(ExportError::Locked { .. }) => LOCKED_FILE_MESSAGE.to_string(),
            RunError::Export(e) => format!("Could not save file: {e}"),
            RunError::Other(e) => format!("An error occurred: {e:#}"),
        }
    }
}

impl From<ProviderError> for RunError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Unauthorized(_) => RunError::Authentication(e.into()),
            other => RunError::Other(other.into()),
        }
    }
}

/// Result of a successful run. `listed` is the size of the unread listing
/// before the cap.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    NothingToExport { listed: usize },
    Saved { path: PathBuf, rows: usize, listed: usize },
}

impl Outcome {
    pub fn listed(&self) -> usize {
        match self {
            Outcome::NothingToExport { listed } | Outcome::Saved { listed, .. } => *listed,
        }
    }

    /// Status line about the unread listing, shown before the outcome.
    pub fn listing_line(&self) -> String {
        match self.listed() {
            0 => "No unread emails found.".to_string(),
            n => format!("Found {n} unread emails!"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NothingToExport { .. } => {
                write!(f, "No new emails found matching the criteria.")
            }
            Outcome::Saved { path, .. } => {
                write!(f, "Data saved successfully to {}", path.display())
            }
        }
    }
}

/// Authenticate, fetch unread mail from Gmail and write the spreadsheet.
pub fn run(config: &Config) -> Result<Outcome, RunError> {
    let auth = config.auth().map_err(RunError::Authentication)?;
    let access_token = TokenManager::new(auth)
        .get_access_token()
        .map_err(RunError::Authentication)?;
    let gmail = GmailClient::new(access_token)?;

    run_with(&gmail, &XlsxExporter, &config.output, config.max_emails)
}

/// The fetch-then-export pipeline over any provider and exporter. The
/// exporter is not called when there is nothing to write.
pub fn run_with(
    provider: &dyn MailProvider,
    exporter: &dyn Exporter,
    output: &Path,
    max_emails: usize,
) -> Result<Outcome, RunError> {
    let batch = fetch_unread(provider, max_emails)?;

    if batch.records.is_empty() {
        return Ok(Outcome::NothingToExport {
            listed: batch.listed,
        });
    }

    exporter.export(&batch.records, output)?;

    Ok(Outcome::Saved {
        path: output.to_path_buf(),
        rows: batch.records.len(),
        listed: batch.listed,
    })
}
