pub mod xlsx;

use std::path::{Path, PathBuf};

use crate::domain::email::NormalizedRecord;

pub const DEFAULT_OUTPUT: &str = "unread_mails.xlsx";

/// Column titles, in the order fields are written.
pub const COLUMNS: [&str; 4] = ["Date", "Sender", "Subject", "Email Preview"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{} is locked by another program or not writable", path.display())]
    Locked { path: PathBuf },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub trait Exporter {
    /// Write `records` to `path`, replacing any existing file.
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<(), ExportError>;
}

impl NormalizedRecord {
    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [&str; 4] {
        [
            self.date.as_str(),
            self.sender.as_str(),
            self.subject.as_str(),
            self.preview.as_str(),
        ]
    }
}
