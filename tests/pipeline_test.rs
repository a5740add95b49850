use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use calamine::{Data, Reader, Xlsx, open_workbook};

use unread_mail_export::app::{Outcome, RunError, run_with};
use unread_mail_export::batch::fetch_unread;
use unread_mail_export::domain::email::NormalizedRecord;
use unread_mail_export::export::xlsx::XlsxExporter;
use unread_mail_export::export::{COLUMNS, ExportError, Exporter};
use unread_mail_export::mail::gmail::{MailProvider, ProviderError};
use unread_mail_export::mail::message::{BodyPayload, Header, MessageRef, RawMessage};

struct FakeProvider {
    listing: Vec<String>,
    messages: HashMap<String, RawMessage>,
    fetched: RefCell<Vec<String>>,
}

impl FakeProvider {
    fn with_subjects(ids: &[&str]) -> Self {
        let messages = ids
            .iter()
            .map(|id| {
                let payload = BodyPayload::leaf("text/plain", URL_SAFE.encode(format!("body of {id}")))
                    .with_headers(vec![
                        Header::new("From", format!("{id}@example.com")),
                        Header::new("Subject", format!("subject {id}")),
                        Header::new("Date", "Mon, 02 Jan 2006 15:04:05 +0000"),
                    ]);
                (
                    id.to_string(),
                    RawMessage {
                        id: id.to_string(),
                        payload,
                    },
                )
            })
            .collect();
        Self {
            listing: ids.iter().map(|s| s.to_string()).collect(),
            messages,
            fetched: RefCell::new(Vec::new()),
        }
    }
}

impl MailProvider for FakeProvider {
    fn list_unread(&self) -> Result<Vec<MessageRef>, ProviderError> {
        Ok(self
            .listing
            .iter()
            .map(|id| MessageRef {
                id: id.clone(),
                thread_id: None,
            })
            .collect())
    }

    fn get_message(&self, id: &str) -> Result<RawMessage, ProviderError> {
        self.fetched.borrow_mut().push(id.to_string());
        self.messages
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: format!("no message {id}"),
            })
    }
}

#[derive(Default)]
struct RecordingExporter {
    calls: RefCell<Vec<(Vec<NormalizedRecord>, PathBuf)>>,
    locked: bool,
}

impl Exporter for RecordingExporter {
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<(), ExportError> {
        if self.locked {
            return Err(ExportError::Locked {
                path: path.to_path_buf(),
            });
        }
        self.calls
            .borrow_mut()
            .push((records.to_vec(), path.to_path_buf()));
        Ok(())
    }
}

#[test]
fn empty_listing_returns_empty_batch() {
    let provider = FakeProvider::with_subjects(&[]);
    let batch = fetch_unread(&provider, 50).unwrap();
    assert_eq!(batch.listed, 0);
    assert!(batch.records.is_empty());
    assert!(provider.fetched.borrow().is_empty());
}

#[test]
fn empty_listing_skips_export() {
    let provider = FakeProvider::with_subjects(&[]);
    let exporter = RecordingExporter::default();
    let outcome = run_with(&provider, &exporter, Path::new("out.xlsx"), 50).unwrap();
    assert_eq!(outcome, Outcome::NothingToExport { listed: 0 });
    assert_eq!(outcome.listing_line(), "No unread emails found.");
    assert!(exporter.calls.borrow().is_empty());
}

#[test]
fn records_follow_listing_order_and_cap() {
    let provider = FakeProvider::with_subjects(&["m3", "m1", "m7", "m2", "m9"]);
    let batch = fetch_unread(&provider, 3).unwrap();

    assert_eq!(batch.listed, 5);
    let subjects: Vec<_> = batch.records.iter().map(|r| r.subject.as_str()).collect();
    assert_eq!(subjects, ["subject m3", "subject m1", "subject m7"]);
    assert_eq!(*provider.fetched.borrow(), ["m3", "m1", "m7"]);
}

#[test]
fn cap_larger_than_listing_fetches_everything() {
    let provider = FakeProvider::with_subjects(&["a", "b"]);
    let batch = fetch_unread(&provider, 50).unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[1].preview, "body of b");
    assert_eq!(batch.records[0].date, "2006-01-02 15:04:05");
}

#[test]
fn zero_cap_exports_nothing() {
    let provider = FakeProvider::with_subjects(&["a"]);
    let exporter = RecordingExporter::default();
    let outcome = run_with(&provider, &exporter, Path::new("out.xlsx"), 0).unwrap();
    assert_eq!(outcome, Outcome::NothingToExport { listed: 1 });
    assert_eq!(outcome.listing_line(), "Found 1 unread emails!");
    assert!(provider.fetched.borrow().is_empty());
    assert!(exporter.calls.borrow().is_empty());
}

#[test]
fn records_are_exported_once_in_order() {
    let provider = FakeProvider::with_subjects(&["x", "y"]);
    let exporter = RecordingExporter::default();
    let outcome = run_with(&provider, &exporter, Path::new("report.xlsx"), 50).unwrap();

    assert_eq!(
        outcome,
        Outcome::Saved {
            path: PathBuf::from("report.xlsx"),
            rows: 2,
            listed: 2,
        }
    );
    let calls = exporter.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (records, path) = &calls[0];
    assert_eq!(path, Path::new("report.xlsx"));
    assert_eq!(records[0].sender, "x@example.com");
    assert_eq!(records[1].sender, "y@example.com");
}

#[test]
fn listing_size_is_reported_before_the_cap() {
    let provider = FakeProvider::with_subjects(&["a", "b", "c"]);
    let exporter = RecordingExporter::default();
    let outcome = run_with(&provider, &exporter, Path::new("out.xlsx"), 1).unwrap();

    assert_eq!(outcome.listed(), 3);
    assert_eq!(outcome.listing_line(), "Found 3 unread emails!");
    assert_eq!(exporter.calls.borrow()[0].0.len(), 1);
}

#[test]
fn fetch_failure_stops_the_run() {
    let mut provider = FakeProvider::with_subjects(&["ok"]);
    provider.listing.push("gone".into());
    let exporter = RecordingExporter::default();

    let err = run_with(&provider, &exporter, Path::new("out.xlsx"), 50).unwrap_err();
    assert!(matches!(err, RunError::Other(_)));
    assert!(exporter.calls.borrow().is_empty());
}

#[test]
fn locked_output_is_an_export_error() {
    let provider = FakeProvider::with_subjects(&["a"]);
    let exporter = RecordingExporter {
        locked: true,
        ..RecordingExporter::default()
    };
    let err = run_with(&provider, &exporter, Path::new("out.xlsx"), 50).unwrap_err();
    assert_eq!(
        err.user_message(),
        "Cannot save file. Please close any open Excel files and try again."
    );
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.clone(),
                    other => panic!("unexpected cell {other:?}"),
                })
                .collect()
        })
        .collect()
}

#[test]
fn xlsx_exporter_writes_header_then_records_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unread_mails.xlsx");
    let records = vec![
        NormalizedRecord {
            date: "2006-01-02 15:04:05".into(),
            sender: "Jane <jane@example.com>".into(),
            subject: "Lunch?".into(),
            preview: "Are you free at noon?".into(),
        },
        NormalizedRecord {
            date: "Unknown Date".into(),
            sender: "bob@example.com".into(),
            subject: "No Subject".into(),
            preview: "Second row".into(),
        },
    ];

    XlsxExporter.export(&records, &path).unwrap();

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], COLUMNS);
    assert_eq!(rows[0], ["Date", "Sender", "Subject", "Email Preview"]);
    assert_eq!(rows[1], records[0].cells());
    assert_eq!(rows[2], records[1].cells());
}

#[test]
fn xlsx_exporter_reports_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("out.xlsx");
    let err = XlsxExporter.export(&[], &path).unwrap_err();
    assert!(matches!(err, ExportError::Write { .. }));
}
