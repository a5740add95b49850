use std::io::ErrorKind;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::domain::email::NormalizedRecord;
use crate::export::{COLUMNS, ExportError, Exporter};

const COLUMN_WIDTHS: [f64; 4] = [20.0, 36.0, 48.0, 80.0];

/// Single-sheet `.xlsx` writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxExporter;

impl XlsxExporter {
    fn build(records: &[NormalizedRecord]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, width)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            for (col, cell) in record.cells().into_iter().enumerate() {
                sheet.write_string(row, col as u16, cell)?;
            }
        }

        Ok(workbook)
    }
}

impl Exporter for XlsxExporter {
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<(), ExportError> {
        let mut workbook = Self::build(records).map_err(|e| classify(path, e))?;
        workbook.save(path).map_err(|e| classify(path, e))?;
        log::info!("wrote {} rows to {}", records.len(), path.display());
        Ok(())
    }
}

fn classify(path: &Path, err: XlsxError) -> ExportError {
    match &err {
        XlsxError::IoError(io)
            if matches!(io.kind(), ErrorKind::PermissionDenied | ErrorKind::ResourceBusy) =>
        {
            ExportError::Locked {
                path: path.to_path_buf(),
            }
        }
        _ => ExportError::Write {
            path: path.to_path_buf(),
            source: Box::new(err),
        },
    }
}
