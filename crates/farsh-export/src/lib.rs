//! # farsh-export: Invoice Documents
//!
//! Pure functions from an [`InvoiceDraft`](farsh_core::InvoiceDraft) to
//! document bytes. Nothing here talks to the network or mutates the draft;
//! a failed export leaves every piece of invoice state exactly as it was.
//!
//! ## Module Organization
//! - [`document`] - Renderer-neutral invoice content
//! - [`pdf`] - A4 PDF via `printpdf`
//! - [`xlsx`] - Spreadsheet via `rust_xlsxwriter`
//! - [`error`] - Export errors

pub mod document;
pub mod error;
pub mod pdf;
pub mod xlsx;

pub use document::{DocumentCheck, DocumentLine, InvoiceDocument, ShopHeader, SignatureTitles};
pub use error::{ExportError, ExportResult};
pub use pdf::render_pdf;
pub use xlsx::render_xlsx;

use chrono::{DateTime, Utc};

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn render(&self, doc: &InvoiceDocument) -> ExportResult<Vec<u8>> {
        match self {
            ExportFormat::Pdf => render_pdf(doc),
            ExportFormat::Xlsx => render_xlsx(doc),
        }
    }
}

/// `invoice_<unix-millis>.<ext>`
pub fn export_file_name(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!("invoice_{}.{}", at.timestamp_millis(), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_names() {
        let at = Utc.timestamp_millis_opt(1_710_900_000_123).unwrap();
        assert_eq!(
            export_file_name(ExportFormat::Pdf, at),
            "invoice_1710900000123.pdf"
        );
        assert_eq!(
            export_file_name(ExportFormat::Xlsx, at),
            "invoice_1710900000123.xlsx"
        );
    }
}
