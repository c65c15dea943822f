//! # PDF Renderer
//!
//! A4 portrait, builtin Helvetica. Long line tables continue on new pages.
//!
//! The builtin PDF fonts only cover Latin-1, so labels are English, carpet
//! sizes print under their Latin alias, and any other character outside
//! Latin-1 prints as `?`. The spreadsheet export keeps the original text.

use std::io::BufWriter;

use farsh_core::CarpetSize;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use tracing::debug;

use crate::document::InvoiceDocument;
use crate::error::{ExportError, ExportResult};

// =============================================================================
// Page Geometry (mm)
// =============================================================================

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 277.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const RIGHT: f32 = 190.0;

/// Column x positions of the line table.
const COLUMNS: [f32; 7] = [20.0, 28.0, 80.0, 105.0, 130.0, 145.0, 168.0];

/// Renders the document to PDF bytes.
pub fn render_pdf(doc: &InvoiceDocument) -> ExportResult<Vec<u8>> {
    let mut page = PageWriter::new(&pdf_text(&doc.shop.name))?;

    // Letterhead
    page.centered(&doc.shop.name, 16.0, true);
    page.advance(7.0);
    if !doc.shop.address.is_empty() {
        page.centered(&doc.shop.address, 10.0, false);
        page.advance(5.0);
    }
    if !doc.shop.phone.is_empty() {
        page.centered(&format!("Tel: {}", doc.shop.phone), 10.0, false);
        page.advance(5.0);
    }
    page.advance(5.0);
    page.rule(LEFT, RIGHT);
    page.advance(8.0);

    page.text(&format!("Customer: {}", doc.customer_name), 11.0, LEFT, false);
    page.text(&format!("Date: {}", doc.date), 11.0, 150.0, false);
    page.advance(10.0);

    // Line table
    table_header(&mut page);
    for line in &doc.lines {
        if page.needs_break(6.0) {
            page.new_page();
            table_header(&mut page);
        }
        let size = latin_size(&line.size);
        let cells = [
            line.index.to_string(),
            line.title.clone(),
            size,
            line.brand.clone(),
            line.quantity.to_string(),
            line.unit_price.to_string(),
            line.total.to_string(),
        ];
        for (x, cell) in COLUMNS.iter().zip(cells.iter()) {
            page.text(cell, 9.0, *x, false);
        }
        page.advance(6.0);
    }
    page.rule(LEFT, RIGHT);
    page.advance(10.0);

    // Totals
    page.ensure_room(40.0);
    let totals = &doc.totals;
    page.text(&format!("Subtotal: {}", doc.money(totals.subtotal)), 11.0, 130.0, false);
    page.advance(6.0);
    page.text(&format!("Discount: {}", doc.money(totals.discount)), 11.0, 130.0, false);
    page.advance(6.0);
    page.text(&format!("Total: {}", doc.money(totals.total)), 12.0, 130.0, true);
    page.advance(10.0);

    page.text(&format!("Cash: {}", doc.money(totals.cash_amount)), 10.0, LEFT, false);
    page.advance(6.0);
    page.text(&format!("Checks: {}", doc.money(totals.checks_total)), 10.0, LEFT, false);
    page.advance(6.0);
    page.text(
        &format!("Remaining: {}", doc.money(totals.remaining_to_pay)),
        10.0,
        LEFT,
        true,
    );
    page.advance(12.0);

    // Check listing
    if !doc.checks.is_empty() {
        page.ensure_room(12.0);
        page.text("Checks:", 10.0, LEFT, true);
        page.advance(6.0);
        for check in &doc.checks {
            page.ensure_room(5.0);
            page.text(
                &format!(
                    "{}. No: {} | Amount: {} | Date: {} | Payee: {}",
                    check.index,
                    check.number,
                    check.amount,
                    check.due_date,
                    check.payee
                ),
                9.0,
                25.0,
                false,
            );
            page.advance(5.0);
        }
        page.advance(5.0);
    }

    if let Some(notes) = &doc.notes {
        for (i, line) in notes.lines().enumerate() {
            page.ensure_room(5.0);
            let text = if i == 0 {
                format!("Notes: {}", line)
            } else {
                line.to_string()
            };
            page.text(&text, 9.0, LEFT, false);
            page.advance(5.0);
        }
        page.advance(5.0);
    }

    // Signatures
    page.ensure_room(20.0);
    page.advance(10.0);
    page.text(&doc.signatures.seller, 10.0, 30.0, false);
    page.text(&doc.signatures.buyer, 10.0, 130.0, false);
    page.advance(3.0);
    page.rule(25.0, 80.0);
    page.rule(125.0, 180.0);

    let pages = page.page_count;
    let bytes = page.finish()?;
    debug!(pages, bytes = bytes.len(), "Invoice PDF rendered");
    Ok(bytes)
}

fn table_header(page: &mut PageWriter) {
    let headers = ["#", "Title", "Size", "Brand", "Qty", "Price", "Total"];
    for (x, header) in COLUMNS.iter().zip(headers) {
        page.text(header, 9.0, *x, true);
    }
    page.advance(2.5);
    page.rule(LEFT, RIGHT);
    page.advance(5.0);
}

// =============================================================================
// Page Writer
// =============================================================================

/// Cursor over the current page, top to bottom.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    page_count: usize,
}

impl PageWriter {
    fn new(title: &str) -> ExportResult<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        Ok(PageWriter {
            doc,
            layer,
            regular,
            bold,
            y: TOP,
            page_count: 1,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(pdf_text(text), size, Mm(x), Mm(self.y), font);
    }

    /// Approximately centred; Helvetica averages about half an em per glyph.
    fn centered(&self, text: &str, size: f32, bold: bool) {
        let width_mm = text.chars().count() as f32 * size * 0.5 * 0.3528;
        let x = ((PAGE_WIDTH - width_mm) / 2.0).max(LEFT);
        self.text(text, size, x, bold);
    }

    fn rule(&self, from: f32, to: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from), Mm(self.y)), false),
                (Point::new(Mm(to), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn needs_break(&self, height: f32) -> bool {
        self.y - height < BOTTOM
    }

    fn ensure_room(&mut self, height: f32) {
        if self.needs_break(height) {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
        self.page_count += 1;
    }

    fn finish(self) -> ExportResult<Vec<u8>> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc.save(&mut writer)?;
        writer
            .into_inner()
            .map_err(|e| ExportError::Pdf(e.to_string()))
    }
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Replaces characters the builtin fonts cannot draw.
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 && !c.is_control() { c } else { '?' })
        .collect()
}

/// Backend size values are Persian; the PDF shows the Latin alias.
fn latin_size(size: &str) -> String {
    CarpetSize::from_wire(size)
        .map(|s| s.alias().to_string())
        .unwrap_or_else(|| size.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ShopHeader, SignatureTitles};
    use chrono::NaiveDate;
    use farsh_core::{CheckDraft, InvoiceDraft, LineItem, Money, PaymentMethod};

    fn document(lines: usize) -> InvoiceDocument {
        let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        draft.set_customer_name("Sara").unwrap();
        draft.set_payment_method(PaymentMethod::Mixed).unwrap();
        draft.set_notes("Deliver on Friday\nWrap in plastic").unwrap();
        for i in 0..lines {
            let mut line = LineItem::freeform(format!("Carpet {}", i), 1, Money::from_units(100_000));
            line.size = "شش متری".to_string();
            draft.add_line(line).unwrap();
        }
        draft
            .add_check(CheckDraft::new(
                "778899",
                Money::from_units(50_000),
                NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            ))
            .unwrap();
        InvoiceDocument::build(&draft, &ShopHeader::default(), &SignatureTitles::default())
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let bytes = render_pdf(&document(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_tables_paginate() {
        let bytes = render_pdf(&document(120)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(pdf_text("Sara"), "Sara");
        assert_eq!(pdf_text("سارا"), "????");
        assert_eq!(latin_size("شش متری"), "6m");
        assert_eq!(latin_size("custom"), "custom");
    }
}
