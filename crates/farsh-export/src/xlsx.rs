//! # Spreadsheet Renderer
//!
//! One right-to-left sheet named "Invoice". Amounts are written as numbers
//! with a thousands format so they stay usable in formulas.

use farsh_core::Money;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::document::InvoiceDocument;
use crate::error::ExportResult;

const SHEET_NAME: &str = "Invoice";

/// Column widths in characters: row, title, size, brand, qty, price, total.
const COLUMN_WIDTHS: [f64; 7] = [8.0, 25.0, 12.0, 15.0, 8.0, 15.0, 15.0];

const LABEL_COL: u16 = 5;
const VALUE_COL: u16 = 6;

/// Renders the document to XLSX bytes.
pub fn render_xlsx(doc: &InvoiceDocument) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let rows = write_sheet(workbook.add_worksheet(), doc)?;
    let bytes = workbook.save_to_buffer()?;
    debug!(rows, bytes = bytes.len(), "Invoice spreadsheet rendered");
    Ok(bytes)
}

fn write_sheet(sheet: &mut Worksheet, doc: &InvoiceDocument) -> Result<u32, XlsxError> {
    sheet.set_name(SHEET_NAME)?;
    sheet.set_right_to_left(true);
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    let bold = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(14).set_align(FormatAlign::Center);
    let amount = Format::new().set_num_format("#,##0");
    let header = Format::new()
        .set_bold()
        .set_background_color("#C8C8C8")
        .set_align(FormatAlign::Center);

    // Letterhead
    sheet.merge_range(0, 0, 0, 6, &doc.shop.name, &title)?;
    sheet.write_string(1, 0, format!("آدرس: {}", doc.shop.address))?;
    sheet.write_string(2, 0, format!("تلفن: {}", doc.shop.phone))?;

    sheet.write_string_with_format(4, 0, "خریدار:", &bold)?;
    sheet.write_string(4, 1, &doc.customer_name)?;
    sheet.write_string_with_format(4, 3, "تاریخ:", &bold)?;
    sheet.write_string(4, 4, &doc.date)?;

    // Line table
    let headers = ["ردیف", "شرح کالا", "اندازه", "برند", "تعداد", "قیمت واحد", "مبلغ کل"];
    for (col, text) in headers.iter().enumerate() {
        sheet.write_string_with_format(6, col as u16, *text, &header)?;
    }

    let mut row = 7;
    for line in &doc.lines {
        sheet.write_number(row, 0, line.index as f64)?;
        sheet.write_string(row, 1, &line.title)?;
        sheet.write_string(row, 2, &line.size)?;
        sheet.write_string(row, 3, &line.brand)?;
        sheet.write_number(row, 4, f64::from(line.quantity))?;
        sheet.write_number_with_format(row, 5, line.unit_price.as_f64(), &amount)?;
        sheet.write_number_with_format(row, 6, line.total.as_f64(), &amount)?;
        row += 1;
    }

    // Totals
    let totals = &doc.totals;
    row += 1;
    for (label, value) in [
        ("جمع جزء:", totals.subtotal),
        ("تخفیف:", totals.discount),
        ("قابل پرداخت:", totals.total),
    ] {
        write_total(sheet, row, label, value, &bold, &amount)?;
        row += 1;
    }
    row += 1;
    for (label, value) in [
        ("پرداخت نقدی:", totals.cash_amount),
        ("جمع چک‌ها:", totals.checks_total),
        ("باقیمانده:", totals.remaining_to_pay),
    ] {
        write_total(sheet, row, label, value, &bold, &amount)?;
        row += 1;
    }

    // Check listing
    if !doc.checks.is_empty() {
        row += 1;
        sheet.write_string_with_format(row, 0, "چک‌ها:", &bold)?;
        row += 1;
        for check in &doc.checks {
            sheet.write_number(row, 0, check.index as f64)?;
            sheet.write_string(row, 1, &check.number)?;
            sheet.write_number_with_format(row, 2, check.amount.as_f64(), &amount)?;
            sheet.write_string(row, 3, &check.due_date)?;
            sheet.write_string(row, 4, &check.payee)?;
            row += 1;
        }
    }

    if let Some(notes) = &doc.notes {
        row += 1;
        sheet.write_string_with_format(row, 0, "توضیحات:", &bold)?;
        sheet.write_string(row, 1, notes)?;
        row += 1;
    }

    // Signatures
    row += 2;
    sheet.write_string(row, 0, &doc.signatures.seller)?;
    sheet.write_string(row, LABEL_COL, &doc.signatures.buyer)?;
    row += 1;
    sheet.write_string(row, 0, "____________________")?;
    sheet.write_string(row, LABEL_COL, "____________________")?;

    Ok(row + 1)
}

fn write_total(
    sheet: &mut Worksheet,
    row: u32,
    label: &str,
    value: Money,
    label_format: &Format,
    amount_format: &Format,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(row, LABEL_COL, label, label_format)?;
    sheet.write_number_with_format(row, VALUE_COL, value.as_f64(), amount_format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ShopHeader, SignatureTitles};
    use chrono::NaiveDate;
    use farsh_core::{CheckDraft, InvoiceDraft, LineItem, PaymentMethod};

    #[test]
    fn test_renders_xlsx_bytes() {
        let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        draft.set_customer_name("سارا").unwrap();
        draft.set_payment_method(PaymentMethod::Check).unwrap();
        draft
            .add_line(LineItem::freeform("تبریز", 2, Money::from_units(100_000)))
            .unwrap();
        draft
            .add_check(CheckDraft::new(
                "1",
                Money::from_units(50_000),
                NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            ))
            .unwrap();
        let doc = InvoiceDocument::build(&draft, &ShopHeader::default(), &SignatureTitles::default());

        let bytes = render_xlsx(&doc).unwrap();

        // XLSX is a zip container.
        assert!(bytes.starts_with(b"PK"));
    }
}
