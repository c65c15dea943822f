//! # Invoice Commands
//!
//! `invoice create` is the invoice form on the command line: it builds an
//! [`InvoiceDraft`] from flags, shows the totals, then saves or finalizes it
//! through [`InvoiceWorkflow`](farsh_client::InvoiceWorkflow) and writes any
//! requested exports.
//!
//! ```text
//!   flags ──► InvoiceDraft ──► totals ──┬── --preview ──────────────► exports
//!                                       ├── (default) save_draft ───► exports
//!                                       └── --finalize ─► finalize ─► exports
//!                                                            │
//!                                           report, pause, recent invoices
//! ```

use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Subcommand};
use farsh_client::error::fallback;
use farsh_client::wire::{CarpetFilter, InvoiceFilter};
use farsh_client::{CatalogView, FinalizeReport, FinalizeStep, StepStatus};
use farsh_core::{
    Carpet, CheckDraft, InvoiceDraft, LineItem, Money, PaymentMethod, MAX_PAGE_LIMIT,
};
use farsh_export::{export_file_name, ExportFormat, InvoiceDocument, ShopHeader, SignatureTitles};
use serde_json::json;
use tracing::{info, warn};

use crate::args::{parse_check, parse_date, parse_item, parse_line, CheckArg, ItemArg, LineArg};
use crate::context::AppContext;
use crate::error::{CliError, CliResult, ErrorCode};
use crate::output::{jalali, print_fields, print_json, Table};

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// List invoices
    List(ListArgs),

    /// Show a saved invoice, optionally exporting it again
    Show {
        id: i64,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Build an invoice, then save it as a draft or finalize it
    Create(CreateArgs),

    /// Delete an invoice
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Customer name contains
    #[arg(long)]
    pub customer: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub skip: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Args)]
pub struct ExportArgs {
    /// Write a PDF of the invoice
    #[arg(long)]
    pub export_pdf: bool,

    /// Write a spreadsheet of the invoice
    #[arg(long)]
    pub export_xlsx: bool,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl ExportArgs {
    fn formats(&self) -> Vec<ExportFormat> {
        let mut formats = Vec::new();
        if self.export_pdf {
            formats.push(ExportFormat::Pdf);
        }
        if self.export_xlsx {
            formats.push(ExportFormat::Xlsx);
        }
        formats
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub customer: String,

    /// Invoice date (default: today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// cash, check or mixed (default: whatever --cash and --check need)
    #[arg(long)]
    pub payment: Option<PaymentMethod>,

    /// Catalog carpet as ID[:QTY]
    #[arg(long = "item", value_parser = parse_item)]
    pub items: Vec<ItemArg>,

    /// Free-text line as TITLE:QTY:PRICE
    #[arg(long = "line", value_parser = parse_line)]
    pub lines: Vec<LineArg>,

    #[arg(long)]
    pub discount: Option<Money>,

    /// Cash received
    #[arg(long)]
    pub cash: Option<Money>,

    /// Check received as NUMBER:AMOUNT:YYYY-MM-DD[:PAYEE]
    #[arg(long = "check", value_parser = parse_check)]
    pub checks: Vec<CheckArg>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Finalize instead of saving a draft
    #[arg(long, conflicts_with = "preview")]
    pub finalize: bool,

    /// Only show totals and write exports; nothing is sent
    #[arg(long)]
    pub preview: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

pub async fn run(ctx: &AppContext, cmd: InvoiceCommand) -> CliResult<()> {
    match cmd {
        InvoiceCommand::List(args) => list(ctx, args).await,
        InvoiceCommand::Show { id, export } => show(ctx, id, export).await,
        InvoiceCommand::Create(args) => create(ctx, args).await,
        InvoiceCommand::Delete { id } => {
            ctx.invoices().delete(id).await?;
            if ctx.json {
                print_json(&json!({ "deleted": "invoice", "id": id }))
            } else {
                println!("Deleted invoice {}", id);
                Ok(())
            }
        }
    }
}

// =============================================================================
// List / Show
// =============================================================================

async fn list(ctx: &AppContext, args: ListArgs) -> CliResult<()> {
    let filter = InvoiceFilter {
        customer_name: args.customer,
        start_date: args.from,
        end_date: args.to,
        skip: args.skip,
        limit: args.limit,
    };
    print_invoices(ctx, &filter).await
}

async fn print_invoices(ctx: &AppContext, filter: &InvoiceFilter) -> CliResult<()> {
    let invoices = ctx
        .invoices()
        .list(filter)
        .await
        .map_err(|e| CliError::client(e, fallback::LOAD_INVOICES))?;
    if ctx.json {
        return print_json(&invoices);
    }

    let mut table = Table::new(["ID", "Number", "Customer", "Date", "Total", "Signed"]);
    for invoice in &invoices {
        table.row([
            invoice.id.to_string(),
            invoice.invoice_number.clone(),
            invoice.customer_name.clone(),
            jalali(&invoice.invoice_date),
            invoice.total_amount.to_string(),
            if invoice.is_signed { "yes" } else { "" }.to_string(),
        ]);
    }
    table.print();
    Ok(())
}

async fn show(ctx: &AppContext, id: i64, export: ExportArgs) -> CliResult<()> {
    let record = ctx
        .invoices()
        .get(id)
        .await
        .map_err(|e| CliError::client(e, fallback::LOAD_INVOICES))?;
    let checks = ctx
        .checks()
        .list_for_invoice(id)
        .await
        .map_err(|e| CliError::client(e, fallback::LOAD_CHECKS))?;

    let draft = InvoiceDraft::from_record(&record, &checks);
    let written = write_exports(&draft, &ctx.shop_header(), &ctx.signature_titles(), &export)?;

    if ctx.json {
        return print_json(&json!({
            "invoice": record,
            "checks": checks,
            "exports": written,
        }));
    }

    print_fields(&[
        ("Invoice", format!("{} (#{})", record.invoice_number, record.id)),
        ("Customer", record.customer_name.clone()),
        ("Date", jalali(&record.invoice_date)),
        ("Payment", record.payment_method.clone()),
        ("Total", record.total_amount.to_string()),
        ("Signed", record.is_signed.to_string()),
    ]);
    println!();
    print_draft(&draft);
    print_written(&written);
    Ok(())
}

// =============================================================================
// Create
// =============================================================================

async fn create(ctx: &AppContext, args: CreateArgs) -> CliResult<()> {
    let mut draft = build_draft(ctx, &args).await?;
    let shop = ctx.shop_header();
    let titles = ctx.signature_titles();

    if args.preview {
        let written = write_exports(&draft, &shop, &titles, &args.export)?;
        return if ctx.json {
            print_json(&json!({ "draft": draft, "totals": draft.totals(), "exports": written }))
        } else {
            print_draft(&draft);
            print_written(&written);
            Ok(())
        };
    }

    let workflow = ctx.workflow();

    // From here on the invoice exists on the backend. Export trouble is
    // reported after the outcome and never replaces it.
    if !args.finalize {
        let outcome = workflow
            .save_draft(&mut draft)
            .await
            .map_err(|e| CliError::client(e, fallback::SAVE_DRAFT))?;
        let exported = write_exports(&draft, &shop, &titles, &args.export);
        if ctx.json {
            print_json(&json!({
                "invoice_id": outcome.server_id(),
                "totals": draft.totals(),
                "exports": exported.as_deref().unwrap_or_default(),
                "export_error": exported.as_ref().err(),
            }))?;
        } else {
            print_draft(&draft);
            println!();
            println!("Draft saved as invoice {}", outcome.server_id());
            if let Ok(written) = &exported {
                print_written(written);
            }
        }
        return settle(outcome.server_id(), None, exported.err());
    }

    let report = workflow
        .finalize(&mut draft)
        .await
        .map_err(|e| CliError::client(e, fallback::FINALIZE))?;
    let exported = write_exports(&draft, &shop, &titles, &args.export);

    if ctx.json {
        print_json(&report_json(&report, &draft, &exported))?;
    } else {
        print_draft(&draft);
        println!();
        print_report(&report);
        if let Ok(written) = &exported {
            print_written(written);
        }

        tokio::time::sleep(report.redirect_after).await;
        println!();
        let recent = InvoiceFilter {
            limit: Some(10),
            ..Default::default()
        };
        if let Err(e) = print_invoices(ctx, &recent).await {
            warn!(error = %e.message, "Could not list recent invoices");
        }
    }

    settle(report.invoice_id, Some(&report), exported.err())
}

/// Exit status once the invoice went through. Unregistered checks outrank a
/// failed export; either one still exits non-zero.
fn settle(
    invoice_id: i64,
    report: Option<&FinalizeReport>,
    export_error: Option<CliError>,
) -> CliResult<()> {
    if let Some(report) = report.filter(|r| !r.is_complete()) {
        let mut message = format!(
            "invoice {} finalized but {} check(s) were not registered",
            report.invoice_id,
            report.check_failures.len()
        );
        if let Some(err) = export_error {
            message.push_str(&format!("; the export also failed: {}", err.message));
        }
        return Err(CliError::new(ErrorCode::PartialFailure, message));
    }
    match export_error {
        Some(err) => Err(CliError::new(
            err.code,
            format!("invoice {} was stored but the export failed: {}", invoice_id, err.message),
        )),
        None => Ok(()),
    }
}

/// Applies the flags to a fresh draft, resolving catalog items first.
async fn build_draft(ctx: &AppContext, args: &CreateArgs) -> CliResult<InvoiceDraft> {
    let today = Local::now().date_naive();
    let mut draft = InvoiceDraft::new(args.date.unwrap_or(today));
    draft.set_customer_name(args.customer.as_str())?;
    let has_cash = args.cash.is_some_and(|cash| cash.is_positive());
    let payment = args
        .payment
        .unwrap_or_else(|| PaymentMethod::for_amounts(has_cash, !args.checks.is_empty()));
    draft.set_payment_method(payment)?;

    if !args.items.is_empty() {
        let carpets = resolve_carpets(ctx, &args.items).await?;
        for (item, carpet) in args.items.iter().zip(carpets.iter()) {
            draft.add_line(LineItem::from_carpet(carpet, item.quantity))?;
        }
    }
    for line in &args.lines {
        draft.add_line(LineItem::freeform(
            line.title.as_str(),
            line.quantity,
            line.unit_price,
        ))?;
    }

    if let Some(discount) = args.discount {
        draft.set_discount(discount)?;
    }
    if let Some(cash) = args.cash {
        draft.set_cash_amount(cash)?;
    }
    for check in &args.checks {
        let mut entry = CheckDraft::new(check.number.as_str(), check.amount, check.due_date);
        if let Some(payee) = &check.payee {
            entry = entry.with_payee(payee.as_str());
        }
        draft.add_check(entry)?;
    }
    if let Some(notes) = &args.notes {
        draft.set_notes(notes.as_str())?;
    }

    Ok(draft)
}

/// Looks the carpets up in the catalog the way the invoice form's picker
/// does; entries outside the loaded page are fetched one by one.
async fn resolve_carpets(ctx: &AppContext, items: &[ItemArg]) -> CliResult<Vec<Carpet>> {
    let view = CatalogView::new(ctx.catalog());
    let filter = CarpetFilter {
        limit: Some(MAX_PAGE_LIMIT),
        ..Default::default()
    };
    view.refresh(&filter)
        .await
        .map_err(|e| CliError::client(e, fallback::LOAD_CARPETS))?;

    let mut carpets = Vec::with_capacity(items.len());
    for item in items {
        let carpet = match view.find(item.carpet_id).await {
            Some(carpet) => carpet,
            None => ctx
                .catalog()
                .get(item.carpet_id)
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_CARPETS))?
                .summary(),
        };
        if carpet.quantity < item.quantity {
            warn!(
                carpet_id = carpet.id,
                in_stock = carpet.quantity,
                requested = item.quantity,
                "Requested more than the catalog shows in stock"
            );
        }
        carpets.push(carpet);
    }
    view.close();
    Ok(carpets)
}

// =============================================================================
// Exports
// =============================================================================

fn write_exports(
    draft: &InvoiceDraft,
    shop: &ShopHeader,
    titles: &SignatureTitles,
    export: &ExportArgs,
) -> CliResult<Vec<PathBuf>> {
    let formats = export.formats();
    if formats.is_empty() {
        return Ok(Vec::new());
    }

    let doc = InvoiceDocument::build(draft, shop, titles);
    let now = Utc::now();
    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let bytes = format.render(&doc)?;
        let path = export.out_dir.join(export_file_name(format, now));
        std::fs::write(&path, &bytes)?;
        info!(path = ?path, bytes = bytes.len(), "Invoice exported");
        written.push(path);
    }
    Ok(written)
}

// =============================================================================
// Printing
// =============================================================================

fn print_draft(draft: &InvoiceDraft) {
    let mut table = Table::new(["#", "Title", "Size", "Brand", "Qty", "Price", "Total"]);
    for (i, line) in draft.lines().iter().enumerate() {
        table.row([
            (i + 1).to_string(),
            line.title.clone(),
            line.size.clone(),
            line.brand.clone(),
            line.quantity.to_string(),
            line.unit_price.to_string(),
            line.line_total().to_string(),
        ]);
    }
    table.print();

    let totals = draft.totals();
    println!();
    print_fields(&[
        ("Customer", draft.customer_name().to_string()),
        ("Date", farsh_core::format_jalali(draft.invoice_date())),
        ("Payment", draft.payment_method().to_string()),
        ("Subtotal", totals.subtotal.to_string()),
        ("Discount", totals.discount.to_string()),
        ("Total", totals.total.to_string()),
        ("Cash", totals.cash_amount.to_string()),
        ("Checks", totals.checks_total.to_string()),
        ("Remaining", totals.remaining_to_pay.to_string()),
    ]);
}

fn step_name(step: FinalizeStep) -> &'static str {
    match step {
        FinalizeStep::Persist => "persist",
        FinalizeStep::Finalize => "finalize",
        FinalizeStep::RegisterChecks => "register checks",
    }
}

fn step_text(status: &StepStatus) -> String {
    match status {
        StepStatus::Done => "done".to_string(),
        StepStatus::Skipped => "skipped".to_string(),
        StepStatus::Partial { attempted, failed } => {
            format!("{} of {} failed", failed, attempted)
        }
    }
}

fn print_report(report: &FinalizeReport) {
    println!("Invoice {} finalized", report.invoice_id);
    for (step, status) in &report.steps {
        println!("  {:<16} {}", step_name(*step), step_text(status));
    }
    for check in &report.created_checks {
        println!("  check {} registered (id {})", check.check_number, check.id);
    }
    for failure in &report.check_failures {
        println!(
            "  check {} ({}) NOT registered: {}",
            failure.check_number, failure.amount, failure.message
        );
    }
}

fn report_json(
    report: &FinalizeReport,
    draft: &InvoiceDraft,
    exported: &CliResult<Vec<PathBuf>>,
) -> serde_json::Value {
    json!({
        "invoice_id": report.invoice_id,
        "complete": report.is_complete(),
        "steps": report
            .steps
            .iter()
            .map(|(step, status)| json!({ "step": step_name(*step), "status": step_text(status) }))
            .collect::<Vec<_>>(),
        "created_checks": report.created_checks,
        "check_failures": report
            .check_failures
            .iter()
            .map(|f| json!({ "check_number": f.check_number, "amount": f.amount, "message": f.message }))
            .collect::<Vec<_>>(),
        "totals": draft.totals(),
        "exports": exported.as_deref().unwrap_or_default(),
        "export_error": exported.as_ref().err(),
    })
}

fn print_written(written: &[PathBuf]) {
    for path in written {
        println!("Saved {}", path.display());
    }
}
