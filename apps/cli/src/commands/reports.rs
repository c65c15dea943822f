//! Financial and inventory reports. All aggregation happens on the backend.

use chrono::NaiveDate;
use clap::Subcommand;
use farsh_client::error::fallback;
use farsh_client::wire::PeriodRequest;
use farsh_core::{FinancialReport, ReportPeriod};

use crate::args::parse_date;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{print_fields, print_json, Table};

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Revenue, cost, profit and check balances
    Financial {
        /// day, week, month, quarter, half-year or year
        #[arg(long, default_value = "month", conflicts_with_all = ["from", "to"])]
        period: ReportPeriod,

        /// Custom range start; replaces --period
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Custom range end; replaces --period
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Stock counts and value
    Inventory,
}

pub async fn run(ctx: &AppContext, cmd: ReportCommand) -> CliResult<()> {
    let reports = ctx.reports();

    match cmd {
        ReportCommand::Financial { period, from, to } => {
            let report = if from.is_some() || to.is_some() {
                let range = PeriodRequest {
                    start_date: from,
                    end_date: to,
                };
                reports.financial_range(&range).await
            } else {
                reports.financial(period).await
            }
            .map_err(|e| CliError::client(e, fallback::LOAD_REPORT))?;
            print_financial(ctx, &report)
        }

        ReportCommand::Inventory => {
            let report = reports
                .inventory()
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_REPORT))?;
            if ctx.json {
                return print_json(&report);
            }

            print_fields(&[
                ("Carpets", report.total_carpets.to_string()),
                ("Inventory value", report.total_inventory_value.to_string()),
                ("Owned", report.owned_count.to_string()),
                ("Consignment", report.consignment_count.to_string()),
            ]);
            println!();
            let mut by_size = Table::new(["Size", "Count"]);
            for row in &report.by_size {
                by_size.row([row.size.clone(), row.count.to_string()]);
            }
            by_size.print();
            println!();
            let mut by_material = Table::new(["Material", "Count"]);
            for row in &report.by_material {
                by_material.row([row.material.clone(), row.count.to_string()]);
            }
            by_material.print();
            Ok(())
        }
    }
}

fn print_financial(ctx: &AppContext, report: &FinancialReport) -> CliResult<()> {
    if ctx.json {
        return print_json(report);
    }
    print_fields(&[
        ("Revenue", report.total_revenue.to_string()),
        ("Cost", report.total_cost.to_string()),
        ("Profit", report.profit.to_string()),
        ("Invoices", report.total_invoices.to_string()),
        ("Carpets sold", report.total_sold_carpets.to_string()),
        ("Incoming checks", report.total_incoming_checks.to_string()),
        ("Outgoing checks", report.total_outgoing_checks.to_string()),
        ("Check balance", report.net_check_balance.to_string()),
    ]);
    Ok(())
}
