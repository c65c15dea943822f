//! Checks: listing, the upcoming window, status changes.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use farsh_client::error::fallback;
use farsh_client::wire::{CheckFilter, CheckUpdate, NewCheck};
use farsh_core::{CheckDirection, CheckRecord, CheckStatus, Money, DEFAULT_UPCOMING_DAYS};
use serde_json::json;

use crate::args::parse_date;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{jalali, print_fields, print_json, Table};

#[derive(Debug, Subcommand)]
pub enum CheckCommand {
    /// List checks
    List(ListArgs),

    /// Checks falling due within the next days
    Upcoming {
        #[arg(long, default_value_t = DEFAULT_UPCOMING_DAYS)]
        days: u32,
    },

    /// Show one check
    Show { id: i64 },

    /// Record a check not tied to an invoice
    Add(AddArgs),

    /// Change fields of a check
    Update(UpdateArgs),

    /// Set the status of a check; any status may follow any other
    SetStatus { id: i64, status: CheckStatus },

    /// Delete a check
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub invoice: Option<i64>,
    /// incoming or outgoing
    #[arg(long = "type")]
    pub check_type: Option<CheckDirection>,
    #[arg(long)]
    pub status: Option<CheckStatus>,
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub skip: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub number: String,
    #[arg(long)]
    pub amount: Money,
    #[arg(long)]
    pub payee: String,
    /// Due date
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,
    /// incoming or outgoing
    #[arg(long = "type", default_value = "incoming")]
    pub check_type: CheckDirection,
    #[arg(long)]
    pub status: Option<CheckStatus>,
    #[arg(long)]
    pub description: Option<String>,
    /// Carpet the check paid for
    #[arg(long)]
    pub carpet: Option<i64>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub amount: Option<Money>,
    #[arg(long)]
    pub payee: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub status: Option<CheckStatus>,
    #[arg(long = "type")]
    pub check_type: Option<CheckDirection>,
    #[arg(long)]
    pub description: Option<String>,
}

pub async fn run(ctx: &AppContext, cmd: CheckCommand) -> CliResult<()> {
    let service = ctx.checks();

    match cmd {
        CheckCommand::List(args) => {
            let filter = CheckFilter {
                invoice_id: args.invoice,
                check_type: args.check_type,
                status: args.status,
                start_date: args.from,
                end_date: args.to,
                skip: args.skip,
                limit: args.limit,
            };
            let checks = service
                .list(&filter)
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_CHECKS))?;
            print_checks(ctx, &checks)
        }

        CheckCommand::Upcoming { days } => {
            let checks = service
                .upcoming(days)
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_CHECKS))?;
            print_checks(ctx, &checks)
        }

        CheckCommand::Show { id } => {
            let check = service
                .get(id)
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_CHECKS))?;
            show(ctx, &check)
        }

        CheckCommand::Add(args) => {
            let check = NewCheck {
                check_number: args.number,
                amount: args.amount,
                payee: args.payee,
                check_date: args.date,
                check_type: args.check_type,
                description: args.description,
                invoice_id: None,
                carpet_id: args.carpet,
                status: args.status,
            };
            let created = service
                .create(&check)
                .await
                .map_err(|e| CliError::client(e, fallback::CHECK_CREATE))?;
            show(ctx, &created)
        }

        CheckCommand::Update(args) => {
            let update = CheckUpdate {
                check_number: args.number,
                amount: args.amount,
                payee: args.payee,
                check_date: args.date,
                status: args.status,
                check_type: args.check_type,
                description: args.description,
            };
            if update.is_empty() {
                return Err(CliError::validation("nothing to update"));
            }
            let updated = service.update(args.id, &update).await?;
            show(ctx, &updated)
        }

        CheckCommand::SetStatus { id, status } => {
            let updated = service.set_status(id, status).await?;
            show(ctx, &updated)
        }

        CheckCommand::Delete { id } => {
            service.delete(id).await?;
            if ctx.json {
                print_json(&json!({ "deleted": "check", "id": id }))
            } else {
                println!("Deleted check {}", id);
                Ok(())
            }
        }
    }
}

fn print_checks(ctx: &AppContext, checks: &[CheckRecord]) -> CliResult<()> {
    if ctx.json {
        return print_json(checks);
    }
    let mut table = Table::new(["ID", "Number", "Amount", "Due", "Payee", "Type", "Status", "Invoice"]);
    for check in checks {
        table.row([
            check.id.to_string(),
            check.check_number.clone(),
            check.amount.to_string(),
            jalali(&check.check_date),
            check.payee.clone(),
            check.check_type.to_string(),
            check.status.to_string(),
            check.invoice_id.map(|id| id.to_string()).unwrap_or_default(),
        ]);
    }
    table.print();
    Ok(())
}

fn show(ctx: &AppContext, check: &CheckRecord) -> CliResult<()> {
    if ctx.json {
        return print_json(check);
    }
    let mut fields = vec![
        ("ID", check.id.to_string()),
        ("Number", check.check_number.clone()),
        ("Amount", check.amount.to_string()),
        ("Payee", check.payee.clone()),
        ("Due", jalali(&check.check_date)),
        ("Type", check.check_type.to_string()),
        ("Status", check.status.to_string()),
    ];
    if let Some(invoice_id) = check.invoice_id {
        fields.push(("Invoice", invoice_id.to_string()));
    }
    if let Some(description) = &check.description {
        fields.push(("Description", description.clone()));
    }
    print_fields(&fields);
    Ok(())
}
