//! Carpet inventory: listing, editing, operations and the inventory PDF.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use farsh_client::error::fallback;
use farsh_client::wire::{CarpetFilter, CarpetUpdate, NewCarpet, NewOperation};
use farsh_core::{CarpetDetail, CarpetSize, Money, PurchaseMethod};
use serde_json::json;

use crate::args::parse_date;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{jalali, print_fields, print_json, Table};

#[derive(Debug, Subcommand)]
pub enum CarpetCommand {
    /// List carpets
    List(FilterArgs),

    /// Show one carpet with its operations
    Show { id: i64 },

    /// Add a carpet to the inventory
    Add(AddArgs),

    /// Change fields of a carpet
    Update(UpdateArgs),

    /// Delete a carpet
    Delete { id: i64 },

    /// Save the backend's inventory PDF
    ExportPdf {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output file
        #[arg(long, default_value = "carpets.pdf")]
        out: PathBuf,
    },

    /// Record a wash/repair operation on a carpet
    OpAdd {
        carpet_id: i64,
        #[command(flatten)]
        operation: OperationArgs,
    },

    /// Change a recorded operation
    OpUpdate {
        operation_id: i64,
        #[command(flatten)]
        operation: OperationArgs,
    },

    /// Delete a recorded operation
    OpDelete { operation_id: i64 },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Free-text search over pattern, brand and material
    #[arg(long)]
    pub search: Option<String>,

    /// Size class (wire value or alias such as `6m`)
    #[arg(long)]
    pub size: Option<CarpetSize>,

    #[arg(long)]
    pub material: Option<String>,

    /// Only carpets with stock left
    #[arg(long)]
    pub available: bool,

    #[arg(long)]
    pub skip: Option<u32>,

    #[arg(long)]
    pub limit: Option<u32>,
}

impl From<FilterArgs> for CarpetFilter {
    fn from(args: FilterArgs) -> Self {
        CarpetFilter {
            search: args.search,
            size: args.size,
            material: args.material,
            available_only: args.available,
            skip: args.skip,
            limit: args.limit,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub pattern: String,
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub material: String,
    #[arg(long)]
    pub size: CarpetSize,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
    #[arg(long)]
    pub description: Option<String>,
    /// The carpet comes with its pair
    #[arg(long)]
    pub has_pair: bool,
    #[arg(long, default_value = "cash")]
    pub payment: PurchaseMethod,
    #[arg(long)]
    pub purchase_price: Money,
    #[arg(long)]
    pub sale_price: Option<Money>,
    #[arg(long, value_parser = parse_date)]
    pub purchase_date: Option<NaiveDate>,
    #[arg(long)]
    pub seller: Option<String>,
    /// Owner of a consignment carpet; marks the carpet as consignment
    #[arg(long)]
    pub consignment_owner: Option<String>,
    #[arg(long, requires = "consignment_owner")]
    pub owner_price: Option<Money>,
    #[arg(long, value_parser = parse_date, requires = "consignment_owner")]
    pub consignment_date: Option<NaiveDate>,
}

impl From<AddArgs> for NewCarpet {
    fn from(args: AddArgs) -> Self {
        NewCarpet {
            pattern: args.pattern,
            brand: args.brand,
            material: args.material,
            size: args.size,
            quantity: args.quantity,
            description: args.description,
            has_pair: args.has_pair,
            payment_method: args.payment,
            purchase_price: args.purchase_price,
            sale_price: args.sale_price,
            purchase_date: args.purchase_date,
            seller_name: args.seller,
            is_consignment: args.consignment_owner.is_some(),
            consignment_owner: args.consignment_owner,
            owner_declared_price: args.owner_price,
            consignment_date: args.consignment_date,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub pattern: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub material: Option<String>,
    #[arg(long)]
    pub size: Option<CarpetSize>,
    #[arg(long)]
    pub quantity: Option<u32>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub purchase_price: Option<Money>,
    #[arg(long)]
    pub sale_price: Option<Money>,
    #[arg(long)]
    pub seller: Option<String>,
    #[arg(long)]
    pub has_pair: Option<bool>,
    #[arg(long)]
    pub payment: Option<PurchaseMethod>,
}

impl UpdateArgs {
    fn into_parts(self) -> (i64, CarpetUpdate) {
        let update = CarpetUpdate {
            pattern: self.pattern,
            brand: self.brand,
            material: self.material,
            size: self.size,
            quantity: self.quantity,
            description: self.description,
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            seller_name: self.seller,
            has_pair: self.has_pair,
            payment_method: self.payment,
        };
        (self.id, update)
    }
}

#[derive(Debug, Args)]
pub struct OperationArgs {
    /// e.g. wash, repair, fringe
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: Money,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

impl From<OperationArgs> for NewOperation {
    fn from(args: OperationArgs) -> Self {
        NewOperation {
            operation_name: args.name,
            price: args.price,
            description: args.description,
            operation_date: args.date,
        }
    }
}

pub async fn run(ctx: &AppContext, cmd: CarpetCommand) -> CliResult<()> {
    let catalog = ctx.catalog();

    match cmd {
        CarpetCommand::List(filter) => {
            let carpets = catalog
                .list(&filter.into())
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_CARPETS))?;
            if ctx.json {
                return print_json(&carpets);
            }
            let mut table = Table::new(["ID", "Carpet", "Size", "Qty", "Price", "Consignment"]);
            for carpet in &carpets {
                table.row([
                    carpet.id.to_string(),
                    carpet.display_title(),
                    carpet.size.to_string(),
                    carpet.quantity.to_string(),
                    carpet.sale_price.map(|p| p.to_string()).unwrap_or_default(),
                    if carpet.is_consignment { "yes" } else { "" }.to_string(),
                ]);
            }
            table.print();
            Ok(())
        }

        CarpetCommand::Show { id } => {
            let carpet = catalog
                .get(id)
                .await
                .map_err(|e| CliError::client(e, fallback::LOAD_CARPETS))?;
            show(ctx, &carpet)
        }

        CarpetCommand::Add(args) => {
            let carpet = catalog.create(&args.into()).await?;
            show(ctx, &carpet)
        }

        CarpetCommand::Update(args) => {
            let (id, update) = args.into_parts();
            let carpet = catalog.update(id, &update).await?;
            show(ctx, &carpet)
        }

        CarpetCommand::Delete { id } => {
            catalog.delete(id).await?;
            done(ctx, "carpet", id)
        }

        CarpetCommand::ExportPdf { filter, out } => {
            let bytes = catalog.export_pdf(&filter.into()).await?;
            std::fs::write(&out, &bytes)?;
            if ctx.json {
                print_json(&json!({ "path": out, "bytes": bytes.len() }))
            } else {
                println!("Saved {}", out.display());
                Ok(())
            }
        }

        CarpetCommand::OpAdd {
            carpet_id,
            operation,
        } => {
            let created = catalog.add_operation(carpet_id, &operation.into()).await?;
            if ctx.json {
                print_json(&created)
            } else {
                println!(
                    "Operation {} added to carpet {} ({})",
                    created.id, carpet_id, created.price
                );
                Ok(())
            }
        }

        CarpetCommand::OpUpdate {
            operation_id,
            operation,
        } => {
            let updated = catalog
                .update_operation(operation_id, &operation.into())
                .await?;
            if ctx.json {
                print_json(&updated)
            } else {
                println!("Operation {} updated", updated.id);
                Ok(())
            }
        }

        CarpetCommand::OpDelete { operation_id } => {
            catalog.delete_operation(operation_id).await?;
            done(ctx, "operation", operation_id)
        }
    }
}

fn show(ctx: &AppContext, carpet: &CarpetDetail) -> CliResult<()> {
    if ctx.json {
        return print_json(carpet);
    }

    let mut fields = vec![
        ("ID", carpet.id.to_string()),
        ("Pattern", carpet.pattern.clone()),
        ("Brand", carpet.brand.clone()),
        ("Material", carpet.material.clone()),
        ("Size", carpet.size.to_string()),
        ("Quantity", carpet.quantity.to_string()),
        ("Paid by", carpet.payment_method.to_string()),
        ("Purchase price", carpet.purchase_price.to_string()),
        (
            "Sale price",
            carpet.sale_price.map(|p| p.to_string()).unwrap_or_default(),
        ),
        ("Purchased", jalali(&carpet.purchase_date)),
        ("Operations cost", carpet.total_operations_cost.to_string()),
        ("Total cost", carpet.total_cost.to_string()),
    ];
    if let Some(owner) = &carpet.consignment_owner {
        fields.push(("Consignment owner", owner.clone()));
    }
    if let Some(description) = &carpet.description {
        fields.push(("Description", description.clone()));
    }
    print_fields(&fields);

    if !carpet.operations.is_empty() {
        println!();
        let mut table = Table::new(["Op", "Name", "Price", "Date"]);
        for op in &carpet.operations {
            table.row([
                op.id.to_string(),
                op.operation_name.clone(),
                op.price.to_string(),
                jalali(&op.operation_date),
            ]);
        }
        table.print();
    }
    Ok(())
}

fn done(ctx: &AppContext, what: &str, id: i64) -> CliResult<()> {
    if ctx.json {
        print_json(&json!({ "deleted": what, "id": id }))
    } else {
        println!("Deleted {} {}", what, id);
        Ok(())
    }
}
