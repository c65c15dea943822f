//! # farsh: Carpet Shop Command Line
//!
//! The operator front end over `farsh-client` and `farsh-export`.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          farsh startup                                  │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info,farsh=debug, can be overridden with RUST_LOG        │
//! │                                                                         │
//! │  2. Load Config ──────────────────────────────────────────────────────► │
//! │     • --config, or <config_dir>/farsh.toml, then FARSH_* variables      │
//! │                                                                         │
//! │  3. Hydrate Session ──────────────────────────────────────────────────► │
//! │     • session.json from the data dir; expired tokens start logged out   │
//! │                                                                         │
//! │  4. Dispatch ─────────────────────────────────────────────────────────► │
//! │     • login / logout / carpets / invoice / checks / reports / users     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{auth, carpets, checks, invoice, reports, users};
use context::AppContext;
use error::CliResult;

/// Carpet shop client: inventory, invoices, checks and reports.
#[derive(Debug, Parser)]
#[command(name = "farsh", version, about)]
pub struct Cli {
    /// Config file (default: <config_dir>/farsh.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login(auth::LoginArgs),

    /// Forget the stored session
    Logout,

    /// Carpet inventory
    #[command(subcommand)]
    Carpets(carpets::CarpetCommand),

    /// Sales invoices
    #[command(subcommand)]
    Invoice(invoice::InvoiceCommand),

    /// Checks received and issued
    #[command(subcommand)]
    Checks(checks::CheckCommand),

    /// Financial and inventory reports
    #[command(subcommand)]
    Reports(reports::ReportCommand),

    /// User accounts
    #[command(subcommand)]
    Users(users::UserCommand),
}

/// Installs the global tracing subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,farsh=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::load(cli.config, cli.json)?;
    info!(version = env!("CARGO_PKG_VERSION"), "farsh starting");

    match cli.command {
        Command::Login(args) => auth::login(&ctx, args).await,
        Command::Logout => auth::logout(&ctx).await,
        Command::Carpets(cmd) => carpets::run(&ctx, cmd).await,
        Command::Invoice(cmd) => invoice::run(&ctx, cmd).await,
        Command::Checks(cmd) => checks::run(&ctx, cmd).await,
        Command::Reports(cmd) => reports::run(&ctx, cmd).await,
        Command::Users(cmd) => users::run(&ctx, cmd).await,
    }
}
