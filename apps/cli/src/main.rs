//! # farsh Entry Point
//!
//! Parses arguments and hands over to [`farsh_cli::run`]; the actual setup
//! is in lib.rs for better testability.

use clap::Parser;
use farsh_cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        if json {
            match serde_json::to_string(&err) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", err),
            }
        } else {
            eprintln!("error: {}", err.message);
        }
        std::process::exit(err.code.exit_code());
    }
}
