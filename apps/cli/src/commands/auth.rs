//! Login and logout.

use std::io::BufRead;

use clap::Args;
use farsh_client::error::fallback;
use serde_json::json;
use tracing::info;

use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::print_json;

#[derive(Debug, Args)]
pub struct LoginArgs {
    pub username: String,

    /// Read from the first line of stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

pub async fn login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_password_line()?,
    };
    if args.username.trim().is_empty() || password.is_empty() {
        return Err(CliError::validation("username and password are required"));
    }

    let user = ctx
        .session
        .login(&ctx.api, args.username.trim(), &password)
        .await
        .map_err(|e| CliError::client(e, fallback::LOGIN))?;

    if ctx.json {
        print_json(&user)
    } else {
        println!(
            "Logged in as {} ({})",
            user.full_name.as_deref().unwrap_or(&user.username),
            user.role.alias()
        );
        Ok(())
    }
}

pub async fn logout(ctx: &AppContext) -> CliResult<()> {
    ctx.session.logout().await?;
    info!(path = ?ctx.session.path(), "Session file removed");
    if ctx.json {
        print_json(&json!({ "logged_out": true }))
    } else {
        println!("Logged out");
        Ok(())
    }
}

fn read_password_line() -> CliResult<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
