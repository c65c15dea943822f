//! User administration and the current profile.

use clap::{Args, Subcommand};
use farsh_client::wire::{NewUser, UserUpdate};
use farsh_core::{User, UserRole};
use serde_json::json;

use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{jalali, print_fields, print_json, Table};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// The logged-in user
    Me,

    /// All users (admin)
    List,

    /// Register a user (admin)
    Add(AddArgs),

    /// Change a user (admin)
    Update(UpdateArgs),

    /// Delete a user (admin)
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub password: String,
    /// admin or user
    #[arg(long, default_value = "user")]
    pub role: UserRole,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
}

pub async fn run(ctx: &AppContext, cmd: UserCommand) -> CliResult<()> {
    let users = ctx.users();

    match cmd {
        UserCommand::Me => {
            let user = users.me().await?;
            ctx.session.handle().write().await.set_user(user.clone());
            ctx.session.persist().await?;
            show(ctx, &user)
        }

        UserCommand::List => {
            let all = users.list().await?;
            if ctx.json {
                return print_json(&all);
            }
            let mut table = Table::new(["ID", "Username", "Name", "Role", "Active", "Last login"]);
            for user in &all {
                table.row([
                    user.id.to_string(),
                    user.username.clone(),
                    user.full_name.clone().unwrap_or_default(),
                    user.role.to_string(),
                    user.is_active.to_string(),
                    user.last_login.as_ref().map(jalali).unwrap_or_default(),
                ]);
            }
            table.print();
            Ok(())
        }

        UserCommand::Add(args) => {
            let user = NewUser {
                username: args.username,
                email: args.email,
                full_name: args.full_name,
                password: args.password,
                role: args.role,
            };
            let created = users.register(&user).await?;
            show(ctx, &created)
        }

        UserCommand::Update(args) => {
            let update = UserUpdate {
                email: args.email,
                full_name: args.full_name,
                password: args.password,
                is_active: args.active,
            };
            if update == UserUpdate::default() {
                return Err(CliError::validation("nothing to update"));
            }
            let updated = users.update(args.id, &update).await?;
            show(ctx, &updated)
        }

        UserCommand::Delete { id } => {
            users.delete(id).await?;
            if ctx.json {
                print_json(&json!({ "deleted": "user", "id": id }))
            } else {
                println!("Deleted user {}", id);
                Ok(())
            }
        }
    }
}

fn show(ctx: &AppContext, user: &User) -> CliResult<()> {
    if ctx.json {
        return print_json(user);
    }
    print_fields(&[
        ("ID", user.id.to_string()),
        ("Username", user.username.clone()),
        ("Email", user.email.clone()),
        ("Name", user.full_name.clone().unwrap_or_default()),
        ("Role", user.role.to_string()),
        ("Active", user.is_active.to_string()),
        ("Joined", jalali(&user.created_at)),
    ]);
    Ok(())
}
