//! Slipbook CLI - Database migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! slipbook migrate
//!
//! # Give an existing account access to the back-office
//! slipbook admin grant -e owner@example.com
//!
//! # Take it away again
//! slipbook admin revoke -e owner@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "slipbook")]
#[command(author, version, about = "Slipbook CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage back-office access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Mark an account as admin
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Clear the admin flag on an account
    Revoke {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::set_admin(&email, true).await?,
            AdminAction::Revoke { email } => commands::admin::set_admin(&email, false).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_admin_grant() {
        let cli = Cli::try_parse_from(["slipbook", "admin", "grant", "-e", "owner@shop.ng"])
            .expect("parses");
        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::Grant { ref email }
            } if email == "owner@shop.ng"
        ));
    }

    #[test]
    fn test_admin_requires_email() {
        assert!(Cli::try_parse_from(["slipbook", "admin", "revoke"]).is_err());
    }
}
