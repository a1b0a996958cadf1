//! Group Order CLI - Database migrations and cart inspection.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! go-cli migrate run
//!
//! # Show which migrations have been applied
//! go-cli migrate status
//!
//! # Print a cart's badge, optionally for one viewer
//! go-cli cart badge 3f1c... --member-id m1
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "go-cli")]
#[command(author, version, about = "Group Order CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Inspect stored carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply pending migrations
    Run,
    /// List migrations and whether they have been applied
    Status,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the badge for a cart
    Badge {
        /// Cart ID
        cart_id: String,

        /// Only count items belonging to this member
        #[arg(short, long)]
        member_id: Option<String>,

        /// Viewer email, for guest attribution
        #[arg(short, long)]
        email: Option<String>,

        /// Viewer full name, for guest attribution
        #[arg(short = 'n', long)]
        full_name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate { action } => match action {
            MigrateAction::Run => commands::migrate::run().await?,
            MigrateAction::Status => commands::migrate::status().await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Badge {
                cart_id,
                member_id,
                email,
                full_name,
            } => {
                commands::cart::badge(&cart_id, member_id, email, full_name).await?;
            }
        },
    }
    Ok(())
}
