//! Heirloom CLI - storefront operator tools.
//!
//! # Usage
//!
//! ```bash
//! # List persisted carts
//! heirloom-cli carts list
//!
//! # Show a cart's lines
//! heirloom-cli carts show <CART_ID>
//!
//! # Empty a cart
//! heirloom-cli carts clear <CART_ID>
//!
//! # Print the catalog
//! heirloom-cli catalog --category jewelry
//! ```
//!
//! # Commands
//!
//! - `carts` - Inspect and clear carts persisted by the storefront
//! - `catalog` - Print the built-in product catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use heirloom_storefront::config::StorefrontConfig;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "heirloom-cli")]
#[command(author, version, about = "Heirloom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect persisted carts
    Carts {
        /// Cart data directory (defaults to `STOREFRONT_DATA_DIR`)
        #[arg(short, long, global = true)]
        data_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: CartAction,
    },
    /// Print the product catalog
    Catalog {
        /// Only show one category (bags, jewelry, accessories, clothing)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List every persisted cart
    List,
    /// Show the lines of one cart
    Show {
        /// Cart ID
        id: String,
    },
    /// Empty one cart
    Clear {
        /// Cart ID
        id: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Carts { data_dir, action } => {
            let data_dir = match data_dir {
                Some(dir) => dir,
                None => StorefrontConfig::from_env()?.data_dir,
            };
            match action {
                CartAction::List => commands::carts::list(&data_dir, &mut out)?,
                CartAction::Show { id } => commands::carts::show(&data_dir, &id, &mut out)?,
                CartAction::Clear { id } => commands::carts::clear(&data_dir, &id)?,
            }
        }
        Commands::Catalog { category } => {
            commands::catalog::list(category.as_deref(), &mut out)?;
        }
    }
    Ok(())
}
