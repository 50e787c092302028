//! Tienda CLI - browse the catalog, manage the cart and list orders.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally for one home-page tab or category
//! tienda products --variant camisetas
//! tienda products --category hombre
//!
//! # Search by name prefix (reads queries from stdin when none is given)
//! tienda search camis
//!
//! # Manage the persisted cart
//! tienda cart add camiseta-basica
//! tienda cart show
//!
//! # List a user's orders
//! tienda orders user_2abc
//! ```
//!
//! # Commands
//!
//! - `products` / `product` - Browse the catalog
//! - `categories` - List categories
//! - `search` - Debounced name search
//! - `cart` - Add, remove, show and clear cart items
//! - `orders` - List a user's orders, newest first

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tienda_storefront::config::StorefrontConfig;
use tienda_storefront::state::AppState;
use tienda_storefront::telemetry;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "tienda")]
#[command(author, version, about = "Tienda storefront CLI")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products listed under this home-page tab
        #[arg(short, long, conflicts_with = "category")]
        variant: Option<String>,

        /// Only products in the category with this slug
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Product {
        /// Product slug
        slug: String,
    },
    /// List categories
    Categories {
        /// Maximum number of categories
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Search products by name prefix
    Search {
        /// Query text; omit to read queries line by line from stdin
        query: Option<String>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List a user's orders
    Orders {
        /// User ID from the identity provider
        user_id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product slug
        slug: String,
    },
    /// Remove one unit of a product
    Remove {
        /// Product slug
        slug: String,
    },
    /// Remove a product line entirely
    Delete {
        /// Product slug
        slug: String,
    },
    /// Show cart contents and totals
    Show,
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(cli.json_logs);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(cli.json_logs);

    if let Err(e) = run(cli.command, config).await {
        e.report();
        tracing::error!("Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), CommandError> {
    let state = AppState::new(config)?;

    match command {
        Commands::Products { variant, category } => {
            commands::catalog::products(&state, variant.as_deref(), category.as_deref()).await?;
        }
        Commands::Product { slug } => commands::catalog::product(&state, &slug).await?,
        Commands::Categories { limit } => commands::catalog::categories(&state, limit).await?,
        Commands::Search { query } => match query {
            Some(query) => commands::search::once(&state, &query).await?,
            None => commands::search::interactive(&state).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add { slug } => commands::cart::add(&state, &slug).await?,
            CartAction::Remove { slug } => commands::cart::remove(&state, &slug)?,
            CartAction::Delete { slug } => commands::cart::delete(&state, &slug)?,
            CartAction::Show => commands::cart::show(&state)?,
            CartAction::Clear => commands::cart::clear(&state)?,
        },
        Commands::Orders { user_id } => commands::orders::list(&state, &user_id).await?,
    }
    Ok(())
}
