//! Shopfront CLI - browse the catalog and manage cart, wishlist and orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog (no login needed)
//! shopfront products list --search pineapple --max-price 20
//! shopfront products show 65f1c0ffee
//!
//! # Commands that need an account read SHOPFRONT_EMAIL / SHOPFRONT_PASSWORD
//! shopfront cart add 65f1c0ffee -q 2
//! shopfront cart show
//! shopfront orders checkout --address "1 Dock Rd, Portsmouth"
//!
//! # Administrator views
//! shopfront admin orders
//! shopfront admin set-status 65f1beef shipped
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_BASE_URL` - Backend base URL (default `http://localhost:8000`)
//! - `SHOPFRONT_EMAIL` / `SHOPFRONT_PASSWORD` - Account used for protected commands
//! - `RUST_LOG` - Log filter (default `shopfront_client=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products and categories
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Place, list and cancel orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Administrator views
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Account commands
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Match name or description
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<Decimal>,

        #[arg(long)]
        max_price: Option<Decimal>,

        #[arg(long, default_value_t = 0)]
        skip: u32,

        /// Page size (1-100)
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one product
    Show { id: String },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with its total
    Show,
    /// Add a product
    Add {
        product: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (values below 1 become 1)
    Update {
        item: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Raise a line's quantity by one
    Inc { item: String },
    /// Lower a line's quantity by one
    Dec { item: String },
    /// Remove a line
    Remove { item: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product
    Add { product: String },
    /// Remove a saved product
    Remove { product: String },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: String },
    /// Order everything in the cart
    Checkout {
        #[arg(short, long)]
        address: String,
    },
    /// Cancel a pending order
    Cancel { id: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List all users
    Users,
    /// List all products, including inactive ones
    Products,
    /// List categories
    Categories,
    /// List all orders
    Orders,
    /// Change an order's status
    SetStatus { order: String, status: String },
    /// Delete a product
    DeleteProduct { id: String },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Show the logged-in identity
    Whoami,
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        username: String,

        #[arg(short = 'n', long)]
        full_name: String,

        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check whether the current account may open a path
    Route { path: String },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                search,
                category,
                min_price,
                max_price,
                skip,
                limit,
            } => {
                let filter = commands::catalog::ListFilter {
                    search,
                    category,
                    min_price,
                    max_price,
                    skip,
                    limit,
                };
                commands::catalog::list(filter).await?;
            }
            ProductsAction::Show { id } => commands::catalog::show(&id).await?,
            ProductsAction::Categories => commands::catalog::categories().await?,
        },
        Commands::Cart { action } => {
            let cmd = match action {
                CartAction::Show => commands::collections::CartCommand::Show,
                CartAction::Add { product, quantity } => {
                    commands::collections::CartCommand::Add { product, quantity }
                }
                CartAction::Update { item, quantity } => {
                    commands::collections::CartCommand::Update { item, quantity }
                }
                CartAction::Inc { item } => commands::collections::CartCommand::Increment(item),
                CartAction::Dec { item } => commands::collections::CartCommand::Decrement(item),
                CartAction::Remove { item } => commands::collections::CartCommand::Remove(item),
                CartAction::Clear => commands::collections::CartCommand::Clear,
            };
            commands::collections::cart(cmd).await?;
        }
        Commands::Wishlist { action } => {
            let cmd = match action {
                WishlistAction::Show => commands::collections::WishlistCommand::Show,
                WishlistAction::Add { product } => {
                    commands::collections::WishlistCommand::Add(product)
                }
                WishlistAction::Remove { product } => {
                    commands::collections::WishlistCommand::Remove(product)
                }
                WishlistAction::Clear => commands::collections::WishlistCommand::Clear,
            };
            commands::collections::wishlist(cmd).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list().await?,
            OrdersAction::Show { id } => commands::orders::show(&id).await?,
            OrdersAction::Checkout { address } => commands::orders::checkout(&address).await?,
            OrdersAction::Cancel { id } => commands::orders::cancel(&id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Users => commands::admin::users().await?,
            AdminAction::Products => commands::admin::products().await?,
            AdminAction::Categories => commands::admin::categories().await?,
            AdminAction::Orders => commands::admin::orders().await?,
            AdminAction::SetStatus { order, status } => {
                commands::admin::set_status(&order, &status).await?;
            }
            AdminAction::DeleteProduct { id } => commands::admin::delete_product(&id).await?,
        },
        Commands::Account { action } => match action {
            AccountAction::Whoami => commands::account::whoami().await?,
            AccountAction::Register {
                email,
                username,
                full_name,
                password,
            } => {
                commands::account::register(&email, &username, &full_name, password).await?;
            }
            AccountAction::Route { path } => commands::account::route(&path).await?,
        },
    }
    Ok(())
}
