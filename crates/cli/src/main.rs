//! Pocket Bazaar CLI - a terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! bazaar products
//! bazaar products --category electronics
//! bazaar products --featured 4
//! bazaar product 1
//! bazaar categories
//!
//! # Sign in and shop
//! bazaar login shopper@example.com
//! bazaar cart add 1
//! bazaar cart set 1 3
//! bazaar cart show
//! bazaar checkout
//! bazaar orders
//! bazaar logout
//! ```
//!
//! State is kept under `BAZAAR_DATA_DIR` (default `.bazaar`), so the cart
//! and session survive between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pocket_bazaar_core::ProductId;
use pocket_bazaar_storefront::{Storefront, StorefrontConfig, StorefrontError};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Pocket Bazaar terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long, conflicts_with = "featured")]
        category: Option<String>,

        /// Show this many randomly picked products
        #[arg(short, long)]
        featured: Option<usize>,
    },
    /// Show one product
    Product {
        /// Product id
        id: ProductId,
    },
    /// List categories
    Categories,
    /// Sign in (no password; the email only labels the session)
    Login {
        /// Email address
        email: String,
    },
    /// Sign out and empty the cart
    Logout,
    /// Show who is signed in
    Whoami,
    /// Inspect or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Pay for the cart and place an order
    Checkout,
    /// Show order history
    Orders,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        id: ProductId,
    },
    /// Set a product's quantity (values below 1 become 1)
    Set {
        /// Product id
        id: ProductId,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Remove everything
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail(&StorefrontError::from(e)),
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocket_bazaar_storefront=info,pocket_bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match Storefront::new(config) {
        Ok(shop) => run(&shop, cli).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        fail(&e);
    }
}

#[allow(clippy::print_stderr)]
fn fail(error: &StorefrontError) -> ! {
    eprintln!("{}", error.user_message());
    std::process::exit(1);
}

async fn run(shop: &Storefront, cli: Cli) -> Result<(), StorefrontError> {
    match cli.command {
        Commands::Products { category, featured } => {
            commands::catalog::products(shop, category.as_deref(), featured).await?;
        }
        Commands::Product { id } => commands::catalog::product(shop, id).await?,
        Commands::Categories => commands::catalog::categories(shop).await?,
        Commands::Login { email } => commands::account::login(shop, &email)?,
        Commands::Logout => commands::account::logout(shop)?,
        Commands::Whoami => commands::account::whoami(shop),
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(shop),
            CartAction::Add { id } => commands::cart::add(shop, id).await?,
            CartAction::Set { id, quantity } => commands::cart::set(shop, id, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(shop, id)?,
            CartAction::Clear => commands::cart::clear(shop)?,
        },
        Commands::Checkout => commands::checkout::checkout(shop).await?,
        Commands::Orders => commands::checkout::orders(shop)?,
    }
    Ok(())
}
