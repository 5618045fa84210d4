//! Comfy House CLI - drive the storefront widget from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Fetch the catalog and store a snapshot of it
//! comfy catalog
//!
//! # Cart operations (use ids from the catalog listing)
//! comfy add 1
//! comfy increase 1
//! comfy decrease 1
//! comfy remove 1
//! comfy clear
//!
//! # Show the persisted cart
//! comfy cart
//!
//! # Render the full page
//! comfy render --output index.html
//! ```
//!
//! The cart and catalog snapshot live in `STOREFRONT_STORAGE_DIR` and survive
//! between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_house_core::ProductId;
use comfy_house_storefront::config::StorefrontConfig;
use comfy_house_storefront::error::AppError;
use comfy_house_storefront::view::{
    ClickTarget, DECREMENT_MARKER, INCREMENT_MARKER, REMOVE_MARKER, UiEvent,
};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "comfy")]
#[command(author, version, about = "Comfy House storefront widget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog, store a snapshot and list the products
    Catalog,
    /// Add a product to the cart
    Add {
        /// Product id from the catalog
        id: String,
    },
    /// Remove a product's line from the cart
    Remove { id: String },
    /// Increase a line's amount by one
    Increase { id: String },
    /// Decrease a line's amount by one (removes the line at one)
    Decrease { id: String },
    /// Remove every line from the cart
    Clear,
    /// Show the cart lines and totals
    Cart,
    /// Run the full startup sequence and write the page HTML
    Render {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

fn cart_click(marker: &str, id: String) -> UiEvent {
    UiEvent::CartClick(ClickTarget::new(marker, Some(ProductId::new(id))))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "comfy_house_cli=info,comfy_house_storefront=info".into());

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        e.capture();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    match cli.command {
        Commands::Catalog => commands::catalog(config).await?,
        Commands::Add { id } => {
            commands::dispatch(config, UiEvent::AddToCart(ProductId::new(id)))?;
        }
        Commands::Remove { id } => commands::dispatch(config, cart_click(REMOVE_MARKER, id))?,
        Commands::Increase { id } => {
            commands::dispatch(config, cart_click(INCREMENT_MARKER, id))?;
        }
        Commands::Decrease { id } => {
            commands::dispatch(config, cart_click(DECREMENT_MARKER, id))?;
        }
        Commands::Clear => commands::dispatch(config, UiEvent::ClearCart)?,
        Commands::Cart => commands::show_cart(config)?,
        Commands::Render { output } => commands::render(config, output.as_deref()).await?,
    }
    Ok(())
}
