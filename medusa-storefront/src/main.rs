//! Medusa storefront CLI
//!
//! Browses a Medusa store's catalog and runs scripted checkouts against it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod config;
mod plan;
mod render;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::ConfigLoader;
use medusa_checkout::CheckoutSession;
use medusa_sdk::client::StoreClient;
use medusa_sdk::objects::requests::ProductQuery;
use plan::CheckoutPlan;
use runner::{Outcome, run_plan};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Medusa storefront - catalog browsing and scripted checkout
#[derive(Parser, Debug)]
#[command(name = "medusa-storefront")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./storefront.toml")]
    config: PathBuf,

    /// Override the store base URL (e.g., http://localhost:9000)
    #[arg(long)]
    base_url: Option<Url>,

    /// Publishable API key; overrides the configuration file
    #[arg(long, env = "MEDUSA_PUBLISHABLE_API_KEY", hide_env_values = true)]
    publishable_api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the store's regions
    Regions,
    /// List products, priced in a region
    Products {
        #[arg(long)]
        region: Option<String>,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// List product categories
    Categories,
    /// Show a cart
    Cart { cart_id: String },
    /// Run a checkout plan up to the review step
    Checkout {
        /// Plan file (TOML)
        plan: PathBuf,
        /// Place the order once the plan reaches the review step
        #[arg(long, default_value = "false")]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::debug!("Starting medusa-storefront v{}", env!("CARGO_PKG_VERSION"));

    let loader = ConfigLoader::new(&args.config, args.base_url, args.publishable_api_key);
    let loaded = loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::debug!(base_url = %loaded.store.base_url, "Configuration loaded from {:?}", args.config);

    let client = StoreClient::new(&loaded.store)?;

    match args.command {
        Command::Regions => {
            let page = client.list_regions().await?;
            for region in &page.items {
                println!("{}", render::region_line(region));
            }
        }
        Command::Products {
            region,
            categories,
            query,
            limit,
            offset,
        } => {
            let region_id = region.or(loaded.default_region);
            let currency = match &region_id {
                Some(region_id) => Some(client.get_region(region_id).await?.currency_code),
                None => None,
            };
            let query = ProductQuery {
                limit,
                offset,
                category_ids: categories,
                region_id,
                q: query,
                ..ProductQuery::default()
            };
            let page = client.list_products(&query).await?;
            for product in &page.items {
                println!("{}", render::product_line(product, currency.as_deref()));
            }
            if page.has_more() {
                println!("... {} of {} shown", page.items.len(), page.count);
            }
        }
        Command::Categories => {
            let page = client.list_categories().await?;
            for category in &page.items {
                println!("{:<28} {}", category.id, category.name);
            }
        }
        Command::Cart { cart_id } => {
            let cart = client.get_cart(&cart_id).await?;
            println!("{}", render::cart_summary(&cart));
        }
        Command::Checkout { plan, confirm } => {
            let plan = CheckoutPlan::load(&plan)?;
            let mut session = CheckoutSession::new(client);
            match run_plan(&mut session, &plan, loaded.default_region.as_deref(), confirm).await {
                Ok(Outcome::Ready(cart)) => {
                    println!("{}", render::cart_summary(&cart));
                    for option in session.shipping_options() {
                        println!(
                            "  option {}",
                            render::shipping_option_line(option, &cart.currency_code)
                        );
                    }
                    println!("Review complete; run again with --confirm to place the order.");
                }
                Ok(Outcome::Placed(order)) => {
                    println!("{}", render::order_summary(&order));
                }
                Err(e) => {
                    if let Some(cart) = session.cart() {
                        eprintln!("{}", render::cart_summary(cart));
                    }
                    tracing::error!(step = %session.step(), "Checkout stopped: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,medusa_sdk=info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
