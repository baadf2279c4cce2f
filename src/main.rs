use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use storefront_core::{client, config, events, Storefront};

#[derive(Parser)]
#[command(name = "storefront", about = "Storefront smoke CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog from the configured backend
    Products,
    /// Show one product
    Product {
        /// Product id
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let backend =
        Arc::new(client::HttpBackend::from_config(&cfg).context("failed to build backend client")?);

    let (event_sender, event_rx) = events::EventSender::channel(1024);
    tokio::spawn(events::process_events(event_rx));

    let storefront = Storefront::new(cfg, backend, event_sender);

    match cli.command {
        Command::Products => {
            let products = storefront.backend.list_products().await?;
            for product in products {
                let stock = if product.in_stock() {
                    format!("{} in stock", product.stock)
                } else {
                    "out of stock".to_string()
                };
                println!(
                    "{}  {}  {} {}  ({})",
                    product.id, product.name, storefront.config.currency, product.unit_price, stock
                );
            }
        }
        Command::Product { id } => {
            let product = storefront.backend.get_product(id).await?;
            println!("{:#?}", product);
        }
    }

    Ok(())
}
