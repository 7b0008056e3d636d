//! Linked Art gateway CLI
//!
//! Usage:
//!   cargo run --bin la_cli --features cli -- get wikidata Q296 --type Person
//!   cargo run --bin la_cli --features cli -- search wikidata,getty "claude monet"

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use linked_art_gateway::{GatewayConfig, GatewayService, ResolveError};

#[derive(Parser)]
#[command(name = "la_cli")]
#[command(about = "Resolve and search Linked Art records across datasets")]
struct Cli {
    /// Dataset configuration file
    #[arg(long, env = "LA_GATEWAY_CONFIG", default_value = "config/datasets.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one identifier (absolute URI or local form)
    Get {
        dataset: String,
        identifier: String,
        /// Entity-type hint (Person, Group, Place, ...)
        #[arg(long = "type", default_value = "")]
        entity_type: String,
    },
    /// Search comma-separated datasets by name
    Search {
        datasets: String,
        name: String,
        #[arg(long, default_value = "en")]
        lang: String,
        #[arg(long = "type", default_value = "")]
        entity_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linked_art_gateway=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::from_file(&cli.config)?;
    let service = GatewayService::from_config(&config)?;

    match cli.command {
        Command::Get {
            dataset,
            identifier,
            entity_type,
        } => match service.get_by_id(&dataset, &identifier, &entity_type).await {
            Ok(found) => println!("{}", serde_json::to_string_pretty(&found)?),
            Err(ResolveError::UnknownDataset(name)) => {
                bail!("Unknown dataset '{}'; configured: {:?}", name, service.health().datasets)
            }
            Err(error) => return Err(error.into()),
        },
        Command::Search {
            datasets,
            name,
            lang,
            entity_type,
        } => {
            let found = service
                .search_by_name(&datasets, &name, &lang, &entity_type)
                .await;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
    }

    Ok(())
}
