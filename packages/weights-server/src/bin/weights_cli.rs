//! One-shot runner: resolve and extract weights for ISINs given on the
//! command line, printing one JSON document per line.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use factsheet_weights::{MemoryStore, PipelineConfig, StaticMapping, WeightsStore, WeightsWorkflow};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weights_server::Config;

#[derive(Parser)]
#[command(name = "weights-cli")]
#[command(about = "Extract crypto constituent weights from issuer factsheets")]
struct Cli {
    /// ISINs to process
    #[arg(required = true)]
    isins: Vec<String>,

    /// Skip the database and keep the cache in memory
    #[arg(long)]
    no_db: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays line-delimited JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,factsheet_weights=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let workflow = if cli.no_db {
        let store: Arc<dyn WeightsStore> = Arc::new(MemoryStore::new());
        WeightsWorkflow::production(Arc::new(StaticMapping::new()), store, PipelineConfig::default())
    } else {
        let config = Config::from_env().context("Failed to load configuration")?;
        let store = config.connect_store().await?;
        WeightsWorkflow::production(Arc::new(config.load_mapping()?), store, config.pipeline.clone())
    };

    let mut failed = false;
    for isin in &cli.isins {
        let line = match workflow.run(isin).await {
            Ok(result) => serde_json::to_string(&result)?,
            Err(err) => {
                failed = true;
                serde_json::to_string(&json!({ "isin": isin, "error": err }))?
            }
        };
        println!("{}", line);
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
