use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use thomann_bills_lib::domain::services::PageFetcher;
use thomann_bills_lib::infrastructure::config::load_account_fields;
use thomann_bills_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use thomann_bills_lib::{BillConnector, ConfigManager, FileBillStore, HttpClient};

#[derive(Parser)]
#[command(name = "thomann-bills", version, about = "Download invoices from a thomann.de customer account.")]
struct Cli {
    /// JSON file with the account login and password
    #[arg(long)]
    fields: PathBuf,
    /// Configuration file (default: thomann-bills/config.json in the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory the bills are stored in, overriding the configuration
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the bill records as JSON instead of downloading them
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;
    if let Some(output) = cli.output {
        config.storage.output_dir = output;
    }

    init_logging_with_config(&config.logging)?;
    log_system_info();

    let fields = load_account_fields(&cli.fields).await?;
    let client = Arc::new(HttpClient::with_config(config.http.clone())?);
    let connector = BillConnector::new(&config, Arc::clone(&client))?;

    if cli.dry_run {
        let bills = connector.fetch_bills(&fields).await.inspect_err(|e| error!("❌ {}", e))?;
        println!("{}", serde_json::to_string_pretty(&bills).context("Failed to serialize bills")?);
        return Ok(());
    }

    let fetcher: Arc<dyn PageFetcher> = client;
    let store = FileBillStore::new(config.storage.output_dir.clone(), config.storage.index_file.clone(), fetcher);
    let report = connector.run(&fields, &store).await.inspect_err(|e| error!("❌ {}", e))?;

    info!(
        "✅ {} bills: {} downloaded, {} already stored in {:?}",
        report.bills.len(),
        report.saved,
        report.skipped,
        config.storage.output_dir
    );
    Ok(())
}
