//! Scheduled entry point: runs one export reconciliation and exits

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use journal_export_lib::{
    ExportConfig, ExportProcessor, QldbClient, QldbJobService, S3Client, S3ObjectStore,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Journal export v{}", journal_export_lib::VERSION);

    let config = ExportConfig::from_env().context("Failed to load export configuration")?;
    let timeout = config.invocation_timeout();

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = Arc::new(S3ObjectStore::new(Arc::new(S3Client::new(&aws_config))));
    let jobs = Arc::new(QldbJobService::new(Arc::new(QldbClient::new(&aws_config))));
    let processor = ExportProcessor::new(store, jobs, config);

    match processor.run_with_deadline(timeout).await {
        Ok(outcome) => {
            println!("{}", outcome.status_message());
            Ok(())
        }
        Err(e) => {
            error!("Export reconciliation failed: {}", e);
            Err(e).context("Export reconciliation failed")
        }
    }
}
