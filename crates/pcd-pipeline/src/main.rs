//! Primary Care Domain refset pipeline binary.

use std::process::ExitCode;

use pcd_pipeline::{run, PipelineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Files directory: {}", config.files_dir.display());

    match run(&config).await {
        Ok(summary) => {
            tracing::info!(
                "Finished {}: {} objects uploaded, {} versions indexed",
                summary.release,
                summary.uploaded,
                summary.versions.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
