use anyhow::{Context, Result};
use clap::Parser;
use fhirgate_server::{Args, Server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load(&args).context("Failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.monitoring.log_level)
        .with_context(|| format!("Invalid log level '{}'", config.monitoring.log_level))?;
    if config.monitoring.structured_logging {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let server = Server::new(config).context("Failed to initialize FHIR services")?;
    server.start().await?;
    Ok(())
}
