use anyhow::{Context, Result};
use clap::Parser;
use fhirgate_core::{FhirOptions, FhirServices, FhirVersion};
use fhirgate_mcp::{FhirTools, McpServer};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fhirgate-mcp")]
#[command(about = "FHIR parsing and validation tools over the Model Context Protocol")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default FHIR version (R4 or R5)
    #[arg(long, env = "FHIRGATE_FHIR_VERSION")]
    fhir_version: Option<FhirVersion>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries protocol frames
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut options =
        FhirOptions::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(version) = args.fhir_version {
        options.version = version;
    }

    tracing::info!(fhir_version = %options.version, "Starting fhirgate MCP server");

    let services = FhirServices::new(options).context("Failed to initialize FHIR services")?;
    let server = McpServer::new(FhirTools::new(services));
    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("MCP transport failed")?;
    Ok(())
}
