//! # fhirgate CLI
//!
//! Parse, validate and convert FHIR resources from the command line.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use fhirgate_core::{FhirOptions, FhirServices, FhirVersion};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, Level};

mod commands;
mod input;

use commands::{
    Context, ConvertCommand, OutputFormat, ParseCommand, ValidateCommand, VersionCommand,
};

#[derive(Parser)]
#[command(name = "fhirgate")]
#[command(about = "Parse, validate and convert FHIR R4/R5 resources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (json, yaml or toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// FHIR version to use instead of the configured default
    #[arg(long, global = true)]
    fhir_version: Option<FhirVersion>,

    /// Parse strictly: unknown elements and coercions are errors
    #[arg(long, global = true)]
    strict: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a resource and print its metadata
    Parse(ParseCommand),
    /// Validate a resource against the base FHIR schema
    Validate(ValidateCommand),
    /// Convert a resource between JSON and XML
    Convert(ConvertCommand),
    /// Show the configured and supported FHIR versions
    Version(VersionCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Logs go to stderr so command output can be piped
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut options =
        FhirOptions::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(version) = cli.fhir_version {
        options.version = version;
    }
    if cli.strict {
        options.strict_validation = true;
    }
    debug!(fhir_version = %options.version, strict = options.strict_validation, "Options resolved");

    let ctx = Context {
        services: FhirServices::new(options).context("Failed to initialize FHIR services")?,
        output: cli.output,
    };

    let mut stdout = std::io::stdout().lock();
    let ok = match cli.command {
        Commands::Parse(cmd) => cmd.execute(&ctx, &mut stdout).await?,
        Commands::Validate(cmd) => cmd.execute(&ctx, &mut stdout).await?,
        Commands::Convert(cmd) => cmd.execute(&ctx, &mut stdout).await?,
        Commands::Version(cmd) => cmd.execute(&ctx, &mut stdout)?,
    };

    stdout.flush()?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
