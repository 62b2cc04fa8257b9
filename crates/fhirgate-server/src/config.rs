//! Server configuration management

use clap::Parser;
use fhirgate_core::{config::ENV_PREFIX, FhirOptions, FhirVersion};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, ServerError};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// FHIR processing options
    #[serde(default)]
    pub fhir: FhirOptions,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    #[serde(default = "default_true")]
    pub compression_enabled: bool,
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Log filter directive, e.g. `info` or `fhirgate_core=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub structured_logging: bool,
}

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "fhirgate-server")]
#[command(about = "FHIR parsing, validation and conversion over HTTP")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Server host
    #[arg(long, env = "FHIRGATE_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, env = "FHIRGATE_PORT")]
    pub port: Option<u16>,

    /// Default FHIR version (R4 or R5)
    #[arg(long, env = "FHIRGATE_FHIR_VERSION")]
    pub fhir_version: Option<FhirVersion>,

    /// Parse every request strictly
    #[arg(long)]
    pub strict: bool,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,
}

impl ServerConfig {
    /// Load configuration from defaults, file, environment and arguments,
    /// later sources winning
    pub fn load(args: &Args) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&Self::default())?);

        if let Some(config_path) = &args.config {
            builder = builder.add_source(config::File::from(config_path.clone()));
        }

        // FHIRGATE_SERVER__PORT=9000, FHIRGATE_FHIR__VERSION=R5
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;

        if let Some(host) = &args.host {
            config.server.host = host.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(version) = args.fhir_version {
            config.fhir.version = version;
        }
        if args.strict {
            config.fhir.strict_validation = true;
        }
        if let Some(log_level) = &args.log_level {
            config.monitoring.log_level = log_level.clone();
        }

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ServerError::Config(config::ConfigError::Message(
                "Server port must be greater than 0".to_string(),
            )));
        }

        if self.server.timeout == 0 {
            return Err(ServerError::Config(config::ConfigError::Message(
                "Server timeout must be greater than 0".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout: default_timeout(),
            max_body_size: default_max_body_size(),
            cors_enabled: default_true(),
            compression_enabled: default_true(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            structured_logging: false,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_max_body_size() -> usize { 16 * 1024 * 1024 } // 16MB
fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
