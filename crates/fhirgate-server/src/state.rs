//! Application state management

use fhirgate_core::FhirServices;

use crate::{config::ServerConfig, error::Result};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Parser and validation services
    pub services: FhirServices,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let services = FhirServices::new(config.fhir.clone())?;
        Ok(Self { services, config })
    }
}
