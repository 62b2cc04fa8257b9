//! Parsing and validation services

pub mod parser;
pub mod validation;

pub use parser::ParserService;
pub use validation::ValidationService;

use crate::config::FhirOptions;
use crate::dispatcher::Dispatcher;
use crate::error::CoreResult;

/// Both services sharing one dispatcher and one set of defaults
#[derive(Debug, Clone)]
pub struct FhirServices {
    pub options: FhirOptions,
    pub parser: ParserService,
    pub validation: ValidationService,
}

impl FhirServices {
    /// Build the engine bindings for every supported version and wire the
    /// services; fails when any format and version pair cannot be bound
    pub fn new(options: FhirOptions) -> CoreResult<Self> {
        let dispatcher = Dispatcher::new()?;
        Ok(Self::with_dispatcher(options, dispatcher))
    }

    pub fn with_dispatcher(options: FhirOptions, dispatcher: Dispatcher) -> Self {
        let defaults = options.effective_defaults();
        tracing::info!(
            version = %defaults.version,
            strict = defaults.strict,
            "FHIR services initialized"
        );
        Self {
            parser: ParserService::new(defaults, dispatcher.clone()),
            validation: ValidationService::new(defaults, dispatcher),
            options,
        }
    }
}
