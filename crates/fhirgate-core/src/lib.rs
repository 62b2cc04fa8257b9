//! # fhirgate-core
//!
//! Resource processing core: resolves per-request configuration, dispatches
//! to the FHIR engine for the requested format and version, extracts
//! resource metadata and reports validation issues by severity.
//!
//! ```
//! use fhirgate_core::{FhirOptions, FhirServices, ParseRequest};
//!
//! # tokio_test::block_on(async {
//! let services = FhirServices::new(FhirOptions::default())?;
//! let result = services
//!     .parser
//!     .parse(&ParseRequest::json(r#"{"resourceType":"Patient","gender":"female"}"#))
//!     .await;
//! assert!(result.success);
//! assert_eq!(result.metadata["gender"].as_deref(), Some("female"));
//! # Ok::<(), fhirgate_core::CoreError>(())
//! # })?;
//! # Ok::<(), fhirgate_core::CoreError>(())
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod issues;
pub mod metadata;
pub mod models;
pub mod services;

pub use config::{resolve, ConfigOverride, EffectiveConfig, FhirOptions};
pub use dispatcher::{Dispatcher, DispatcherBuilder, EngineBinding, FormatBinding};
pub use error::{ConversionError, CoreError, CoreResult};
pub use issues::{partition, IssueSeverity, PartitionedIssues, ValidationIssue};
pub use metadata::Metadata;
pub use models::{ParseRequest, ParseResult, ValidationRequest, ValidationResult};
pub use services::{FhirServices, ParserService, ValidationService};

// Engine types that appear in the public API
pub use fhirgate_engine::{FhirVersion, ResourceFormat, FHIR_JSON_MIME, FHIR_XML_MIME};
