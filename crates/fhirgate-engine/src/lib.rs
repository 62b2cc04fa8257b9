//! # fhirgate-engine
//!
//! Minimal FHIR document engine: parses and serializes Patient and
//! Observation resources (and the base elements of any other resource) in
//! FHIR JSON and FHIR XML, for R4 and R5.
//!
//! ```
//! use fhirgate_engine::{FhirEngine, FhirVersion, ParseMode, ResourceFormat};
//!
//! let engine = FhirEngine::new(FhirVersion::R4)?;
//! let parsed = engine.parse(
//!     r#"{"resourceType":"Patient","id":"example","gender":"female"}"#,
//!     ResourceFormat::Json,
//!     ParseMode::Lenient,
//! )?;
//! assert_eq!(parsed.resource.id(), Some("example"));
//! # Ok::<(), fhirgate_engine::EngineError>(())
//! ```

#![warn(clippy::all)]

mod decode;
pub mod engine;
pub mod error;
pub mod format;
mod json;
mod primitive;
pub mod resource;
pub mod schema;
pub mod version;
mod xml;

pub use engine::FhirEngine;
pub use error::{EngineError, EngineResult, FormatError};
pub use format::{ResourceFormat, FHIR_JSON_MIME, FHIR_XML_MIME};
pub use resource::{
    NoticeKind, ObservationView, ParseMode, ParseNotice, ParsedResource, PatientView, Resource,
};
pub use version::FhirVersion;
pub use xml::FHIR_NAMESPACE;
