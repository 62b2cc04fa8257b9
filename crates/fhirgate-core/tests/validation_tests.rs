mod common;

use common::*;
use fhirgate_core::{
    Dispatcher, EngineBinding, FhirOptions, FhirServices, FhirVersion, FormatBinding,
    IssueSeverity, ResourceFormat, ValidationRequest,
};
use fhirgate_engine::{EngineError, EngineResult, ParseMode, ParsedResource, Resource};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_valid_fixtures_are_valid() {
    let validation = services().validation;

    for fixture in [
        VALID_PATIENT,
        MINIMAL_PATIENT,
        VALID_OBSERVATION,
        VALID_CONDITION,
        VALID_BUNDLE,
    ] {
        let result = validation.validate_json(fixture, None).await;
        assert!(result.is_valid(), "{:?}", result.errors);
        assert_eq!(result.fhir_version, FhirVersion::R4);
    }
}

#[tokio::test]
async fn test_resource_type_reported() {
    let validation = services().validation;

    let result = validation.validate_json(VALID_OBSERVATION, None).await;
    assert_eq!(result.resource_type.as_deref(), Some("Observation"));
    assert!(result.warnings.is_empty());

    let result = validation.validate_json(VALID_CONDITION, None).await;
    assert_eq!(result.resource_type.as_deref(), Some("Condition"));
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code.as_deref(), Some("unknown-resource-type"));
}

#[tokio::test]
async fn test_malformed_input_yields_single_invalid_error() {
    let validation = services().validation;

    for content in [MALFORMED_JSON, PATIENT_MISSING_TYPE, PATIENT_WRONG_TYPE, ""] {
        let result = validation.validate_json(content, None).await;
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);

        let issue = &result.errors[0];
        assert_eq!(issue.severity, IssueSeverity::Error);
        assert_eq!(issue.code.as_deref(), Some("invalid"));
        assert!(!issue.message.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.information.is_empty());
        assert_eq!(result.resource_type, None);
    }
}

#[tokio::test]
async fn test_validate_xml() {
    let request = ValidationRequest::new(XML_PATIENT, ResourceFormat::Xml);
    let result = services().validation.validate(&request).await;
    assert!(result.is_valid(), "{:?}", result.errors);
    assert_eq!(result.resource_type.as_deref(), Some("Patient"));

    let request = ValidationRequest::new(VALID_PATIENT, ResourceFormat::Xml);
    let result = services().validation.validate(&request).await;
    assert!(!result.is_valid());
}

#[tokio::test]
async fn test_deeply_nested_xml_is_invalid() {
    let levels = 5_000;
    let content = format!(
        r#"<Patient xmlns="http://hl7.org/fhir">{}{}</Patient>"#,
        r#"<extension url="http://example.org/ext">"#.repeat(levels),
        "</extension>".repeat(levels)
    );
    let validation = services().validation;

    let result = tokio::spawn(async move {
        let request = ValidationRequest::new(content, ResourceFormat::Xml);
        validation.validate(&request).await
    })
    .await
    .unwrap();

    assert!(!result.is_valid());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].severity, IssueSeverity::Error);
    assert_eq!(result.errors[0].code.as_deref(), Some("invalid"));
    assert!(result.errors[0].message.contains("nesting"));
}

#[tokio::test]
async fn test_strict_rejects_broken_narrative() {
    let content = r#"{"resourceType":"Patient","text":{"status":"generated","div":"<div xmlns=\"http://www.w3.org/1999/xhtml\">Tom & Jerry <br></div>"}}"#;
    let request = ValidationRequest::json(content).with_strict(true);
    let result = services().validation.validate(&request).await;

    assert!(!result.is_valid());
    assert_eq!(result.errors[0].location.as_deref(), Some("Patient.text.div"));
}

#[tokio::test]
async fn test_version_override() {
    let validation = services().validation;

    let request = ValidationRequest::json(MINIMAL_PATIENT).with_version(FhirVersion::R5);
    assert_eq!(validation.validate(&request).await.fhir_version, FhirVersion::R5);
    assert_eq!(validation.current_fhir_version(), FhirVersion::R4);
}

#[tokio::test]
async fn test_strict_request_rejects_lenient_deviations() {
    let content = r#"{"resourceType":"Patient","id":"p1","active":"true"}"#;
    let validation = services().validation;

    let lenient = validation.validate_json(content, None).await;
    assert!(lenient.is_valid());
    assert_eq!(lenient.warnings[0].location.as_deref(), Some("Patient.active"));

    let strict = validation
        .validate(&ValidationRequest::json(content).with_strict(true))
        .await;
    assert!(!strict.is_valid());
    assert_eq!(strict.errors[0].location.as_deref(), Some("Patient.active"));
}

#[tokio::test]
async fn test_global_strictness_applies() {
    let services = services_with(FhirOptions {
        strict_validation: true,
        ..FhirOptions::default()
    });
    let result = services.validation.validate_json(VALID_CONDITION, None).await;
    assert!(!result.is_valid());
}

/// Binding whose parser always fails with an internal fault
struct BrokenBinding;

impl FormatBinding for BrokenBinding {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Json
    }

    fn version(&self) -> FhirVersion {
        FhirVersion::R4
    }

    fn parse(&self, _content: &str, _mode: ParseMode) -> EngineResult<ParsedResource> {
        Err(EngineError::internal("parser state corrupted"))
    }

    fn serialize(
        &self,
        _resource: &Resource,
        _target: ResourceFormat,
        _pretty: bool,
    ) -> EngineResult<String> {
        Err(EngineError::internal("serializer unavailable"))
    }
}

fn broken_services() -> FhirServices {
    let dispatcher = Dispatcher::builder()
        .with_engines()
        .unwrap()
        .binding(Arc::new(BrokenBinding))
        .build()
        .unwrap();
    FhirServices::with_dispatcher(FhirOptions::default(), dispatcher)
}

#[tokio::test]
async fn test_internal_fault_becomes_fatal_issue() {
    let result = broken_services()
        .validation
        .validate_json(VALID_PATIENT, None)
        .await;

    assert!(!result.is_valid());
    assert_eq!(result.errors.len(), 1);
    let issue = &result.errors[0];
    assert_eq!(issue.severity, IssueSeverity::Fatal);
    assert!(issue.message.contains("parser state corrupted"));
    assert!(issue.details.as_deref().is_some_and(|d| d.contains("Internal")));
}

#[tokio::test]
async fn test_internal_fault_in_parse_is_reported() {
    let services = broken_services();

    let result = services.parser.parse_json(VALID_PATIENT).await;
    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("parser state corrupted"));

    // XML is still served by the engine
    let request = ValidationRequest::new(XML_PATIENT, ResourceFormat::Xml);
    assert!(services.validation.validate(&request).await.is_valid());
}

#[tokio::test]
async fn test_engine_binding_can_be_registered_explicitly() {
    let engine = Arc::new(fhirgate_engine::FhirEngine::new(FhirVersion::R4).unwrap());
    let dispatcher = Dispatcher::builder()
        .with_engines()
        .unwrap()
        .binding(Arc::new(EngineBinding::new(engine, ResourceFormat::Json)))
        .build()
        .unwrap();
    let services = FhirServices::with_dispatcher(FhirOptions::default(), dispatcher);
    assert!(services.validation.validate_json(MINIMAL_PATIENT, None).await.is_valid());
}

#[tokio::test]
async fn test_cancelled_request_produces_no_result() {
    let validation = services().validation;
    let outcome = tokio::time::timeout(
        Duration::ZERO,
        validation.validate_json(VALID_PATIENT, None),
    )
    .await;
    assert!(outcome.is_err());
}
