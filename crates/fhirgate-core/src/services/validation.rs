//! Structural validation orchestration

use chrono::Utc;
use fhirgate_engine::{EngineError, FhirVersion, ParseMode, ParsedResource};
use std::time::Instant;

use crate::config::{resolve, ConfigOverride, EffectiveConfig};
use crate::dispatcher::Dispatcher;
use crate::issues::{partition, ValidationIssue};
use crate::models::{ValidationRequest, ValidationResult};

/// Validates resources against the base schema of a FHIR version
#[derive(Debug, Clone)]
pub struct ValidationService {
    defaults: EffectiveConfig,
    dispatcher: Dispatcher,
}

impl ValidationService {
    pub fn new(defaults: EffectiveConfig, dispatcher: Dispatcher) -> Self {
        Self {
            defaults,
            dispatcher,
        }
    }

    pub fn current_fhir_version(&self) -> FhirVersion {
        self.defaults.version
    }

    /// Validate a resource. Every outcome, including malformed input and
    /// internal faults, is reported through the returned issues.
    pub async fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        let started = Instant::now();

        // A request can only tighten the configured strictness
        let config = resolve(
            self.defaults,
            ConfigOverride {
                version: request.version_override,
                strict: request.strict_override.map(|strict| strict || self.defaults.strict),
            },
        );
        tracing::info!(
            version = %config.version,
            strict = config.strict,
            format = %request.format(),
            "Validating resource"
        );

        tokio::task::yield_now().await;

        let binding = self.dispatcher.binding(request.format(), config.version);
        let (resource_type, issues) =
            match binding.parse(&request.resource_content, ParseMode::from_strict(config.strict)) {
                Ok(parsed) => {
                    let resource_type = parsed.resource.resource_type().to_string();
                    (Some(resource_type), parsed_issues(parsed, request))
                }
                Err(EngineError::Format(err)) => {
                    tracing::warn!(error = %err, "Resource failed to parse");
                    let mut issue = ValidationIssue::error(err.message.clone()).with_code("invalid");
                    issue.location = err.location;
                    (None, vec![issue])
                }
                Err(err) => {
                    tracing::error!(error = %err, "Validation failed with an internal error");
                    let issue = ValidationIssue::fatal(format!("Validation failed: {}", err))
                        .with_code("exception")
                        .with_details(format!("{:?}", err));
                    (None, vec![issue])
                }
            };

        let buckets = partition(issues);
        let duration_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            valid = buckets.errors.is_empty(),
            errors = buckets.errors.len(),
            warnings = buckets.warnings.len(),
            duration_ms,
            "Validation completed"
        );

        ValidationResult {
            errors: buckets.errors,
            warnings: buckets.warnings,
            information: buckets.information,
            resource_type,
            fhir_version: config.version,
            timestamp: Utc::now(),
            duration_ms,
        }
    }

    /// Validate JSON content with the default version
    pub async fn validate_json(&self, json: &str, profile_url: Option<&str>) -> ValidationResult {
        let mut request = ValidationRequest::json(json);
        request.profile_url = profile_url.map(str::to_string);
        self.validate(&request).await
    }
}

/// Warnings for the deviations the lenient parser accepted, then the
/// profile notice when a profile was requested
fn parsed_issues(parsed: ParsedResource, request: &ValidationRequest) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = parsed
        .notices
        .into_iter()
        .map(|notice| {
            ValidationIssue::warning(notice.message)
                .with_location(notice.path)
                .with_code(notice.kind.as_str())
        })
        .collect();

    if let Some(profile) = request.profile_url.as_deref() {
        tracing::debug!(profile, "Profile validation requested but not supported");
        issues.push(
            ValidationIssue::warning(format!(
                "Profile validation is not supported; '{}' was not evaluated",
                profile
            ))
            .with_code("not-supported"),
        );
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::IssueSeverity;
    use pretty_assertions::assert_eq;

    fn service(strict: bool) -> ValidationService {
        ValidationService::new(
            EffectiveConfig {
                version: FhirVersion::R4,
                strict,
            },
            Dispatcher::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_wrong_primitive_reports_location() {
        let result = service(false)
            .validate_json(
                r#"{"resourceType":"Patient","id":"p1","birthDate":"not-a-date"}"#,
                None,
            )
            .await;

        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code.as_deref(), Some("invalid"));
        assert_eq!(result.errors[0].location.as_deref(), Some("Patient.birthDate"));
    }

    #[tokio::test]
    async fn test_request_cannot_relax_global_strictness() {
        let content = r#"{"resourceType":"Patient","nickname":"Jo"}"#;
        let request = ValidationRequest::json(content).with_strict(false);

        assert!(!service(true).validate(&request).await.is_valid());

        let relaxed = service(false).validate(&request).await;
        assert!(relaxed.is_valid());
        assert_eq!(relaxed.warnings.len(), 1);
        assert_eq!(relaxed.warnings[0].code.as_deref(), Some("unknown-element"));
    }

    #[tokio::test]
    async fn test_profile_is_flagged_unsupported() {
        let result = service(false)
            .validate_json(
                r#"{"resourceType":"Patient","id":"p1"}"#,
                Some("http://example.org/StructureDefinition/my-patient"),
            )
            .await;

        assert!(result.is_valid());
        let warning = result.warnings.last().unwrap();
        assert_eq!(warning.severity, IssueSeverity::Warning);
        assert_eq!(warning.code.as_deref(), Some("not-supported"));
        assert!(warning.message.contains("my-patient"));
    }
}
