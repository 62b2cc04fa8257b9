//! Request and result objects exchanged with the transports

use chrono::{DateTime, Utc};
use fhirgate_engine::{FhirVersion, ResourceFormat, FHIR_JSON_MIME};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::issues::ValidationIssue;
use crate::metadata::Metadata;

fn default_content_type() -> String {
    FHIR_JSON_MIME.to_string()
}

/// Request to parse a resource and extract its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub resource_content: String,

    /// `application/fhir+json` or `application/fhir+xml`
    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default, rename = "fhirVersionOverride")]
    pub version_override: Option<FhirVersion>,
}

impl ParseRequest {
    pub fn new(content: impl Into<String>, format: ResourceFormat) -> Self {
        Self {
            resource_content: content.into(),
            content_type: format.mime_type().to_string(),
            version_override: None,
        }
    }

    pub fn json(content: impl Into<String>) -> Self {
        Self::new(content, ResourceFormat::Json)
    }

    pub fn with_version(mut self, version: FhirVersion) -> Self {
        self.version_override = Some(version);
        self
    }

    pub fn format(&self) -> ResourceFormat {
        ResourceFormat::from_content_type(&self.content_type)
    }
}

/// Outcome of a parse request.
///
/// A successful result always carries `resource_type` and
/// `serialized_resource`; a failed one always carries `error_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub success: bool,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub fhir_version: FhirVersion,
    pub error_message: Option<String>,
    pub serialized_resource: Option<String>,
    pub metadata: Metadata,
}

impl ParseResult {
    pub(crate) fn failure(version: FhirVersion, message: impl Into<String>) -> Self {
        Self {
            success: false,
            resource_type: None,
            resource_id: None,
            fhir_version: version,
            error_message: Some(message.into()),
            serialized_resource: None,
            metadata: Metadata::new(),
        }
    }

    /// One-line description: `Type: Patient | ID: p1 | Name: John Smith`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(resource_type) = &self.resource_type {
            parts.push(format!("Type: {}", resource_type));
        }
        if let Some(id) = self.resource_id.as_deref().filter(|id| !id.is_empty()) {
            parts.push(format!("ID: {}", id));
        }
        for (key, label) in [("name", "Name"), ("status", "Status")] {
            if let Some(Some(value)) = self.metadata.get(key) {
                if !value.is_empty() {
                    parts.push(format!("{}: {}", label, value));
                }
            }
        }
        parts.join(" | ")
    }
}

/// Request to validate a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub resource_content: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Accepted, but profiles are never evaluated
    #[serde(default)]
    pub profile_url: Option<String>,

    #[serde(default, rename = "fhirVersionOverride")]
    pub version_override: Option<FhirVersion>,

    #[serde(default, rename = "strictValidation")]
    pub strict_override: Option<bool>,
}

impl ValidationRequest {
    pub fn new(content: impl Into<String>, format: ResourceFormat) -> Self {
        Self {
            resource_content: content.into(),
            content_type: format.mime_type().to_string(),
            profile_url: None,
            version_override: None,
            strict_override: None,
        }
    }

    pub fn json(content: impl Into<String>) -> Self {
        Self::new(content, ResourceFormat::Json)
    }

    pub fn with_version(mut self, version: FhirVersion) -> Self {
        self.version_override = Some(version);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict_override = Some(strict);
        self
    }

    pub fn with_profile(mut self, profile_url: impl Into<String>) -> Self {
        self.profile_url = Some(profile_url.into());
        self
    }

    pub fn format(&self) -> ResourceFormat {
        ResourceFormat::from_content_type(&self.content_type)
    }
}

/// Outcome of a validation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub information: Vec<ValidationIssue>,
    pub resource_type: Option<String>,
    pub fhir_version: FhirVersion,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ValidationResult {
    /// Valid exactly when no Error or Fatal issue was found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All issues, most severe bucket first
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.information.iter())
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 8)?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.serialize_field("information", &self.information)?;
        state.serialize_field("resourceType", &self.resource_type)?;
        state.serialize_field("fhirVersion", &self.fhir_version)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("durationMs", &self.duration_ms)?;
        state.end()
    }
}
