//! FHIR tools exposed through `tools/list` and `tools/call`

use fhirgate_core::{
    FhirServices, FhirVersion, Metadata, ParseRequest, ValidationIssue, ValidationRequest,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{McpError, Result};

/// Name, description and JSON schema of every tool
pub fn definitions() -> Vec<Value> {
    let resource_json = json!({
        "type": "string",
        "description": "The FHIR resource content as a JSON string"
    });
    let fhir_version = json!({
        "type": "string",
        "enum": ["R4", "R5"],
        "description": "FHIR version override (uses the configured default when omitted)"
    });

    vec![
        json!({
            "name": "parse_fhir_resource",
            "description": "Parses a FHIR resource and extracts metadata including resource type, ID, and key properties. Supports both FHIR R4 and R5.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "resourceJson": resource_json,
                    "fhirVersion": fhir_version,
                },
                "required": ["resourceJson"]
            }
        }),
        json!({
            "name": "convert_fhir_format",
            "description": "Converts a FHIR resource between JSON and XML formats.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "resourceContent": { "type": "string", "description": "The FHIR resource content" },
                    "fromFormat": { "type": "string", "description": "Source format: 'json' or 'xml'" },
                    "toFormat": { "type": "string", "description": "Target format: 'json' or 'xml'" }
                },
                "required": ["resourceContent", "fromFormat", "toFormat"]
            }
        }),
        json!({
            "name": "get_fhir_resource_info",
            "description": "Identifies a FHIR resource and returns a one-line summary of its type, ID, name and status.",
            "inputSchema": {
                "type": "object",
                "properties": { "resourceJson": resource_json },
                "required": ["resourceJson"]
            }
        }),
        json!({
            "name": "validate_fhir_resource",
            "description": "Validates a FHIR resource and returns any validation errors, warnings, or informational messages. Supports both FHIR R4 and R5.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "resourceJson": resource_json,
                    "profileUrl": { "type": "string", "description": "Profile URL to validate against (not evaluated)" },
                    "fhirVersion": fhir_version,
                },
                "required": ["resourceJson"]
            }
        }),
        json!({
            "name": "quick_validate_fhir",
            "description": "Performs a quick validation check on a FHIR resource and returns a pass/fail result with a summary.",
            "inputSchema": {
                "type": "object",
                "properties": { "resourceJson": resource_json },
                "required": ["resourceJson"]
            }
        }),
        json!({
            "name": "get_current_fhir_version",
            "description": "Gets the FHIR version configured for the server.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceArgs {
    resource_json: String,
    #[serde(default)]
    fhir_version: Option<String>,
    #[serde(default)]
    profile_url: Option<String>,
}

impl ResourceArgs {
    fn version(&self) -> Result<Option<FhirVersion>> {
        self.fhir_version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<FhirVersion>().map_err(McpError::InvalidParams))
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertArgs {
    resource_content: String,
    from_format: String,
    to_format: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseToolResult {
    success: bool,
    resource_type: Option<String>,
    resource_id: Option<String>,
    fhir_version: FhirVersion,
    error_message: Option<String>,
    metadata: Metadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionToolResult {
    success: bool,
    converted_content: Option<String>,
    from_format: String,
    to_format: String,
    error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceInfoResult {
    success: bool,
    resource_type: String,
    resource_id: Option<String>,
    fhir_version: Option<FhirVersion>,
    summary: String,
    error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueInfo {
    message: String,
    location: Option<String>,
    code: Option<String>,
}

impl From<&ValidationIssue> for IssueInfo {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            message: issue.message.clone(),
            location: issue.location.clone(),
            code: issue.code.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationToolResult {
    is_valid: bool,
    resource_type: Option<String>,
    fhir_version: FhirVersion,
    error_count: usize,
    warning_count: usize,
    errors: Vec<IssueInfo>,
    warnings: Vec<IssueInfo>,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuickValidationResult {
    is_valid: bool,
    resource_type: String,
    summary: String,
    fhir_version: FhirVersion,
}

/// Tool implementations over the shared services
#[derive(Debug, Clone)]
pub struct FhirTools {
    services: FhirServices,
}

impl FhirTools {
    pub fn new(services: FhirServices) -> Self {
        Self { services }
    }

    /// Run a tool and return its structured result
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value> {
        tracing::info!(tool = name, "Tool called");
        match name {
            "parse_fhir_resource" => self.parse(args(arguments)?).await,
            "convert_fhir_format" => self.convert(args(arguments)?).await,
            "get_fhir_resource_info" => self.resource_info(args(arguments)?).await,
            "validate_fhir_resource" => self.validate(args(arguments)?).await,
            "quick_validate_fhir" => self.quick_validate(args(arguments)?).await,
            "get_current_fhir_version" => Ok(Value::String(
                self.services.validation.current_fhir_version().to_string(),
            )),
            other => Err(McpError::InvalidParams(format!("Unknown tool '{}'", other))),
        }
    }

    async fn parse(&self, args: ResourceArgs) -> Result<Value> {
        let mut request = ParseRequest::json(args.resource_json.as_str());
        request.version_override = args.version()?;

        let result = self.services.parser.parse(&request).await;
        Ok(serde_json::to_value(ParseToolResult {
            success: result.success,
            resource_type: result.resource_type,
            resource_id: result.resource_id,
            fhir_version: result.fhir_version,
            error_message: result.error_message,
            metadata: result.metadata,
        })?)
    }

    async fn convert(&self, args: ConvertArgs) -> Result<Value> {
        let outcome = self
            .services
            .parser
            .convert_format(&args.resource_content, &args.from_format, &args.to_format)
            .await;

        let (converted_content, error_message) = match outcome {
            Ok(converted) => (Some(converted), None),
            Err(err) => {
                tracing::warn!(error = %err, "Format conversion failed");
                (None, Some(err.to_string()))
            }
        };
        Ok(serde_json::to_value(ConversionToolResult {
            success: converted_content.is_some(),
            converted_content,
            from_format: args.from_format,
            to_format: args.to_format,
            error_message,
        })?)
    }

    async fn resource_info(&self, args: ResourceArgs) -> Result<Value> {
        let result = self.services.parser.parse_json(&args.resource_json).await;

        let info = if result.success {
            ResourceInfoResult {
                success: true,
                resource_type: result
                    .resource_type
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                resource_id: result.resource_id.clone(),
                fhir_version: Some(result.fhir_version),
                summary: result.summary(),
                error_message: None,
            }
        } else {
            ResourceInfoResult {
                success: false,
                resource_type: String::new(),
                resource_id: None,
                fhir_version: None,
                summary: String::new(),
                error_message: result.error_message,
            }
        };
        Ok(serde_json::to_value(info)?)
    }

    async fn validate(&self, args: ResourceArgs) -> Result<Value> {
        let mut request = ValidationRequest::json(args.resource_json.as_str());
        request.version_override = args.version()?;
        request.profile_url = args.profile_url;

        let result = self.services.validation.validate(&request).await;
        Ok(serde_json::to_value(ValidationToolResult {
            is_valid: result.is_valid(),
            resource_type: result.resource_type.clone(),
            fhir_version: result.fhir_version,
            error_count: result.errors.len(),
            warning_count: result.warnings.len(),
            errors: result.errors.iter().map(IssueInfo::from).collect(),
            warnings: result.warnings.iter().map(IssueInfo::from).collect(),
            duration_ms: result.duration_ms,
        })?)
    }

    async fn quick_validate(&self, args: ResourceArgs) -> Result<Value> {
        let result = self
            .services
            .validation
            .validate_json(&args.resource_json, None)
            .await;

        let resource_type = result
            .resource_type
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let summary = if result.is_valid() {
            format!("✓ Valid {} resource", resource_type)
        } else {
            format!(
                "✗ Invalid: {} error(s), {} warning(s)",
                result.errors.len(),
                result.warnings.len()
            )
        };
        Ok(serde_json::to_value(QuickValidationResult {
            is_valid: result.is_valid(),
            resource_type,
            summary,
            fhir_version: result.fhir_version,
        })?)
    }
}

fn args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
}
