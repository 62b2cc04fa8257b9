//! Parse and format-conversion orchestration

use fhirgate_engine::{EngineError, FhirVersion, ParseMode, ResourceFormat};

use crate::config::{resolve, ConfigOverride, EffectiveConfig};
use crate::dispatcher::Dispatcher;
use crate::error::ConversionError;
use crate::metadata;
use crate::models::{ParseRequest, ParseResult};

/// Parses resources, extracts their metadata and converts between formats
#[derive(Debug, Clone)]
pub struct ParserService {
    defaults: EffectiveConfig,
    dispatcher: Dispatcher,
}

impl ParserService {
    pub fn new(defaults: EffectiveConfig, dispatcher: Dispatcher) -> Self {
        Self {
            defaults,
            dispatcher,
        }
    }

    /// Default version, independent of any request in flight
    pub fn current_fhir_version(&self) -> FhirVersion {
        self.defaults.version
    }

    /// Parse a resource; failures are reported in the result, never returned
    pub async fn parse(&self, request: &ParseRequest) -> ParseResult {
        let config = resolve(
            self.defaults,
            ConfigOverride {
                version: request.version_override,
                strict: None,
            },
        );
        tracing::info!(version = %config.version, "Parsing resource");

        tokio::task::yield_now().await;

        match self.parse_resource(request, config) {
            Ok(result) => result,
            Err(EngineError::Format(err)) => {
                tracing::warn!(error = %err, "Resource failed to parse");
                ParseResult::failure(config.version, err.message)
            }
            Err(err) => {
                tracing::error!(error = %err, "Parsing failed with an internal error");
                ParseResult::failure(config.version, err.to_string())
            }
        }
    }

    /// Parse JSON content with the default version
    pub async fn parse_json(&self, json: &str) -> ParseResult {
        self.parse(&ParseRequest::json(json)).await
    }

    fn parse_resource(
        &self,
        request: &ParseRequest,
        config: EffectiveConfig,
    ) -> Result<ParseResult, EngineError> {
        let binding = self.dispatcher.binding(request.format(), config.version);
        let parsed = binding.parse(&request.resource_content, ParseMode::from_strict(config.strict))?;
        for notice in &parsed.notices {
            tracing::debug!(path = %notice.path, kind = %notice.kind, "{}", notice.message);
        }

        let resource = parsed.resource;
        let serialized = binding.serialize(&resource, ResourceFormat::Json, true)?;
        let metadata = metadata::extract(&resource);

        tracing::info!(
            version = %config.version,
            resource_type = resource.resource_type(),
            resource_id = resource.id(),
            "Parsed resource"
        );

        Ok(ParseResult {
            success: true,
            resource_type: Some(resource.resource_type().to_string()),
            resource_id: resource.id().map(str::to_string),
            fhir_version: config.version,
            error_message: None,
            serialized_resource: Some(serialized),
            metadata,
        })
    }

    /// Convert between `json` and `xml`.
    ///
    /// Equal format names (ignoring case) return the content untouched
    /// without parsing it. Otherwise the content is parsed leniently with
    /// the default version and written pretty-printed.
    pub async fn convert_format(
        &self,
        content: &str,
        from_format: &str,
        to_format: &str,
    ) -> Result<String, ConversionError> {
        tokio::task::yield_now().await;

        if from_format.eq_ignore_ascii_case(to_format) {
            return Ok(content.to_string());
        }

        let from = ResourceFormat::parse(from_format)
            .ok_or_else(|| ConversionError::UnsupportedFormat(from_format.to_string()))?;
        let to = ResourceFormat::parse(to_format)
            .ok_or_else(|| ConversionError::UnsupportedFormat(to_format.to_string()))?;

        let binding = self.dispatcher.binding(from, self.defaults.version);
        let parsed = binding.parse(content, ParseMode::Lenient)?;
        let converted = binding.serialize(&parsed.resource, to, true)?;

        tracing::debug!(
            from = %from,
            to = %to,
            resource_type = parsed.resource.resource_type(),
            "Converted resource"
        );
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(version: FhirVersion, strict: bool) -> ParserService {
        ParserService::new(
            EffectiveConfig { version, strict },
            Dispatcher::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_strict_default_rejects_unknown_element() {
        let content = r#"{"resourceType":"Patient","id":"p1","nickname":"Jo"}"#;

        let lenient = service(FhirVersion::R4, false).parse_json(content).await;
        assert!(lenient.success);

        let strict = service(FhirVersion::R4, true).parse_json(content).await;
        assert!(!strict.success);
        assert!(strict.error_message.unwrap().contains("nickname"));
    }

    #[tokio::test]
    async fn test_unknown_format_name() {
        let err = service(FhirVersion::R4, false)
            .convert_format("{}", "json", "yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedFormat(name) if name == "yaml"));
    }

    #[tokio::test]
    async fn test_conversion_ignores_strict_default() {
        let converted = service(FhirVersion::R4, true)
            .convert_format(
                r#"{"resourceType":"Patient","id":"p1","nickname":"Jo"}"#,
                "JSON",
                "xml",
            )
            .await
            .unwrap();
        assert!(converted.contains(r#"<id value="p1"/>"#));
        assert!(!converted.contains("nickname"));
    }
}
