use fhirgate_engine::{EngineError, FhirVersion, FormatError, ResourceFormat};
use thiserror::Error;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Startup-time failures: building the dispatcher or loading options
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No {format} binding is available for FHIR {version}: {reason}")]
    UnsupportedCombination {
        format: ResourceFormat,
        version: FhirVersion,
        reason: String,
    },

    #[error("The FHIR {version} engine could not be built: {reason}")]
    EngineUnavailable { version: FhirVersion, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CoreError {
    pub fn unsupported(format: ResourceFormat, version: FhirVersion, reason: impl Into<String>) -> Self {
        Self::UnsupportedCombination {
            format,
            version,
            reason: reason.into(),
        }
    }

    pub fn engine_unavailable(version: FhirVersion, err: &EngineError) -> Self {
        Self::EngineUnavailable {
            version,
            reason: err.to_string(),
        }
    }
}

/// The one failure a request-path operation lets escape: format conversion
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The input did not parse; carries the parser message unchanged
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Unsupported format '{0}', expected json or xml")]
    UnsupportedFormat(String),

    #[error("Conversion failed: {message}")]
    Internal { message: String },
}

impl From<EngineError> for ConversionError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Format(format) => ConversionError::Format(format),
            other => ConversionError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_keeps_parser_message() {
        let err: ConversionError = EngineError::from(FormatError::new("Invalid JSON: EOF")).into();
        assert_eq!(err.to_string(), "Invalid JSON: EOF");

        let err: ConversionError = EngineError::internal("boom").into();
        assert!(matches!(err, ConversionError::Internal { .. }));
    }

    #[test]
    fn test_engine_failure_names_only_the_version() {
        let err = CoreError::engine_unavailable(
            FhirVersion::R5,
            &EngineError::schema("type 'Coding' is not defined"),
        );
        let message = err.to_string();
        assert!(message.starts_with("The FHIR R5 engine could not be built"));
        assert!(!message.contains("json"));
    }
}
