//! Error types for the document engine

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// A malformed document or a value violating its target type.
///
/// The message is meant for humans and is reported back to callers verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FormatError {
    pub message: String,
    /// Element path inside the resource (e.g. `Patient.birthDate`), when known
    pub location: Option<String>,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(location: impl Into<String>, message: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            message: format!("{} (at {})", message.into(), location),
            location: Some(location),
        }
    }
}

/// Errors raised by the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Schema registry error: {message}")]
    Schema { message: String },

    #[error("Internal engine error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error is a recoverable, in-band input problem
    pub fn is_format(&self) -> bool {
        matches!(self, EngineError::Format(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_with_location() {
        let err = FormatError::at("Patient.birthDate", "Invalid date 'not-a-date'");
        assert_eq!(err.location.as_deref(), Some("Patient.birthDate"));
        assert_eq!(
            err.to_string(),
            "Invalid date 'not-a-date' (at Patient.birthDate)"
        );
    }

    #[test]
    fn test_engine_error_is_transparent_for_format() {
        let err: EngineError = FormatError::new("Unexpected end of input").into();
        assert!(err.is_format());
        assert_eq!(err.to_string(), "Unexpected end of input");
    }
}
