//! Validation issues and their severity buckets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Information,
    Warning,
    Error,
    Fatal,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Information => "information",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
            IssueSeverity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found while validating a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    /// Element path into the resource
    pub location: Option<String>,
    pub code: Option<String>,
    /// Diagnostics
    pub details: Option<String>,
}

impl ValidationIssue {
    pub fn new(severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
            code: None,
            details: None,
        }
    }

    pub fn information(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Information, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Fatal, message)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity >= IssueSeverity::Error
    }
}

/// Issues split by severity, each bucket in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedIssues {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub information: Vec<ValidationIssue>,
}

/// Error and Fatal go to `errors`; nothing is added or dropped
pub fn partition(issues: impl IntoIterator<Item = ValidationIssue>) -> PartitionedIssues {
    let mut out = PartitionedIssues::default();
    for issue in issues {
        if issue.is_error() {
            out.errors.push(issue);
        } else if issue.severity == IssueSeverity::Warning {
            out.warnings.push(issue);
        } else {
            out.information.push(issue);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity_ordering() {
        assert!(IssueSeverity::Information < IssueSeverity::Warning);
        assert!(IssueSeverity::Warning < IssueSeverity::Error);
        assert!(IssueSeverity::Error < IssueSeverity::Fatal);
    }

    #[test]
    fn test_partition_keeps_order() {
        let issues = vec![
            ValidationIssue::warning("w1"),
            ValidationIssue::fatal("f1"),
            ValidationIssue::information("i1"),
            ValidationIssue::error("e1"),
            ValidationIssue::warning("w2"),
        ];
        let buckets = partition(issues);

        let messages = |v: &[ValidationIssue]| v.iter().map(|i| i.message.clone()).collect::<Vec<_>>();
        assert_eq!(messages(&buckets.errors), vec!["f1", "e1"]);
        assert!(buckets.errors.iter().all(ValidationIssue::is_error));
        assert!(!buckets.warnings.iter().any(ValidationIssue::is_error));
        assert_eq!(messages(&buckets.warnings), vec!["w1", "w2"]);
        assert_eq!(messages(&buckets.information), vec!["i1"]);
    }

    #[test]
    fn test_issue_serializes_camel_case() {
        let issue = ValidationIssue::error("Invalid JSON").with_code("invalid");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "severity": "error",
                "message": "Invalid JSON",
                "location": null,
                "code": "invalid",
                "details": null
            })
        );
    }
}
