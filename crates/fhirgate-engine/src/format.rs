//! Resource encodings

use serde::{Deserialize, Serialize};
use std::fmt;

pub const FHIR_JSON_MIME: &str = "application/fhir+json";
pub const FHIR_XML_MIME: &str = "application/fhir+xml";

/// Serialization syntax of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFormat {
    #[default]
    Json,
    Xml,
}

impl ResourceFormat {
    pub const ALL: [ResourceFormat; 2] = [ResourceFormat::Json, ResourceFormat::Xml];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceFormat::Json => "json",
            ResourceFormat::Xml => "xml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ResourceFormat::Json => FHIR_JSON_MIME,
            ResourceFormat::Xml => FHIR_XML_MIME,
        }
    }

    /// Strict lookup by short name or MIME type
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "json" | FHIR_JSON_MIME | "application/json" => Some(ResourceFormat::Json),
            "xml" | FHIR_XML_MIME | "application/xml" | "text/xml" => Some(ResourceFormat::Xml),
            _ => None,
        }
    }

    /// Anything mentioning "json" is JSON, everything else is treated as XML
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.to_lowercase().contains("json") {
            ResourceFormat::Json
        } else {
            ResourceFormat::Xml
        }
    }
}

impl fmt::Display for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
