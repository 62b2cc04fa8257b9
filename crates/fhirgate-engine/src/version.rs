//! Supported FHIR versions

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// FHIR release a document is parsed and serialized against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FhirVersion {
    #[default]
    R4,
    R5,
}

impl FhirVersion {
    pub const ALL: [FhirVersion; 2] = [FhirVersion::R4, FhirVersion::R5];

    pub fn as_str(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "R4",
            FhirVersion::R5 => "R5",
        }
    }

    /// Release number of the core FHIR package
    pub fn fhir_release(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "4.0.1",
            FhirVersion::R5 => "5.0.0",
        }
    }

    /// Case-insensitive lookup; also accepts the release numbers
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "r4" | "4.0" | "4.0.1" => Some(FhirVersion::R4),
            "r5" | "5.0" | "5.0.0" => Some(FhirVersion::R5),
            _ => None,
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FhirVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported FHIR version '{}', expected R4 or R5", s))
    }
}

impl Serialize for FhirVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FhirVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
