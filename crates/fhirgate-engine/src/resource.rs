//! Parsed resource document model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// How tolerant the codecs are of deviations from the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Drop unknown elements and accept coercible mismatches, recording a notice
    #[default]
    Lenient,
    /// Every deviation is a format error
    Strict,
}

impl ParseMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, ParseMode::Strict)
    }
}

/// Category of a deviation tolerated in lenient mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    UnknownElement,
    UnknownResourceType,
    Coerced,
    Cardinality,
    EmptyValue,
    UnknownCode,
    PrimitiveExtension,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::UnknownElement => "unknown-element",
            NoticeKind::UnknownResourceType => "unknown-resource-type",
            NoticeKind::Coerced => "coerced",
            NoticeKind::Cardinality => "cardinality",
            NoticeKind::EmptyValue => "empty-value",
            NoticeKind::UnknownCode => "unknown-code",
            NoticeKind::PrimitiveExtension => "primitive-extension",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deviation the lenient parser accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseNotice {
    pub path: String,
    pub kind: NoticeKind,
    pub message: String,
}

/// A FHIR resource as an ordered JSON tree in canonical element order.
///
/// The tree always carries `resourceType` as its first member.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    value: Value,
}

impl Resource {
    pub(crate) fn from_parts(resource_type: String, body: Map<String, Value>) -> Self {
        let mut map = Map::with_capacity(body.len() + 1);
        map.insert(
            "resourceType".to_string(),
            Value::String(resource_type.clone()),
        );
        map.extend(body);
        Self {
            resource_type,
            value: Value::Object(map),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id(&self) -> Option<&str> {
        self.str_at(&["id"])
    }

    /// `meta.versionId`
    pub fn version_id(&self) -> Option<&str> {
        self.str_at(&["meta", "versionId"])
    }

    /// `meta.lastUpdated`
    pub fn last_updated(&self) -> Option<&str> {
        self.str_at(&["meta", "lastUpdated"])
    }

    /// Top-level element by name
    pub fn get(&self, element: &str) -> Option<&Value> {
        self.value.get(element)
    }

    pub fn as_json(&self) -> &Value {
        &self.value
    }

    pub fn into_json(self) -> Value {
        self.value
    }

    pub fn as_patient(&self) -> Option<PatientView<'_>> {
        (self.resource_type == "Patient").then_some(PatientView { value: &self.value })
    }

    pub fn as_observation(&self) -> Option<ObservationView<'_>> {
        (self.resource_type == "Observation").then_some(ObservationView { value: &self.value })
    }

    fn str_at(&self, path: &[&str]) -> Option<&str> {
        let mut current = &self.value;
        for segment in path {
            current = current.get(segment)?;
        }
        current.as_str()
    }
}

/// Typed read access to a Patient
#[derive(Debug, Clone, Copy)]
pub struct PatientView<'a> {
    value: &'a Value,
}

impl<'a> PatientView<'a> {
    /// Display form of the first listed name.
    ///
    /// Uses `text` when present, otherwise prefixes, given names, family name
    /// and suffixes joined by spaces.
    pub fn name(&self) -> Option<String> {
        let name = self.value.get("name")?.as_array()?.first()?;
        if let Some(text) = name.get("text").and_then(Value::as_str) {
            return Some(text.to_string());
        }

        let mut parts: Vec<&str> = Vec::new();
        parts.extend(strings(name.get("prefix")));
        parts.extend(strings(name.get("given")));
        if let Some(family) = name.get("family").and_then(Value::as_str) {
            parts.push(family);
        }
        parts.extend(strings(name.get("suffix")));

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    pub fn birth_date(&self) -> Option<&'a str> {
        self.value.get("birthDate")?.as_str()
    }

    pub fn gender(&self) -> Option<&'a str> {
        self.value.get("gender")?.as_str()
    }
}

/// Typed read access to an Observation
#[derive(Debug, Clone, Copy)]
pub struct ObservationView<'a> {
    value: &'a Value,
}

impl<'a> ObservationView<'a> {
    pub fn status(&self) -> Option<&'a str> {
        self.value.get("status")?.as_str()
    }

    /// Display of the first coding of `code`
    pub fn code_display(&self) -> Option<&'a str> {
        self.value
            .get("code")?
            .get("coding")?
            .as_array()?
            .first()?
            .get("display")?
            .as_str()
    }
}

fn strings(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// A resource together with the deviations tolerated while reading it
#[derive(Debug, Clone)]
pub struct ParsedResource {
    pub resource: Resource,
    pub notices: Vec<ParseNotice>,
}
