//! Per-version schema registry
//!
//! The registry carries just enough structure to read and write the
//! supported resources in both encodings: element names, cardinality,
//! primitive types and required code bindings. It is not a conformance
//! engine; profiles, invariants and terminology are out of its reach.

mod datatypes;
mod resources;

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::FhirVersion;

/// FHIR primitive datatypes known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    PositiveInt,
    UnsignedInt,
    Decimal,
    String,
    Markdown,
    Code,
    Id,
    Uri,
    Url,
    Canonical,
    Base64Binary,
    Date,
    DateTime,
    Instant,
    Time,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::PositiveInt => "positiveInt",
            PrimitiveType::UnsignedInt => "unsignedInt",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::String => "string",
            PrimitiveType::Markdown => "markdown",
            PrimitiveType::Code => "code",
            PrimitiveType::Id => "id",
            PrimitiveType::Uri => "uri",
            PrimitiveType::Url => "url",
            PrimitiveType::Canonical => "canonical",
            PrimitiveType::Base64Binary => "base64Binary",
            PrimitiveType::Date => "date",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Instant => "instant",
            PrimitiveType::Time => "time",
        }
    }

    /// Whether the JSON representation is a string
    pub fn is_string_like(&self) -> bool {
        !matches!(
            self,
            PrimitiveType::Boolean
                | PrimitiveType::Integer
                | PrimitiveType::PositiveInt
                | PrimitiveType::UnsignedInt
                | PrimitiveType::Decimal
        )
    }
}

/// What an element holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(PrimitiveType),
    /// A datatype or backbone element, by registry name
    Complex(&'static str),
    /// An inline resource (contained resources, bundle entries)
    Resource,
    /// Narrative XHTML, kept as raw markup
    Xhtml,
}

/// One element of a type
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub repeating: bool,
    /// Required binding: the only codes accepted in strict mode
    pub codes: Option<&'static [&'static str]>,
    /// Written as an XML attribute instead of a child element
    pub xml_attribute: bool,
}

impl FieldDef {
    pub fn primitive(name: &'static str, primitive: PrimitiveType) -> Self {
        Self {
            name,
            kind: FieldKind::Primitive(primitive),
            repeating: false,
            codes: None,
            xml_attribute: false,
        }
    }

    pub fn complex(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Complex(type_name),
            repeating: false,
            codes: None,
            xml_attribute: false,
        }
    }

    pub fn resource(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Resource,
            repeating: false,
            codes: None,
            xml_attribute: false,
        }
    }

    pub fn xhtml(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Xhtml,
            repeating: false,
            codes: None,
            xml_attribute: false,
        }
    }

    pub fn repeating(mut self) -> Self {
        self.repeating = true;
        self
    }

    pub fn with_codes(mut self, codes: &'static [&'static str]) -> Self {
        self.codes = Some(codes);
        self
    }

    pub fn as_attribute(mut self) -> Self {
        self.xml_attribute = true;
        self
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self.kind {
            FieldKind::Primitive(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Resource,
    Datatype,
    Backbone,
}

/// Structure of a resource, datatype or backbone element
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: &'static str,
    pub kind: TypeKind,
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    /// Resource with the DomainResource base elements prepended
    pub fn resource(name: &'static str, fields: Vec<FieldDef>) -> Self {
        let mut all = resource_base_fields();
        all.extend(fields);
        Self {
            name,
            kind: TypeKind::Resource,
            fields: all,
        }
    }

    /// Datatype with `id` and `extension` prepended
    pub fn datatype(name: &'static str, fields: Vec<FieldDef>) -> Self {
        let mut all = vec![
            FieldDef::primitive("id", PrimitiveType::String).as_attribute(),
            FieldDef::complex("extension", "Extension").repeating(),
        ];
        all.extend(fields);
        Self {
            name,
            kind: TypeKind::Datatype,
            fields: all,
        }
    }

    /// Backbone element, which may also carry modifier extensions
    pub fn backbone(name: &'static str, fields: Vec<FieldDef>) -> Self {
        let mut all = vec![
            FieldDef::primitive("id", PrimitiveType::String).as_attribute(),
            FieldDef::complex("extension", "Extension").repeating(),
            FieldDef::complex("modifierExtension", "Extension").repeating(),
        ];
        all.extend(fields);
        Self {
            name,
            kind: TypeKind::Backbone,
            fields: all,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Elements every resource in the registry shares
fn resource_base_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::primitive("id", PrimitiveType::Id),
        FieldDef::complex("meta", "Meta"),
        FieldDef::primitive("implicitRules", PrimitiveType::Uri),
        FieldDef::primitive("language", PrimitiveType::Code),
        FieldDef::complex("text", "Narrative"),
        FieldDef::resource("contained").repeating(),
        FieldDef::complex("extension", "Extension").repeating(),
        FieldDef::complex("modifierExtension", "Extension").repeating(),
    ]
}

/// All type definitions for one FHIR version
#[derive(Debug)]
pub struct SchemaRegistry {
    version: FhirVersion,
    types: HashMap<&'static str, TypeDef>,
    base: TypeDef,
}

impl SchemaRegistry {
    /// Build the registry for a version and check that it is self-consistent
    pub fn for_version(version: FhirVersion) -> EngineResult<Self> {
        let mut types = HashMap::new();
        for def in datatypes::definitions(version)
            .into_iter()
            .chain(resources::definitions(version))
        {
            if types.insert(def.name, def).is_some() {
                return Err(EngineError::schema(format!(
                    "duplicate type definition in FHIR {} registry",
                    version
                )));
            }
        }

        let registry = Self {
            version,
            types,
            base: TypeDef::resource("Resource", Vec::new()),
        };
        registry.check()?;

        tracing::debug!(
            version = %version,
            types = registry.types.len(),
            "Schema registry built"
        );
        Ok(registry)
    }

    pub fn version(&self) -> FhirVersion {
        self.version
    }

    /// Definition of a registered resource type
    pub fn resource(&self, name: &str) -> Option<&TypeDef> {
        self.types
            .get(name)
            .filter(|def| def.kind == TypeKind::Resource)
    }

    /// Definition of any registered type
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Base elements used for resource types outside the registry
    pub fn base_resource(&self) -> &TypeDef {
        &self.base
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .types
            .values()
            .filter(|def| def.kind == TypeKind::Resource)
            .map(|def| def.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Look up a complex type a field refers to
    pub fn complex(&self, type_name: &str) -> EngineResult<&TypeDef> {
        self.types.get(type_name).ok_or_else(|| {
            EngineError::internal(format!(
                "type '{}' is referenced but not defined in the FHIR {} registry",
                type_name, self.version
            ))
        })
    }

    fn check(&self) -> EngineResult<()> {
        let all = self.types.values().chain(std::iter::once(&self.base));
        for def in all {
            for field in &def.fields {
                if let FieldKind::Complex(target) = field.kind {
                    if !self.types.contains_key(target) {
                        return Err(EngineError::schema(format!(
                            "{}.{} refers to undefined type '{}'",
                            def.name, field.name, target
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
