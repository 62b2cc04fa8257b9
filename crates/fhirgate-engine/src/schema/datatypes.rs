//! Datatype definitions shared by the registered resources

use super::{FieldDef, PrimitiveType as P, TypeDef};
use crate::FhirVersion;

pub(super) const NAME_USE: &[&str] = &[
    "usual",
    "official",
    "temp",
    "nickname",
    "anonymous",
    "old",
    "maiden",
];
pub(super) const IDENTIFIER_USE: &[&str] = &["usual", "official", "temp", "secondary", "old"];
pub(super) const CONTACT_POINT_SYSTEM: &[&str] =
    &["phone", "fax", "email", "pager", "url", "sms", "other"];
pub(super) const CONTACT_POINT_USE: &[&str] = &["home", "work", "temp", "old", "mobile"];
pub(super) const ADDRESS_USE: &[&str] = &["home", "work", "temp", "old", "billing"];
pub(super) const ADDRESS_TYPE: &[&str] = &["postal", "physical", "both"];
pub(super) const NARRATIVE_STATUS: &[&str] = &["generated", "extensions", "additional", "empty"];
pub(super) const QUANTITY_COMPARATOR: &[&str] = &["<", "<=", ">=", ">"];

pub(super) fn definitions(version: FhirVersion) -> Vec<TypeDef> {
    let mut defs = vec![
        TypeDef::datatype("Element", Vec::new()),
        // `url` sits between the element base and value[x], as an XML attribute
        TypeDef {
            name: "Extension",
            kind: super::TypeKind::Datatype,
            fields: extension_fields(),
        },
        TypeDef::datatype(
            "Meta",
            vec![
                FieldDef::primitive("versionId", P::Id),
                FieldDef::primitive("lastUpdated", P::Instant),
                FieldDef::primitive("source", P::Uri),
                FieldDef::primitive("profile", P::Canonical).repeating(),
                FieldDef::complex("security", "Coding").repeating(),
                FieldDef::complex("tag", "Coding").repeating(),
            ],
        ),
        TypeDef::datatype(
            "Narrative",
            vec![
                FieldDef::primitive("status", P::Code).with_codes(NARRATIVE_STATUS),
                FieldDef::xhtml("div"),
            ],
        ),
        TypeDef::datatype(
            "Coding",
            vec![
                FieldDef::primitive("system", P::Uri),
                FieldDef::primitive("version", P::String),
                FieldDef::primitive("code", P::Code),
                FieldDef::primitive("display", P::String),
                FieldDef::primitive("userSelected", P::Boolean),
            ],
        ),
        TypeDef::datatype(
            "CodeableConcept",
            vec![
                FieldDef::complex("coding", "Coding").repeating(),
                FieldDef::primitive("text", P::String),
            ],
        ),
        TypeDef::datatype(
            "Identifier",
            vec![
                FieldDef::primitive("use", P::Code).with_codes(IDENTIFIER_USE),
                FieldDef::complex("type", "CodeableConcept"),
                FieldDef::primitive("system", P::Uri),
                FieldDef::primitive("value", P::String),
                FieldDef::complex("period", "Period"),
                FieldDef::complex("assigner", "Reference"),
            ],
        ),
        TypeDef::datatype(
            "HumanName",
            vec![
                FieldDef::primitive("use", P::Code).with_codes(NAME_USE),
                FieldDef::primitive("text", P::String),
                FieldDef::primitive("family", P::String),
                FieldDef::primitive("given", P::String).repeating(),
                FieldDef::primitive("prefix", P::String).repeating(),
                FieldDef::primitive("suffix", P::String).repeating(),
                FieldDef::complex("period", "Period"),
            ],
        ),
        TypeDef::datatype(
            "ContactPoint",
            vec![
                FieldDef::primitive("system", P::Code).with_codes(CONTACT_POINT_SYSTEM),
                FieldDef::primitive("value", P::String),
                FieldDef::primitive("use", P::Code).with_codes(CONTACT_POINT_USE),
                FieldDef::primitive("rank", P::PositiveInt),
                FieldDef::complex("period", "Period"),
            ],
        ),
        TypeDef::datatype(
            "Address",
            vec![
                FieldDef::primitive("use", P::Code).with_codes(ADDRESS_USE),
                FieldDef::primitive("type", P::Code).with_codes(ADDRESS_TYPE),
                FieldDef::primitive("text", P::String),
                FieldDef::primitive("line", P::String).repeating(),
                FieldDef::primitive("city", P::String),
                FieldDef::primitive("district", P::String),
                FieldDef::primitive("state", P::String),
                FieldDef::primitive("postalCode", P::String),
                FieldDef::primitive("country", P::String),
                FieldDef::complex("period", "Period"),
            ],
        ),
        TypeDef::datatype(
            "Period",
            vec![
                FieldDef::primitive("start", P::DateTime),
                FieldDef::primitive("end", P::DateTime),
            ],
        ),
        TypeDef::datatype(
            "Reference",
            vec![
                FieldDef::primitive("reference", P::String),
                FieldDef::primitive("type", P::Uri),
                FieldDef::complex("identifier", "Identifier"),
                FieldDef::primitive("display", P::String),
            ],
        ),
        TypeDef::datatype(
            "Quantity",
            vec![
                FieldDef::primitive("value", P::Decimal),
                FieldDef::primitive("comparator", P::Code).with_codes(QUANTITY_COMPARATOR),
                FieldDef::primitive("unit", P::String),
                FieldDef::primitive("system", P::Uri),
                FieldDef::primitive("code", P::Code),
            ],
        ),
        TypeDef::datatype(
            "Range",
            vec![
                FieldDef::complex("low", "Quantity"),
                FieldDef::complex("high", "Quantity"),
            ],
        ),
        TypeDef::datatype(
            "Ratio",
            vec![
                FieldDef::complex("numerator", "Quantity"),
                FieldDef::complex("denominator", "Quantity"),
            ],
        ),
        TypeDef::datatype(
            "Attachment",
            vec![
                FieldDef::primitive("contentType", P::Code),
                FieldDef::primitive("language", P::Code),
                FieldDef::primitive("data", P::Base64Binary),
                FieldDef::primitive("url", P::Url),
                FieldDef::primitive("size", P::UnsignedInt),
                FieldDef::primitive("hash", P::Base64Binary),
                FieldDef::primitive("title", P::String),
                FieldDef::primitive("creation", P::DateTime),
            ],
        ),
        TypeDef::datatype(
            "Annotation",
            vec![
                FieldDef::complex("authorReference", "Reference"),
                FieldDef::primitive("authorString", P::String),
                FieldDef::primitive("time", P::DateTime),
                FieldDef::primitive("text", P::Markdown),
            ],
        ),
    ];

    if version == FhirVersion::R5 {
        defs.push(TypeDef::datatype(
            "CodeableReference",
            vec![
                FieldDef::complex("concept", "CodeableConcept"),
                FieldDef::complex("reference", "Reference"),
            ],
        ));
    }

    defs
}

fn extension_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::primitive("id", P::String).as_attribute(),
        FieldDef::complex("extension", "Extension").repeating(),
        FieldDef::primitive("url", P::Uri).as_attribute(),
        FieldDef::primitive("valueBoolean", P::Boolean),
        FieldDef::primitive("valueInteger", P::Integer),
        FieldDef::primitive("valueDecimal", P::Decimal),
        FieldDef::primitive("valueString", P::String),
        FieldDef::primitive("valueCode", P::Code),
        FieldDef::primitive("valueUri", P::Uri),
        FieldDef::primitive("valueDate", P::Date),
        FieldDef::primitive("valueDateTime", P::DateTime),
        FieldDef::primitive("valueInstant", P::Instant),
        FieldDef::complex("valueCoding", "Coding"),
        FieldDef::complex("valueCodeableConcept", "CodeableConcept"),
        FieldDef::complex("valueIdentifier", "Identifier"),
        FieldDef::complex("valuePeriod", "Period"),
        FieldDef::complex("valueQuantity", "Quantity"),
        FieldDef::complex("valueReference", "Reference"),
        FieldDef::complex("valueAddress", "Address"),
        FieldDef::complex("valueHumanName", "HumanName"),
    ]
}
