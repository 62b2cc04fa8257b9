use super::{FieldDef, PrimitiveType as P, TypeDef};
use crate::FhirVersion;

pub(super) const ADMINISTRATIVE_GENDER: &[&str] = &["male", "female", "other", "unknown"];
pub(super) const LINK_TYPE: &[&str] = &["replaced-by", "replaces", "refer", "seealso"];
pub(super) const OBSERVATION_STATUS: &[&str] = &[
    "registered",
    "preliminary",
    "final",
    "amended",
    "corrected",
    "cancelled",
    "entered-in-error",
    "unknown",
];
const TRIGGERED_BY_TYPE: &[&str] = &["reflex", "repeat", "re-run"];

pub(super) fn definitions(version: FhirVersion) -> Vec<TypeDef> {
    let mut defs = patient(version);
    defs.extend(observation(version));
    defs
}

fn patient(version: FhirVersion) -> Vec<TypeDef> {
    let resource = TypeDef::resource(
        "Patient",
        vec![
            FieldDef::complex("identifier", "Identifier").repeating(),
            FieldDef::primitive("active", P::Boolean),
            FieldDef::complex("name", "HumanName").repeating(),
            FieldDef::complex("telecom", "ContactPoint").repeating(),
            FieldDef::primitive("gender", P::Code).with_codes(ADMINISTRATIVE_GENDER),
            FieldDef::primitive("birthDate", P::Date),
            FieldDef::primitive("deceasedBoolean", P::Boolean),
            FieldDef::primitive("deceasedDateTime", P::DateTime),
            FieldDef::complex("address", "Address").repeating(),
            FieldDef::complex("maritalStatus", "CodeableConcept"),
            FieldDef::primitive("multipleBirthBoolean", P::Boolean),
            FieldDef::primitive("multipleBirthInteger", P::Integer),
            FieldDef::complex("photo", "Attachment").repeating(),
            FieldDef::complex("contact", "Patient.contact").repeating(),
            FieldDef::complex("communication", "Patient.communication").repeating(),
            FieldDef::complex("generalPractitioner", "Reference").repeating(),
            FieldDef::complex("managingOrganization", "Reference"),
            FieldDef::complex("link", "Patient.link").repeating(),
        ],
    );

    let mut contact = vec![
        FieldDef::complex("relationship", "CodeableConcept").repeating(),
        FieldDef::complex("name", "HumanName"),
    ];
    if version == FhirVersion::R5 {
        contact.push(FieldDef::complex("additionalName", "HumanName").repeating());
    }
    contact.push(FieldDef::complex("telecom", "ContactPoint").repeating());
    contact.push(FieldDef::complex("address", "Address"));
    if version == FhirVersion::R5 {
        contact.push(FieldDef::complex("additionalAddress", "Address").repeating());
    }
    contact.extend([
        FieldDef::primitive("gender", P::Code).with_codes(ADMINISTRATIVE_GENDER),
        FieldDef::complex("organization", "Reference"),
        FieldDef::complex("period", "Period"),
    ]);

    vec![
        resource,
        TypeDef::backbone("Patient.contact", contact),
        TypeDef::backbone(
            "Patient.communication",
            vec![
                FieldDef::complex("language", "CodeableConcept"),
                FieldDef::primitive("preferred", P::Boolean),
            ],
        ),
        TypeDef::backbone(
            "Patient.link",
            vec![
                FieldDef::complex("other", "Reference"),
                FieldDef::primitive("type", P::Code).with_codes(LINK_TYPE),
            ],
        ),
    ]
}

/// value[x] choices shared by Observation and Observation.component
fn observation_values(version: FhirVersion) -> Vec<FieldDef> {
    let mut values = vec![
        FieldDef::complex("valueQuantity", "Quantity"),
        FieldDef::complex("valueCodeableConcept", "CodeableConcept"),
        FieldDef::primitive("valueString", P::String),
        FieldDef::primitive("valueBoolean", P::Boolean),
        FieldDef::primitive("valueInteger", P::Integer),
        FieldDef::complex("valueRange", "Range"),
        FieldDef::complex("valueRatio", "Ratio"),
        FieldDef::primitive("valueTime", P::Time),
        FieldDef::primitive("valueDateTime", P::DateTime),
        FieldDef::complex("valuePeriod", "Period"),
    ];
    if version == FhirVersion::R5 {
        values.push(FieldDef::complex("valueAttachment", "Attachment"));
        values.push(FieldDef::complex("valueReference", "Reference"));
    }
    values
}

fn observation(version: FhirVersion) -> Vec<TypeDef> {
    let r5 = version == FhirVersion::R5;

    let mut fields = vec![FieldDef::complex("identifier", "Identifier").repeating()];
    if r5 {
        fields.push(FieldDef::primitive("instantiatesCanonical", P::Canonical));
        fields.push(FieldDef::complex("instantiatesReference", "Reference"));
    }
    fields.push(FieldDef::complex("basedOn", "Reference").repeating());
    if r5 {
        fields.push(FieldDef::complex("triggeredBy", "Observation.triggeredBy").repeating());
    }
    fields.extend([
        FieldDef::complex("partOf", "Reference").repeating(),
        FieldDef::primitive("status", P::Code).with_codes(OBSERVATION_STATUS),
        FieldDef::complex("category", "CodeableConcept").repeating(),
        FieldDef::complex("code", "CodeableConcept"),
        FieldDef::complex("subject", "Reference"),
        FieldDef::complex("focus", "Reference").repeating(),
        FieldDef::complex("encounter", "Reference"),
        FieldDef::primitive("effectiveDateTime", P::DateTime),
        FieldDef::complex("effectivePeriod", "Period"),
        FieldDef::primitive("effectiveInstant", P::Instant),
        FieldDef::primitive("issued", P::Instant),
        FieldDef::complex("performer", "Reference").repeating(),
    ]);
    fields.extend(observation_values(version));
    fields.extend([
        FieldDef::complex("dataAbsentReason", "CodeableConcept"),
        FieldDef::complex("interpretation", "CodeableConcept").repeating(),
        FieldDef::complex("note", "Annotation").repeating(),
        FieldDef::complex("bodySite", "CodeableConcept"),
    ]);
    if r5 {
        fields.push(FieldDef::complex("bodyStructure", "Reference"));
    }
    fields.extend([
        FieldDef::complex("method", "CodeableConcept"),
        FieldDef::complex("specimen", "Reference"),
        FieldDef::complex("device", "Reference"),
        FieldDef::complex("referenceRange", "Observation.referenceRange").repeating(),
        FieldDef::complex("hasMember", "Reference").repeating(),
        FieldDef::complex("derivedFrom", "Reference").repeating(),
        FieldDef::complex("component", "Observation.component").repeating(),
    ]);

    let mut range = vec![
        FieldDef::complex("low", "Quantity"),
        FieldDef::complex("high", "Quantity"),
    ];
    if r5 {
        range.push(FieldDef::complex("normalValue", "CodeableConcept"));
    }
    range.extend([
        FieldDef::complex("type", "CodeableConcept"),
        FieldDef::complex("appliesTo", "CodeableConcept").repeating(),
        FieldDef::complex("age", "Range"),
        FieldDef::primitive("text", P::Markdown),
    ]);

    let mut component = vec![FieldDef::complex("code", "CodeableConcept")];
    component.extend(observation_values(version));
    component.extend([
        FieldDef::complex("dataAbsentReason", "CodeableConcept"),
        FieldDef::complex("interpretation", "CodeableConcept").repeating(),
        FieldDef::complex("referenceRange", "Observation.referenceRange").repeating(),
    ]);

    let mut defs = vec![
        TypeDef::resource("Observation", fields),
        TypeDef::backbone("Observation.referenceRange", range),
        TypeDef::backbone("Observation.component", component),
    ];
    if r5 {
        defs.push(TypeDef::backbone(
            "Observation.triggeredBy",
            vec![
                FieldDef::complex("observation", "Reference"),
                FieldDef::primitive("type", P::Code).with_codes(TRIGGERED_BY_TYPE),
                FieldDef::primitive("reason", P::String),
            ],
        ));
    }
    defs
}
