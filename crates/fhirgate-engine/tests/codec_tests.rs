use fhirgate_engine::{
    EngineError, FhirEngine, FhirVersion, NoticeKind, ParseMode, ResourceFormat,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

const R5_OBSERVATION: &str = r#"{
  "resourceType": "Observation",
  "id": "triggered",
  "status": "final",
  "triggeredBy": [{"observation": {"reference": "Observation/a"}, "type": "reflex"}],
  "code": {"coding": [{"system": "http://loinc.org", "code": "8867-4", "display": "Heart rate"}]},
  "bodyStructure": {"reference": "BodyStructure/b"}
}"#;

#[test]
fn test_r5_elements_are_version_specific() {
    let r5 = FhirEngine::new(FhirVersion::R5).unwrap();
    let parsed = r5
        .parse(R5_OBSERVATION, ResourceFormat::Json, ParseMode::Strict)
        .unwrap();
    assert!(parsed.notices.is_empty());

    let r4 = FhirEngine::new(FhirVersion::R4).unwrap();
    let lenient = r4
        .parse(R5_OBSERVATION, ResourceFormat::Json, ParseMode::Lenient)
        .unwrap();
    let unknown: Vec<_> = lenient
        .notices
        .iter()
        .filter(|n| n.kind == NoticeKind::UnknownElement)
        .map(|n| n.path.as_str())
        .collect();
    assert_eq!(unknown, vec!["Observation.triggeredBy", "Observation.bodyStructure"]);
    assert!(lenient.resource.get("triggeredBy").is_none());

    let err = r4
        .parse(R5_OBSERVATION, ResourceFormat::Json, ParseMode::Strict)
        .unwrap_err();
    assert!(matches!(err, EngineError::Format(_)));
}

#[test]
fn test_bundle_entries_survive_xml_round_trip() {
    let engine = FhirEngine::new(FhirVersion::R4).unwrap();
    let bundle = json!({
        "resourceType": "Bundle",
        "id": "bundle-example",
        "type": "collection",
        "entry": [
            {"resource": {"resourceType": "Patient", "id": "a"}},
            {"resource": {"resourceType": "Patient", "id": "b"}}
        ]
    })
    .to_string();

    let parsed = engine
        .parse(&bundle, ResourceFormat::Json, ParseMode::Lenient)
        .unwrap();
    let xml = engine
        .serialize(&parsed.resource, ResourceFormat::Xml, true)
        .unwrap();
    assert!(xml.contains("<resource>"));

    let back = engine
        .parse(&xml, ResourceFormat::Xml, ParseMode::Lenient)
        .unwrap();
    assert_eq!(back.resource.id(), Some("bundle-example"));
    assert_eq!(
        back.resource.as_json().pointer("/entry/1/resource/id"),
        Some(&json!("b"))
    );
}

#[test]
fn test_strict_mode_accepts_clean_xml() {
    let engine = FhirEngine::new(FhirVersion::R4).unwrap();
    let xml = r#"<Patient xmlns="http://hl7.org/fhir">
  <id value="p1"/>
  <extension url="http://example.org/fhir/StructureDefinition/eye-colour">
    <valueString value="brown"/>
  </extension>
  <active value="true"/>
  <contact>
    <name><family value="Smith"/></name>
  </contact>
</Patient>"#;
    let parsed = engine
        .parse(xml, ResourceFormat::Xml, ParseMode::Strict)
        .unwrap();
    assert_eq!(
        parsed.resource.as_json(),
        &json!({
            "resourceType": "Patient",
            "id": "p1",
            "extension": [{
                "url": "http://example.org/fhir/StructureDefinition/eye-colour",
                "valueString": "brown"
            }],
            "active": true,
            "contact": [{"name": {"family": "Smith"}}]
        })
    );
}

proptest! {
    #[test]
    fn prop_integers_survive_both_encodings(rank in 1i32..=i32::MAX) {
        let engine = FhirEngine::new(FhirVersion::R4).unwrap();
        let input = json!({
            "resourceType": "Patient",
            "telecom": [{"system": "phone", "value": "555", "rank": rank}]
        })
        .to_string();

        let parsed = engine.parse(&input, ResourceFormat::Json, ParseMode::Strict).unwrap();
        let xml = engine.serialize(&parsed.resource, ResourceFormat::Xml, false).unwrap();
        let back = engine.parse(&xml, ResourceFormat::Xml, ParseMode::Strict).unwrap();
        prop_assert_eq!(back.resource, parsed.resource);
    }
}

#[test]
fn test_untyped_markup_never_breaks_xml_output() {
    let engine = FhirEngine::new(FhirVersion::R4).unwrap();
    let basic = json!({
        "resourceType": "Basic",
        "id": "b1",
        "note": {"div": "<div>Tom & Jerry <br></div>"}
    })
    .to_string();

    let parsed = engine
        .parse(&basic, ResourceFormat::Json, ParseMode::Lenient)
        .unwrap();
    let xml = engine
        .serialize(&parsed.resource, ResourceFormat::Xml, false)
        .unwrap();
    assert!(!xml.contains("Tom & Jerry"));

    let back = engine
        .parse(&xml, ResourceFormat::Xml, ParseMode::Lenient)
        .unwrap();
    assert_eq!(back.resource.id(), Some("b1"));
}
