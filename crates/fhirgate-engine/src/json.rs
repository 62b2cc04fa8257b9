//! FHIR JSON codec

use serde_json::{Map, Value};

use crate::decode::{child, indexed, DecodeContext};
use crate::error::{EngineError, EngineResult, FormatError};
use crate::primitive::{self, JsonPrimitive};
use crate::resource::{NoticeKind, ParseMode, ParsedResource, Resource};
use crate::schema::{FieldDef, FieldKind, SchemaRegistry, TypeDef, TypeKind};
use crate::xml;

pub(crate) fn parse(
    registry: &SchemaRegistry,
    content: &str,
    mode: ParseMode,
) -> EngineResult<ParsedResource> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| FormatError::new(format!("Invalid JSON: {}", e)))?;

    let mut ctx = DecodeContext::new(registry, mode);
    let resource = decode_resource(&mut ctx, &value, None)?;
    Ok(ParsedResource {
        resource,
        notices: ctx.into_notices(),
    })
}

pub(crate) fn serialize(resource: &Resource, pretty: bool) -> EngineResult<String> {
    let result = if pretty {
        serde_json::to_string_pretty(resource.as_json())
    } else {
        serde_json::to_string(resource.as_json())
    };
    result.map_err(|e| EngineError::internal(format!("JSON serialization failed: {}", e)))
}

/// `parent` is the path of the element holding a nested resource
fn decode_resource(
    ctx: &mut DecodeContext<'_>,
    value: &Value,
    parent: Option<&str>,
) -> EngineResult<Resource> {
    let location = parent.unwrap_or("$");
    let object = value
        .as_object()
        .ok_or_else(|| FormatError::at(location, "A resource must be a JSON object"))?;

    let resource_type = match object.get("resourceType") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(_) => {
            let message = "Property 'resourceType' must be a non-empty string";
            return Err(FormatError::at(location, message).into());
        }
        None => {
            let message = "Missing required property 'resourceType'";
            return Err(FormatError::at(location, message).into());
        }
    };

    let path = parent.map(str::to_string).unwrap_or_else(|| resource_type.clone());
    let (def, schemaless) = ctx.resource_def(&resource_type, &path)?;
    let body = decode_object(ctx, def, object, &path, schemaless)?;
    Ok(Resource::from_parts(resource_type, body))
}

/// Decode the members of an object in schema order.
///
/// With `schemaless` set, members outside the definition are kept verbatim
/// after the typed ones instead of being dropped.
fn decode_object(
    ctx: &mut DecodeContext<'_>,
    def: &TypeDef,
    object: &Map<String, Value>,
    path: &str,
    schemaless: bool,
) -> EngineResult<Map<String, Value>> {
    let mut untyped = Vec::new();
    for (key, value) in object {
        if key == "resourceType" && def.kind == TypeKind::Resource {
            continue;
        }
        if def.field(key).is_some() {
            continue;
        }
        if let Some(base) = key.strip_prefix('_') {
            ctx.tolerate(
                &child(path, key),
                NoticeKind::PrimitiveExtension,
                format!("Extensions on primitive element '{}' are not kept", base),
            )?;
        } else if schemaless {
            untyped.push((key.clone(), value.clone()));
        } else {
            ctx.tolerate(
                &child(path, key),
                NoticeKind::UnknownElement,
                format!("Unknown element '{}' in {}", key, def.name),
            )?;
        }
    }

    let mut out = Map::new();
    for field in &def.fields {
        if let Some(value) = object.get(field.name) {
            if let Some(decoded) = decode_field(ctx, field, value, &child(path, field.name))? {
                out.insert(field.name.to_string(), decoded);
            }
        }
    }
    out.extend(untyped);
    Ok(out)
}

fn decode_field(
    ctx: &mut DecodeContext<'_>,
    field: &FieldDef,
    value: &Value,
    path: &str,
) -> EngineResult<Option<Value>> {
    match (field.repeating, value) {
        (_, Value::Null) => {
            ctx.tolerate(path, NoticeKind::EmptyValue, "Null value ignored")?;
            Ok(None)
        }
        (_, Value::Array(items)) if items.is_empty() => {
            ctx.tolerate(path, NoticeKind::EmptyValue, "Empty array ignored")?;
            Ok(None)
        }
        (true, Value::Array(items)) => {
            let mut decoded = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                if let Some(v) = decode_single(ctx, field, item, &indexed(path, i))? {
                    decoded.push(v);
                }
            }
            Ok((!decoded.is_empty()).then_some(Value::Array(decoded)))
        }
        (true, single) => {
            ctx.tolerate(
                path,
                NoticeKind::Cardinality,
                format!("Element '{}' repeats; a single value was wrapped in an array", field.name),
            )?;
            Ok(decode_single(ctx, field, single, path)?.map(|v| Value::Array(vec![v])))
        }
        (false, Value::Array(items)) if items.len() == 1 => {
            ctx.tolerate(
                path,
                NoticeKind::Cardinality,
                format!("Element '{}' does not repeat; a one-element array was unwrapped", field.name),
            )?;
            decode_single(ctx, field, &items[0], path)
        }
        (false, Value::Array(items)) => Err(FormatError::at(
            path,
            format!("Element '{}' does not repeat, found {} values", field.name, items.len()),
        )
        .into()),
        (false, single) => decode_single(ctx, field, single, path),
    }
}

fn decode_single(
    ctx: &mut DecodeContext<'_>,
    field: &FieldDef,
    value: &Value,
    path: &str,
) -> EngineResult<Option<Value>> {
    if value.is_null() {
        ctx.tolerate(path, NoticeKind::EmptyValue, "Null value ignored")?;
        return Ok(None);
    }

    match field.kind {
        FieldKind::Primitive(ty) => {
            if value.as_str().is_some_and(|s| s.trim().is_empty()) {
                ctx.tolerate(path, NoticeKind::EmptyValue, "Empty string ignored")?;
                return Ok(None);
            }
            let decoded = match primitive::from_json(ty, value) {
                Ok(JsonPrimitive::Exact(v)) => v,
                Ok(JsonPrimitive::Coerced(v, message)) => {
                    ctx.tolerate(path, NoticeKind::Coerced, message)?;
                    v
                }
                Err(message) => return Err(FormatError::at(path, message).into()),
            };
            ctx.check_code(field, &decoded, path)?;
            Ok(Some(decoded))
        }
        FieldKind::Complex(type_name) => {
            let object = value.as_object().ok_or_else(|| {
                FormatError::at(path, format!("Expected a {} object", type_name))
            })?;
            let registry = ctx.registry;
            let def = registry.complex(type_name)?;
            let decoded = decode_object(ctx, def, object, path, false)?;
            if decoded.is_empty() {
                ctx.tolerate(path, NoticeKind::EmptyValue, format!("Empty {} ignored", type_name))?;
                return Ok(None);
            }
            Ok(Some(Value::Object(decoded)))
        }
        FieldKind::Resource => {
            let resource = decode_resource(ctx, value, Some(path))?;
            Ok(Some(resource.into_json()))
        }
        FieldKind::Xhtml => match value.as_str() {
            Some(markup) => {
                xml::check_xhtml(markup).map_err(|e| {
                    FormatError::at(path, format!("Narrative is not well-formed XHTML: {}", e))
                })?;
                Ok(Some(Value::String(markup.to_string())))
            }
            None => Err(FormatError::at(path, "Narrative must be an XHTML <div> element").into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoticeKind;
    use crate::FhirVersion;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::for_version(FhirVersion::R4).unwrap()
    }

    #[test]
    fn test_fields_come_out_in_schema_order() {
        let input = r#"{"gender":"male","id":"p1","resourceType":"Patient","birthDate":"1990-05-15"}"#;
        let parsed = parse(&registry(), input, ParseMode::Lenient).unwrap();
        assert!(parsed.notices.is_empty());
        assert_eq!(
            serialize(&parsed.resource, false).unwrap(),
            r#"{"resourceType":"Patient","id":"p1","gender":"male","birthDate":"1990-05-15"}"#
        );
    }

    #[test]
    fn test_lenient_records_each_deviation() {
        let input = json!({
            "resourceType": "Patient",
            "active": "true",
            "gender": "robot",
            "name": {"family": "Smith"},
            "birthDate": null,
            "favouriteColour": "blue",
            "_gender": {"extension": []}
        })
        .to_string();
        let parsed = parse(&registry(), &input, ParseMode::Lenient).unwrap();

        let kinds: Vec<_> = parsed.notices.iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&NoticeKind::Coerced));
        assert!(kinds.contains(&NoticeKind::UnknownCode));
        assert!(kinds.contains(&NoticeKind::Cardinality));
        assert!(kinds.contains(&NoticeKind::EmptyValue));
        assert!(kinds.contains(&NoticeKind::UnknownElement));
        assert!(kinds.contains(&NoticeKind::PrimitiveExtension));

        assert_eq!(
            parsed.resource.as_json(),
            &json!({
                "resourceType": "Patient",
                "active": true,
                "name": [{"family": "Smith"}],
                "gender": "robot"
            })
        );
    }

    #[test]
    fn test_strict_rejects_unknown_element() {
        let input = r#"{"resourceType":"Patient","favouriteColour":"blue"}"#;
        let err = parse(&registry(), input, ParseMode::Strict).unwrap_err();
        match err {
            EngineError::Format(f) => assert_eq!(f.location.as_deref(), Some("Patient.favouriteColour")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_date_fails_in_both_modes() {
        let input = r#"{"resourceType":"Patient","birthDate":"not-a-date"}"#;
        for mode in [ParseMode::Lenient, ParseMode::Strict] {
            let err = parse(&registry(), input, mode).unwrap_err();
            assert!(err.is_format());
            assert!(err.to_string().contains("not-a-date"));
        }
    }

    #[test]
    fn test_unknown_resource_type_keeps_untyped_members() {
        let input = r#"{"resourceType":"Condition","id":"c1","onsetDateTime":"2020-06-15"}"#;
        let parsed = parse(&registry(), input, ParseMode::Lenient).unwrap();
        assert_eq!(parsed.resource.resource_type(), "Condition");
        assert_eq!(parsed.resource.id(), Some("c1"));
        assert_eq!(parsed.resource.get("onsetDateTime"), Some(&json!("2020-06-15")));
        assert_eq!(parsed.notices.len(), 1);

        assert!(parse(&registry(), input, ParseMode::Strict).is_err());
    }

    #[test]
    fn test_narrative_must_be_well_formed() {
        let patient = |div: &str| {
            json!({
                "resourceType": "Patient",
                "text": {"status": "generated", "div": div}
            })
            .to_string()
        };

        let ok = patient(r#"<div xmlns="http://www.w3.org/1999/xhtml">Tom &amp; Jerry<br/></div>"#);
        assert!(parse(&registry(), &ok, ParseMode::Strict).is_ok());

        let broken = patient(r#"<div xmlns="http://www.w3.org/1999/xhtml">Tom & Jerry <br></div>"#);
        for mode in [ParseMode::Lenient, ParseMode::Strict] {
            match parse(&registry(), &broken, mode).unwrap_err() {
                EngineError::Format(f) => {
                    assert_eq!(f.location.as_deref(), Some("Patient.text.div"));
                    assert!(f.message.starts_with("Narrative is not well-formed XHTML"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_resource_type() {
        let err = parse(&registry(), r#"{"id":"x"}"#, ParseMode::Lenient).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required property 'resourceType' (at $)"
        );
    }

    #[test]
    fn test_contained_resources_are_decoded() {
        let input = json!({
            "resourceType": "Observation",
            "status": "final",
            "contained": [{"resourceType": "Patient", "id": "p", "gender": "female"}],
            "subject": {"reference": "#p"}
        })
        .to_string();
        let parsed = parse(&registry(), &input, ParseMode::Strict).unwrap();
        assert_eq!(
            parsed.resource.as_json().pointer("/contained/0/gender"),
            Some(&json!("female"))
        );
    }
}
