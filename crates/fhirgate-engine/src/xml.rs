//! FHIR XML codec
//!
//! Reading happens in two steps: quick-xml events are folded into a small
//! element tree, which is then decoded against the schema registry into the
//! same JSON tree the JSON codec produces. Narrative `div` elements are
//! captured as raw markup and never decoded.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::decode::{child, indexed, is_resource_name, DecodeContext};
use crate::error::{EngineError, EngineResult, FormatError};
use crate::primitive;
use crate::resource::{NoticeKind, ParseMode, ParsedResource, Resource};
use crate::schema::{FieldDef, FieldKind, SchemaRegistry, TypeDef};

/// Namespace of FHIR XML documents
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Deepest element nesting accepted, the same limit serde_json applies
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: Option<String>,
    /// Raw markup of an XHTML `div`
    xhtml: Option<String>,
}

impl XmlElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub(crate) fn parse(
    registry: &SchemaRegistry,
    content: &str,
    mode: ParseMode,
) -> EngineResult<ParsedResource> {
    let root = read_document(content)?;
    if !is_resource_name(&root.name) {
        return Err(FormatError::new(format!(
            "Root element <{}> is not a FHIR resource",
            root.name
        ))
        .into());
    }

    let mut ctx = DecodeContext::new(registry, mode);
    let resource = decode_resource(&mut ctx, &root, None)?;
    Ok(ParsedResource {
        resource,
        notices: ctx.into_notices(),
    })
}

fn syntax_error(position: impl std::fmt::Display, err: impl std::fmt::Display) -> FormatError {
    FormatError::new(format!("Invalid XML at position {}: {}", position, err))
}

fn read_document(content: &str) -> Result<XmlElement, FormatError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| syntax_error(reader.buffer_position(), e))?;

        match event {
            Event::Start(start) => {
                check_depth(stack.len())?;
                let mut element = open_element(&start)?;
                if element.name == "div" {
                    let end = start.to_end().into_owned();
                    let inner = reader
                        .read_text(end.name())
                        .map_err(|e| syntax_error(reader.buffer_position(), e))?;
                    element.xhtml = Some(format!(
                        "<{}>{}</{}>",
                        tag_text(&start)?,
                        inner,
                        String::from_utf8_lossy(end.name().as_ref())
                    ));
                    attach(&mut stack, &mut root, element)?;
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(start) => {
                check_depth(stack.len())?;
                let mut element = open_element(&start)?;
                if element.name == "div" {
                    element.xhtml = Some(format!("<{}/>", tag_text(&start)?));
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::new("Unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| syntax_error(reader.buffer_position(), e))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FormatError::new(format!(
            "Unexpected end of XML document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| FormatError::new("XML document has no root element"))
}

fn check_depth(open: usize) -> Result<(), FormatError> {
    if open >= MAX_DEPTH {
        return Err(FormatError::new(format!(
            "XML nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}

/// Checks that narrative markup is one well-formed XHTML `div`
pub(crate) fn check_xhtml(markup: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(markup);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("position {}: {}", reader.buffer_position(), e))?;

        match &event {
            Event::Start(start) | Event::Empty(start) => {
                if depth == 0 {
                    roots += 1;
                    if roots > 1 || start.local_name().as_ref() != b"div" {
                        return Err("markup must be a single <div> element".to_string());
                    }
                }
                for attr in start.attributes() {
                    attr.map_err(|e| e.to_string())?
                        .unescape_value()
                        .map_err(|e| e.to_string())?;
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                    if depth > MAX_DEPTH {
                        return Err(format!("nesting exceeds {} levels", MAX_DEPTH));
                    }
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced closing tag".to_string())?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err("text outside the <div> element".to_string());
                }
            }
            Event::CData(_) if depth == 0 => {
                return Err("text outside the <div> element".to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (roots, depth) {
        (0, _) => Err("markup must be a single <div> element".to_string()),
        (_, 0) => Ok(()),
        _ => Err("unclosed element".to_string()),
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, FormatError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FormatError::new(format!("Invalid attribute on <{}>: {}", name, e)))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| FormatError::new(format!("Invalid attribute value on <{}>: {}", name, e)))?;
        attributes.push((
            String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(XmlElement {
        name,
        attributes,
        ..XmlElement::default()
    })
}

/// Tag content between the angle brackets: name and attributes
fn tag_text(start: &BytesStart<'_>) -> Result<String, FormatError> {
    std::str::from_utf8(start)
        .map(str::to_string)
        .map_err(|e| FormatError::new(format!("Invalid UTF-8 in XHTML tag: {}", e)))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), FormatError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(FormatError::new("XML document has more than one root element"));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn append_text(stack: &mut [XmlElement], text: &str) -> Result<(), FormatError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(element) => {
            element.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        None => Err(FormatError::new("Text content outside the root element")),
    }
}

fn decode_resource(
    ctx: &mut DecodeContext<'_>,
    element: &XmlElement,
    parent: Option<&str>,
) -> EngineResult<Resource> {
    let resource_type = element.name.clone();
    let path = parent
        .map(str::to_string)
        .unwrap_or_else(|| resource_type.clone());
    let (def, schemaless) = ctx.resource_def(&resource_type, &path)?;
    let body = decode_element(ctx, def, element, &path, schemaless)?;
    Ok(Resource::from_parts(resource_type, body))
}

fn decode_element(
    ctx: &mut DecodeContext<'_>,
    def: &TypeDef,
    element: &XmlElement,
    path: &str,
    schemaless: bool,
) -> EngineResult<Map<String, Value>> {
    for (key, _) in &element.attributes {
        if !def.field(key).is_some_and(|f| f.xml_attribute) {
            ctx.tolerate(
                &child(path, &format!("@{}", key)),
                NoticeKind::UnknownElement,
                format!("Unknown attribute '{}' on {}", key, def.name),
            )?;
        }
    }
    if element.text.is_some() {
        ctx.tolerate(path, NoticeKind::UnknownElement, "Text content ignored")?;
    }

    let mut untyped = Vec::new();
    for node in &element.children {
        if def.field(&node.name).is_some_and(|f| !f.xml_attribute) {
            continue;
        }
        if schemaless {
            untyped.push(node);
        } else {
            ctx.tolerate(
                &child(path, &node.name),
                NoticeKind::UnknownElement,
                format!("Unknown element '{}' in {}", node.name, def.name),
            )?;
        }
    }

    let mut out = Map::new();
    for field in &def.fields {
        let field_path = child(path, field.name);

        if field.xml_attribute {
            if let Some(text) = element.attribute(field.name) {
                if let Some(value) = decode_text(ctx, field, text, &field_path)? {
                    out.insert(field.name.to_string(), value);
                }
            }
            continue;
        }

        let nodes: Vec<&XmlElement> = element
            .children
            .iter()
            .filter(|c| c.name == field.name)
            .collect();
        if nodes.is_empty() {
            continue;
        }

        if field.repeating {
            let mut items = Vec::with_capacity(nodes.len());
            for (i, node) in nodes.iter().enumerate() {
                if let Some(value) = decode_single(ctx, field, node, &indexed(&field_path, i))? {
                    items.push(value);
                }
            }
            if !items.is_empty() {
                out.insert(field.name.to_string(), Value::Array(items));
            }
        } else if nodes.len() > 1 {
            return Err(FormatError::at(
                &field_path,
                format!(
                    "Element '{}' does not repeat, found {} occurrences",
                    field.name,
                    nodes.len()
                ),
            )
            .into());
        } else if let Some(value) = decode_single(ctx, field, nodes[0], &field_path)? {
            out.insert(field.name.to_string(), value);
        }
    }

    out.extend(group_untyped(untyped));
    Ok(out)
}

fn decode_text(
    ctx: &mut DecodeContext<'_>,
    field: &FieldDef,
    text: &str,
    path: &str,
) -> EngineResult<Option<Value>> {
    let Some(ty) = field.primitive_type() else {
        return Err(EngineError::internal(format!(
            "attribute field '{}' is not a primitive",
            field.name
        )));
    };
    if text.trim().is_empty() {
        ctx.tolerate(path, NoticeKind::EmptyValue, "Empty value ignored")?;
        return Ok(None);
    }
    let value = primitive::from_text(ty, text).map_err(|message| FormatError::at(path, message))?;
    ctx.check_code(field, &value, path)?;
    Ok(Some(value))
}

fn decode_single(
    ctx: &mut DecodeContext<'_>,
    field: &FieldDef,
    node: &XmlElement,
    path: &str,
) -> EngineResult<Option<Value>> {
    match field.kind {
        FieldKind::Primitive(_) => {
            let extras = !node.children.is_empty()
                || node.attributes.iter().any(|(key, _)| key != "value");
            if extras {
                ctx.tolerate(
                    path,
                    NoticeKind::PrimitiveExtension,
                    format!("Id and extensions on primitive element '{}' are not kept", field.name),
                )?;
            }
            match node.attribute("value") {
                Some(text) => decode_text(ctx, field, text, path),
                None if extras => Ok(None),
                None => {
                    ctx.tolerate(path, NoticeKind::EmptyValue, "Element has no value attribute")?;
                    Ok(None)
                }
            }
        }
        FieldKind::Complex(type_name) => {
            let registry = ctx.registry;
            let def = registry.complex(type_name)?;
            let decoded = decode_element(ctx, def, node, path, false)?;
            if decoded.is_empty() {
                ctx.tolerate(path, NoticeKind::EmptyValue, format!("Empty {} ignored", type_name))?;
                return Ok(None);
            }
            Ok(Some(Value::Object(decoded)))
        }
        FieldKind::Resource => match node.children.as_slice() {
            [inner] => Ok(Some(decode_resource(ctx, inner, Some(path))?.into_json())),
            _ => Err(FormatError::at(
                path,
                format!("Element '{}' must contain exactly one resource", field.name),
            )
            .into()),
        },
        FieldKind::Xhtml => match &node.xhtml {
            Some(markup) => {
                check_xhtml(markup).map_err(|e| {
                    FormatError::at(path, format!("Narrative is not well-formed XHTML: {}", e))
                })?;
                Ok(Some(Value::String(markup.clone())))
            }
            None => Err(FormatError::at(path, "Narrative must be an XHTML <div> element").into()),
        },
    }
}

/// Members of a resource type outside the registry, read without a schema.
///
/// Every primitive comes out as a string; a name seen more than once
/// becomes an array.
fn group_untyped(nodes: Vec<&XmlElement>) -> Map<String, Value> {
    let mut out = Map::new();
    for node in nodes {
        let value = untyped_value(node);
        match out.get_mut(&node.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(node.name.clone(), value);
            }
        }
    }
    out
}

fn untyped_value(node: &XmlElement) -> Value {
    if let Some(markup) = &node.xhtml {
        return Value::String(markup.clone());
    }
    if let [inner] = node.children.as_slice() {
        if node.attributes.is_empty() && is_resource_name(&inner.name) {
            let mut map = Map::new();
            map.insert("resourceType".to_string(), Value::String(inner.name.clone()));
            map.extend(group_untyped(inner.children.iter().collect()));
            return Value::Object(map);
        }
    }
    if let ([], [(key, value)]) = (node.children.as_slice(), node.attributes.as_slice()) {
        if key == "value" {
            return Value::String(value.clone());
        }
    }

    let mut map = Map::new();
    for (key, value) in &node.attributes {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    map.extend(group_untyped(node.children.iter().collect()));
    Value::Object(map)
}

type XmlWriter = Writer<Vec<u8>>;

pub(crate) fn serialize(
    registry: &SchemaRegistry,
    resource: &Resource,
    pretty: bool,
) -> EngineResult<String> {
    let mut writer = if pretty {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };

    let object = resource
        .as_json()
        .as_object()
        .ok_or_else(|| EngineError::internal("resource tree is not an object"))?;
    write_resource(&mut writer, registry, object, Some(FHIR_NAMESPACE))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| EngineError::internal(format!("XML output is not UTF-8: {}", e)))
}

fn emit<'a>(writer: &mut XmlWriter, event: impl Into<Event<'a>>) -> EngineResult<()> {
    writer
        .write_event(event)
        .map_err(|e| EngineError::internal(format!("XML serialization failed: {}", e)))
}

fn write_resource(
    writer: &mut XmlWriter,
    registry: &SchemaRegistry,
    object: &Map<String, Value>,
    namespace: Option<&str>,
) -> EngineResult<()> {
    let resource_type = object
        .get("resourceType")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::internal("nested resource without resourceType"))?;
    let (def, schemaless) = match registry.resource(resource_type) {
        Some(def) => (def, false),
        None => (registry.base_resource(), true),
    };
    write_element(writer, registry, def, resource_type, object, schemaless, namespace)
}

fn write_element(
    writer: &mut XmlWriter,
    registry: &SchemaRegistry,
    def: &TypeDef,
    name: &str,
    object: &Map<String, Value>,
    schemaless: bool,
    namespace: Option<&str>,
) -> EngineResult<()> {
    let mut start = BytesStart::new(name);
    if let Some(ns) = namespace {
        start.push_attribute(("xmlns", ns));
    }
    for field in def.fields.iter().filter(|f| f.xml_attribute) {
        if let Some(text) = object.get(field.name).and_then(primitive::to_text) {
            start.push_attribute((field.name, text.as_str()));
        }
    }

    let typed: Vec<(&FieldDef, &Value)> = def
        .fields
        .iter()
        .filter(|f| !f.xml_attribute)
        .filter_map(|f| object.get(f.name).map(|v| (f, v)))
        .collect();
    let untyped: Vec<(&String, &Value)> = if schemaless {
        object
            .iter()
            .filter(|(key, _)| key.as_str() != "resourceType" && def.field(key).is_none())
            .collect()
    } else {
        Vec::new()
    };

    if typed.is_empty() && untyped.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for (field, value) in typed {
        match value {
            Value::Array(items) => {
                for item in items {
                    write_field(writer, registry, field, item)?;
                }
            }
            single => write_field(writer, registry, field, single)?,
        }
    }
    for (key, value) in untyped {
        write_untyped(writer, key, value)?;
    }
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn write_field(
    writer: &mut XmlWriter,
    registry: &SchemaRegistry,
    field: &FieldDef,
    value: &Value,
) -> EngineResult<()> {
    match field.kind {
        FieldKind::Primitive(_) => {
            let text = primitive::to_text(value).ok_or_else(|| {
                EngineError::internal(format!("element '{}' holds a non-primitive value", field.name))
            })?;
            let mut start = BytesStart::new(field.name);
            start.push_attribute(("value", text.as_str()));
            emit(writer, Event::Empty(start))
        }
        FieldKind::Complex(type_name) => {
            let object = value.as_object().ok_or_else(|| {
                EngineError::internal(format!("element '{}' is not an object", field.name))
            })?;
            let def = registry.complex(type_name)?;
            write_element(writer, registry, def, field.name, object, false, None)
        }
        FieldKind::Resource => {
            let object = value.as_object().ok_or_else(|| {
                EngineError::internal(format!("element '{}' is not a resource", field.name))
            })?;
            emit(writer, Event::Start(BytesStart::new(field.name)))?;
            write_resource(writer, registry, object, None)?;
            emit(writer, Event::End(BytesEnd::new(field.name)))
        }
        FieldKind::Xhtml => {
            let markup = value.as_str().ok_or_else(|| {
                EngineError::internal(format!("element '{}' is not markup", field.name))
            })?;
            emit(writer, Event::Text(BytesText::from_escaped(markup)))
        }
    }
}

/// Writes content of resource types outside the registry.
///
/// Inside datatypes, `id` and `url` strings become attributes.
fn write_untyped(writer: &mut XmlWriter, name: &str, value: &Value) -> EngineResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                write_untyped(writer, name, item)?;
            }
            Ok(())
        }
        Value::String(markup) if name == "div" && check_xhtml(markup).is_ok() => {
            emit(writer, Event::Text(BytesText::from_escaped(markup.as_str())))
        }
        Value::Object(object) => {
            if let Some(resource_type) = object.get("resourceType").and_then(Value::as_str) {
                emit(writer, Event::Start(BytesStart::new(name)))?;
                emit(writer, Event::Start(BytesStart::new(resource_type)))?;
                for (key, member) in object.iter().filter(|(k, _)| k.as_str() != "resourceType") {
                    write_untyped(writer, key, member)?;
                }
                emit(writer, Event::End(BytesEnd::new(resource_type)))?;
                return emit(writer, Event::End(BytesEnd::new(name)));
            }

            let mut start = BytesStart::new(name);
            let mut children = Vec::new();
            for (key, member) in object {
                match (key.as_str(), member) {
                    ("id" | "url", Value::String(text)) => {
                        start.push_attribute((key.as_str(), text.as_str()))
                    }
                    _ => children.push((key, member)),
                }
            }
            if children.is_empty() {
                return emit(writer, Event::Empty(start));
            }
            emit(writer, Event::Start(start))?;
            for (key, member) in children {
                write_untyped(writer, key, member)?;
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        scalar => {
            let text = primitive::to_text(scalar).unwrap_or_default();
            let mut start = BytesStart::new(name);
            start.push_attribute(("value", text.as_str()));
            emit(writer, Event::Empty(start))
        }
    }
}
