//! Lexical rules for FHIR primitive datatypes
//!
//! Values arrive either as JSON scalars or as XML `value` attributes. Both are
//! normalized to the JSON representation FHIR prescribes: booleans and numbers
//! for the numeric types, strings for everything else.

use chrono::{DateTime, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::schema::PrimitiveType;

static ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").unwrap());
static CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s]+( [^\s]+)*$").unwrap());
static URI_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+$").unwrap());
static BASE64_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").unwrap());
static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?(0|[1-9][0-9]*)$").unwrap());
static DECIMAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap());
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12][0-9]|3[01]))?)?$").unwrap());
static DATE_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12][0-9]|3[01])(T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?(Z|[+-]((0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$",
    )
    .unwrap()
});
static TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?$").unwrap());

/// A JSON value accepted for a primitive slot
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JsonPrimitive {
    /// Already in the prescribed representation
    Exact(Value),
    /// Converted from another scalar; carries a description of the conversion
    Coerced(Value, String),
}

/// Check the lexical form of a primitive held as text
pub(crate) fn check_lexical(ty: PrimitiveType, text: &str) -> Result<(), String> {
    let ok = match ty {
        PrimitiveType::String | PrimitiveType::Markdown => true,
        PrimitiveType::Boolean => text == "true" || text == "false",
        PrimitiveType::Integer | PrimitiveType::PositiveInt | PrimitiveType::UnsignedInt => {
            return parse_integer(ty, text).map(|_| ());
        }
        PrimitiveType::Decimal => DECIMAL_REGEX.is_match(text),
        PrimitiveType::Code => CODE_REGEX.is_match(text),
        PrimitiveType::Id => ID_REGEX.is_match(text),
        PrimitiveType::Uri | PrimitiveType::Url | PrimitiveType::Canonical => {
            URI_REGEX.is_match(text)
        }
        PrimitiveType::Base64Binary => {
            let compact: String = text.split_whitespace().collect();
            BASE64_REGEX.is_match(&compact) && compact.len() % 4 == 0
        }
        PrimitiveType::Date => DATE_REGEX.is_match(text) && full_date_exists(text),
        PrimitiveType::DateTime => {
            DATE_TIME_REGEX.is_match(text)
                && full_date_exists(&text[..text.len().min(10)])
                && (!text.contains('T') || DateTime::parse_from_rfc3339(text).is_ok())
        }
        PrimitiveType::Instant => {
            text.len() > 10 && text.contains('T') && DateTime::parse_from_rfc3339(text).is_ok()
        }
        PrimitiveType::Time => {
            TIME_REGEX.is_match(text) && NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_ok()
        }
    };

    if ok {
        Ok(())
    } else {
        Err(format!("Invalid {} value '{}'", ty.name(), text))
    }
}

/// Read a JSON scalar into a primitive slot.
///
/// Scalars of the wrong JSON kind are converted when the conversion is
/// lossless (`"true"` for a boolean, `42` for a string); anything else is an
/// error message for the caller to locate.
pub(crate) fn from_json(ty: PrimitiveType, value: &Value) -> Result<JsonPrimitive, String> {
    match (ty, value) {
        (PrimitiveType::Boolean, Value::Bool(_)) => Ok(JsonPrimitive::Exact(value.clone())),
        (PrimitiveType::Boolean, Value::String(s)) if s == "true" || s == "false" => Ok(
            JsonPrimitive::Coerced(Value::Bool(s == "true"), coerced_message(ty, "string")),
        ),

        (
            PrimitiveType::Integer | PrimitiveType::PositiveInt | PrimitiveType::UnsignedInt,
            Value::Number(n),
        ) => match n.as_i64() {
            Some(_) => {
                parse_integer(ty, &n.to_string())?;
                Ok(JsonPrimitive::Exact(value.clone()))
            }
            None => Err(format!("Invalid {} value '{}'", ty.name(), n)),
        },
        (
            PrimitiveType::Integer | PrimitiveType::PositiveInt | PrimitiveType::UnsignedInt,
            Value::String(s),
        ) => {
            let parsed = parse_integer(ty, s)?;
            Ok(JsonPrimitive::Coerced(
                Value::from(parsed),
                coerced_message(ty, "string"),
            ))
        }

        (PrimitiveType::Decimal, Value::Number(_)) => Ok(JsonPrimitive::Exact(value.clone())),
        (PrimitiveType::Decimal, Value::String(s)) => {
            let parsed = parse_decimal(s)?;
            Ok(JsonPrimitive::Coerced(
                Value::Number(parsed),
                coerced_message(ty, "string"),
            ))
        }

        (_, Value::String(s)) if ty.is_string_like() => {
            check_lexical(ty, s)?;
            Ok(JsonPrimitive::Exact(value.clone()))
        }
        (_, Value::Number(_) | Value::Bool(_)) if ty.is_string_like() => {
            let text = value.to_string();
            check_lexical(ty, &text)?;
            let found = if value.is_number() { "number" } else { "boolean" };
            Ok(JsonPrimitive::Coerced(
                Value::String(text),
                coerced_message(ty, found),
            ))
        }

        (_, Value::Object(_)) => Err(format!("Expected a {} value, found an object", ty.name())),
        (_, Value::Array(_)) => Err(format!("Expected a {} value, found an array", ty.name())),
        _ => Err(format!("Invalid {} value {}", ty.name(), value)),
    }
}

/// Read the text of an XML `value` attribute into its JSON representation
pub(crate) fn from_text(ty: PrimitiveType, text: &str) -> Result<Value, String> {
    match ty {
        PrimitiveType::Boolean => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("Invalid boolean value '{}'", text)),
        },
        PrimitiveType::Integer | PrimitiveType::PositiveInt | PrimitiveType::UnsignedInt => {
            parse_integer(ty, text).map(Value::from)
        }
        PrimitiveType::Decimal => parse_decimal(text).map(Value::Number),
        _ => {
            check_lexical(ty, text)?;
            Ok(Value::String(text.to_string()))
        }
    }
}

/// Text form of a primitive for an XML attribute
pub(crate) fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_integer(ty: PrimitiveType, text: &str) -> Result<i64, String> {
    let invalid = || format!("Invalid {} value '{}'", ty.name(), text);
    if !INTEGER_REGEX.is_match(text) {
        return Err(invalid());
    }
    let parsed: i64 = text.parse().map_err(|_| invalid())?;
    let in_range = match ty {
        PrimitiveType::PositiveInt => (1..=i32::MAX as i64).contains(&parsed),
        PrimitiveType::UnsignedInt => (0..=i32::MAX as i64).contains(&parsed),
        _ => (i32::MIN as i64..=i32::MAX as i64).contains(&parsed),
    };
    if in_range {
        Ok(parsed)
    } else {
        Err(format!("{} value {} is out of range", ty.name(), parsed))
    }
}

fn parse_decimal(text: &str) -> Result<Number, String> {
    if !DECIMAL_REGEX.is_match(text) {
        return Err(format!("Invalid decimal value '{}'", text));
    }
    text.parse::<Number>()
        .map_err(|_| format!("Invalid decimal value '{}'", text))
}

/// Partial dates are accepted; a full `YYYY-MM-DD` must name a real day
fn full_date_exists(text: &str) -> bool {
    text.len() != 10 || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

fn coerced_message(ty: PrimitiveType, found: &str) -> String {
    format!("Converted a JSON {} to {}", found, ty.name())
}
