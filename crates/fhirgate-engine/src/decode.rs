//! State shared by the JSON and XML readers

use serde_json::Value;

use crate::error::{EngineResult, FormatError};
use crate::resource::{NoticeKind, ParseMode, ParseNotice};
use crate::schema::{FieldDef, SchemaRegistry, TypeDef};

pub(crate) struct DecodeContext<'a> {
    pub registry: &'a SchemaRegistry,
    mode: ParseMode,
    notices: Vec<ParseNotice>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a SchemaRegistry, mode: ParseMode) -> Self {
        Self {
            registry,
            mode,
            notices: Vec::new(),
        }
    }

    /// Accept a deviation in lenient mode, reject it in strict mode
    pub fn tolerate(
        &mut self,
        path: &str,
        kind: NoticeKind,
        message: impl Into<String>,
    ) -> EngineResult<()> {
        let message = message.into();
        if self.mode.is_strict() {
            return Err(FormatError::at(path, message).into());
        }

        tracing::debug!(path = %path, kind = %kind, "Tolerated: {}", message);
        self.notices.push(ParseNotice {
            path: path.to_string(),
            kind,
            message,
        });
        Ok(())
    }

    /// Required-binding check for a decoded primitive
    pub fn check_code(&mut self, field: &FieldDef, value: &Value, path: &str) -> EngineResult<()> {
        if let (Some(codes), Some(code)) = (field.codes, value.as_str()) {
            if !codes.contains(&code) {
                self.tolerate(
                    path,
                    NoticeKind::UnknownCode,
                    format!(
                        "Unknown code '{}', expected one of: {}",
                        code,
                        codes.join(", ")
                    ),
                )?;
            }
        }
        Ok(())
    }

    /// Type definition for a resource name, falling back to the base resource
    /// elements for types outside the registry.
    ///
    /// Returns the definition and whether it is the fallback.
    pub fn resource_def(&mut self, resource_type: &str, path: &str) -> EngineResult<(&'a TypeDef, bool)> {
        let registry = self.registry;
        match registry.resource(resource_type) {
            Some(def) => Ok((def, false)),
            None => {
                self.tolerate(
                    path,
                    NoticeKind::UnknownResourceType,
                    format!(
                        "Resource type '{}' is not modelled for FHIR {}; only base resource elements are type-checked",
                        resource_type,
                        registry.version()
                    ),
                )?;
                Ok((registry.base_resource(), true))
            }
        }
    }

    pub fn into_notices(self) -> Vec<ParseNotice> {
        self.notices
    }
}

pub(crate) fn indexed(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

pub(crate) fn child(path: &str, name: &str) -> String {
    format!("{}.{}", path, name)
}

/// Resource type names start with an upper-case letter
pub(crate) fn is_resource_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
