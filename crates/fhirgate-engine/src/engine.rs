//! Version-bound entry point of the engine

use crate::error::EngineResult;
use crate::resource::{ParseMode, ParsedResource, Resource};
use crate::schema::SchemaRegistry;
use crate::{json, xml, FhirVersion, ResourceFormat};

/// Parses and serializes resources of one FHIR version in both encodings.
///
/// The engine holds only its immutable schema registry and can be shared
/// freely between threads; every call works on its own state.
#[derive(Debug)]
pub struct FhirEngine {
    registry: SchemaRegistry,
}

impl FhirEngine {
    /// Build the engine, checking that the version's registry is complete
    pub fn new(version: FhirVersion) -> EngineResult<Self> {
        let registry = SchemaRegistry::for_version(version)?;
        Ok(Self { registry })
    }

    pub fn version(&self) -> FhirVersion {
        self.registry.version()
    }

    pub fn parse(
        &self,
        content: &str,
        format: ResourceFormat,
        mode: ParseMode,
    ) -> EngineResult<ParsedResource> {
        let parsed = match format {
            ResourceFormat::Json => json::parse(&self.registry, content, mode)?,
            ResourceFormat::Xml => xml::parse(&self.registry, content, mode)?,
        };
        tracing::trace!(
            version = %self.version(),
            format = %format,
            resource_type = parsed.resource.resource_type(),
            notices = parsed.notices.len(),
            "Resource parsed"
        );
        Ok(parsed)
    }

    pub fn serialize(
        &self,
        resource: &Resource,
        format: ResourceFormat,
        pretty: bool,
    ) -> EngineResult<String> {
        match format {
            ResourceFormat::Json => json::serialize(resource, pretty),
            ResourceFormat::Xml => xml::serialize(&self.registry, resource, pretty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FhirEngine>();
    }

    #[test]
    fn test_json_to_xml_and_back() {
        let engine = FhirEngine::new(FhirVersion::R5).unwrap();
        let json = r#"{"resourceType":"Observation","id":"o1","status":"final","valueQuantity":{"value":72,"unit":"bpm"}}"#;
        let parsed = engine.parse(json, ResourceFormat::Json, ParseMode::Strict).unwrap();
        let xml = engine.serialize(&parsed.resource, ResourceFormat::Xml, false).unwrap();
        assert_eq!(
            xml,
            r#"<Observation xmlns="http://hl7.org/fhir"><id value="o1"/><status value="final"/><valueQuantity><value value="72"/><unit value="bpm"/></valueQuantity></Observation>"#
        );

        let back = engine.parse(&xml, ResourceFormat::Xml, ParseMode::Strict).unwrap();
        assert_eq!(back.resource, parsed.resource);
    }
}
