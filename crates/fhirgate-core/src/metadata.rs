//! Normalized metadata projection of a parsed resource
//!
//! The projection is an allow-list: base keys for every resource plus a few
//! type-specific keys for Patient and Observation. Every key is present and
//! reads `null` when the resource omits the value.

use fhirgate_engine::Resource;
use indexmap::IndexMap;

pub type Metadata = IndexMap<String, Option<String>>;

pub fn extract(resource: &Resource) -> Metadata {
    let mut metadata = Metadata::new();
    insert(&mut metadata, "id", resource.id());
    insert(&mut metadata, "resourceType", Some(resource.resource_type()));
    insert(&mut metadata, "versionId", resource.version_id());
    insert(&mut metadata, "lastUpdated", resource.last_updated());

    if let Some(patient) = resource.as_patient() {
        metadata.insert("name".to_string(), patient.name());
        insert(&mut metadata, "birthDate", patient.birth_date());
        insert(&mut metadata, "gender", patient.gender());
    } else if let Some(observation) = resource.as_observation() {
        insert(&mut metadata, "status", observation.status());
        insert(&mut metadata, "code", observation.code_display());
    }

    metadata
}

fn insert(metadata: &mut Metadata, key: &str, value: Option<&str>) {
    metadata.insert(key.to_string(), value.map(str::to_string));
}
