//! Server info endpoints

use axum::{extract::State, response::Json};
use fhirgate_core::{FhirVersion, ResourceFormat};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Server information endpoint
pub async fn server_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    let fhir = &state.config.fhir;
    Json(json!({
        "name": "fhirgate-server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "FHIR parsing, validation and conversion",
        "fhirVersion": fhir.version,
        "supportedVersions": FhirVersion::ALL,
        "supportedFormats": ResourceFormat::ALL.map(|f| f.mime_type()),
        "strictValidation": fhir.strict_validation,
        "validateOnParse": fhir.validate_on_parse,
        "serverBaseUrl": fhir.server_base_url,
        "timeoutSeconds": fhir.timeout_seconds,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
