//! Validation endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use fhirgate_core::{FhirVersion, ResourceFormat, ValidationRequest, ValidationResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::require_content;
use crate::{
    error::{Result, ServerError},
    state::AppState,
};

/// Create validation routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/validate", post(validate_resource))
        .route("/validate/json", post(validate_json))
        .route("/validate/xml", post(validate_xml))
        .route("/version", get(version))
}

/// Validate a resource given as a JSON request object
async fn validate_resource(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ValidationRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>> {
    let Json(request) = payload?;
    require_content(&request.resource_content)?;

    tracing::info!(content_type = %request.content_type, "Validating FHIR resource");

    Ok(Json(state.services.validation.validate(&request).await))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValidationParams {
    fhir_version: Option<String>,
    profile_url: Option<String>,
    strict: Option<bool>,
}

impl RawValidationParams {
    fn into_request(self, content: String, format: ResourceFormat) -> Result<ValidationRequest> {
        let mut request = ValidationRequest::new(content, format);
        if let Some(version) = self.fhir_version.filter(|v| !v.trim().is_empty()) {
            let version = version.parse::<FhirVersion>().map_err(ServerError::BadRequest)?;
            request.version_override = Some(version);
        }
        request.profile_url = self.profile_url;
        request.strict_override = self.strict;
        Ok(request)
    }
}

async fn validate_raw(
    state: &AppState,
    params: std::result::Result<Query<RawValidationParams>, QueryRejection>,
    body: String,
    format: ResourceFormat,
) -> Result<Json<ValidationResult>> {
    let Query(params) = params?;
    require_content(&body)?;
    let request = params.into_request(body, format)?;
    Ok(Json(state.services.validation.validate(&request).await))
}

/// Validate a raw FHIR JSON body
async fn validate_json(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<RawValidationParams>, QueryRejection>,
    body: String,
) -> Result<Json<ValidationResult>> {
    validate_raw(&state, params, body, ResourceFormat::Json).await
}

/// Validate a raw FHIR XML body
async fn validate_xml(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<RawValidationParams>, QueryRejection>,
    body: String,
) -> Result<Json<ValidationResult>> {
    validate_raw(&state, params, body, ResourceFormat::Xml).await
}

async fn version(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "fhirVersion": state.services.validation.current_fhir_version(),
        "supportedVersions": FhirVersion::ALL,
    }))
}
