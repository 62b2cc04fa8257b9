//! Parsing and conversion endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use fhirgate_core::{ParseRequest, ResourceFormat};
use serde::Deserialize;
use std::sync::Arc;

use super::require_content;
use crate::{
    error::{Result, ServerError},
    state::AppState,
};

/// Create parser routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/parse", post(parse_resource))
        .route("/convert", post(convert_format))
}

/// Parse a resource; a resource that fails to parse is a 400 carrying the
/// parse result
async fn parse_resource(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    require_content(&request.resource_content)?;

    tracing::info!(content_type = %request.content_type, "Parsing FHIR resource");

    let result = state.services.parser.parse(&request).await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(result)).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertParams {
    from_format: Option<String>,
    to_format: Option<String>,
}

/// Convert the raw request body between json and xml
async fn convert_format(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<ConvertParams>, QueryRejection>,
    body: String,
) -> Result<Response> {
    let Query(params) = params?;
    let (Some(from), Some(to)) = (
        params.from_format.filter(|f| !f.trim().is_empty()),
        params.to_format.filter(|f| !f.trim().is_empty()),
    ) else {
        return Err(ServerError::BadRequest(
            "Both fromFormat and toFormat query parameters are required".to_string(),
        ));
    };
    require_content(&body)?;

    let converted = state
        .services
        .parser
        .convert_format(&body, &from, &to)
        .await?;

    let content_type = if to.eq_ignore_ascii_case("json") {
        ResourceFormat::Json.mime_type()
    } else {
        ResourceFormat::Xml.mime_type()
    };
    Ok(([(header::CONTENT_TYPE, content_type)], converted).into_response())
}
