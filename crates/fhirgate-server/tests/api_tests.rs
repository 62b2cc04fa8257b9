use axum::http::StatusCode;
use axum_test::TestServer;
use fhirgate_server::{Server, ServerConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const PATIENT: &str = r#"{"resourceType":"Patient","id":"p1","name":[{"family":"Smith","given":["John"]}],"gender":"male","birthDate":"1990-05-15"}"#;

const XML_PATIENT: &str = r#"<Patient xmlns="http://hl7.org/fhir"><id value="p1"/><gender value="female"/></Patient>"#;

fn test_server() -> TestServer {
    test_server_with(ServerConfig::default())
}

fn test_server_with(config: ServerConfig) -> TestServer {
    let server = Server::new(config).unwrap();
    TestServer::new(server.router()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = test_server().get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_info_reports_options() {
    let response = test_server().get("/api/v1/info").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["fhirVersion"], "R4");
    assert_eq!(body["supportedVersions"], json!(["R4", "R5"]));
    assert_eq!(body["validateOnParse"], true);
    assert_eq!(body["timeoutSeconds"], 30);
}

#[tokio::test]
async fn test_parse_success() {
    let response = test_server()
        .post("/api/v1/parser/parse")
        .json(&json!({ "resourceContent": PATIENT }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["resourceType"], "Patient");
    assert_eq!(body["resourceId"], "p1");
    assert_eq!(body["fhirVersion"], "R4");
    assert_eq!(body["metadata"]["name"], "John Smith");
    assert_eq!(body["metadata"]["versionId"], Value::Null);
}

#[tokio::test]
async fn test_parse_failure_is_bad_request_with_result() {
    let response = test_server()
        .post("/api/v1/parser/parse")
        .json(&json!({
            "resourceContent": "{\"resourceType\": \"Patient\", \"id\": ",
            "fhirVersionOverride": "R5"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["fhirVersion"], "R5");
    assert!(body["errorMessage"].as_str().unwrap().starts_with("Invalid JSON"));
    assert_eq!(body["serializedResource"], Value::Null);
}

#[tokio::test]
async fn test_empty_content_rejected() {
    let server = test_server();

    let response = server
        .post("/api/v1/parser/parse")
        .json(&json!({ "resourceContent": "  " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "BAD_REQUEST");

    let response = server
        .post("/api/v1/validation/validate")
        .json(&json!({ "resourceContent": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.post("/api/v1/validation/validate/json").text("").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_version_rejected() {
    let server = test_server();

    let response = server
        .post("/api/v1/validation/validate")
        .json(&json!({ "resourceContent": PATIENT, "fhirVersionOverride": "STU3" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/validation/validate/json")
        .add_query_param("fhirVersion", "STU3")
        .text(PATIENT)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_convert_json_to_xml() {
    let response = test_server()
        .post("/api/v1/parser/convert")
        .add_query_param("fromFormat", "json")
        .add_query_param("toFormat", "xml")
        .text(PATIENT)
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/fhir+xml");
    assert!(response.text().contains("<family value=\"Smith\"/>"));
}

#[tokio::test]
async fn test_convert_same_format_echoes_body() {
    let response = test_server()
        .post("/api/v1/parser/convert")
        .add_query_param("fromFormat", "XML")
        .add_query_param("toFormat", "xml")
        .text("<not-even-fhir")
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<not-even-fhir");
}

#[tokio::test]
async fn test_convert_failure_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/api/v1/parser/convert")
        .add_query_param("fromFormat", "json")
        .add_query_param("toFormat", "xml")
        .text("{ broken")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "CONVERSION_ERROR");

    let response = server
        .post("/api/v1/parser/convert")
        .add_query_param("fromFormat", "json")
        .text(PATIENT)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_request_object() {
    let response = test_server()
        .post("/api/v1/validation/validate")
        .json(&json!({
            "resourceContent": r#"{"resourceType":"Patient","birthDate":"not-a-date"}"#
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["isValid"], false);
    assert_eq!(body["errors"][0]["severity"], "error");
    assert_eq!(body["errors"][0]["code"], "invalid");
    assert!(body["durationMs"].as_u64().is_some());
}

#[tokio::test]
async fn test_validate_raw_xml_with_profile() {
    let response = test_server()
        .post("/api/v1/validation/validate/xml")
        .add_query_param("fhirVersion", "r5")
        .add_query_param("profileUrl", "http://example.org/fhir/StructureDefinition/p")
        .text(XML_PATIENT)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["isValid"], true);
    assert_eq!(body["fhirVersion"], "R5");
    assert_eq!(body["resourceType"], "Patient");
    assert_eq!(body["warnings"][0]["code"], "not-supported");
}

#[tokio::test]
async fn test_version_endpoint() {
    let mut config = ServerConfig::default();
    config.fhir.version = fhirgate_core::FhirVersion::R5;

    let response = test_server_with(config).get("/api/v1/validation/version").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "fhirVersion": "R5", "supportedVersions": ["R4", "R5"] })
    );
}
