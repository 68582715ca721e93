// Integration tests: HTTP endpoints

use axum::http::StatusCode;
use axum_test::TestServer;
use cloud_insights::cloud_repo::demo::DemoProvider;
use cloud_insights::config::AppConfig;
use cloud_insights::routes;
use cloud_insights::service::ReportService;
use serde_json::json;
use std::sync::Arc;

const TEST_CONFIG: &str = r#"
[server]
port = 5000
host = "127.0.0.1"

[report]
period_secs = 3600

[provider]
regions = ["us-east-1", "us-west-2", "eu-west-1"]

[catalog]
version = 1

[[catalog.metrics]]
name = "CPUUtilization"
namespace = "AWS/EC2"
unit = "%"

[[catalog.metrics]]
name = "MemoryUtilization"
namespace = "CWAgent"
unit = "%"
"#;

fn test_server() -> TestServer {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let provider = Arc::new(DemoProvider::new(config.provider.regions.clone()));
    let service = Arc::new(ReportService::new(
        provider,
        Arc::new(config.catalog.clone()),
        &config.report,
    ));
    TestServer::try_new(routes::app(service)).unwrap()
}

fn credentials() -> serde_json::Value {
    json!({
        "accessKeyId": "AKIATEST",
        "secretAccessKey": "secret",
        "accountName": "Acme Prod",
        "accountId": "123456789012"
    })
}

fn report_body(instances: serde_json::Value, frequency: &str) -> serde_json::Value {
    json!({
        "provider": "aws",
        "credentials": credentials(),
        "selected_instances": instances,
        "frequency": frequency
    })
}

fn web_server() -> serde_json::Value {
    json!({
        "id": "i-0123456789abcdef0",
        "name": "Production Web Server",
        "type": "t3.medium",
        "state": "running",
        "region": "us-west-2",
        "selected": true
    })
}

#[tokio::test]
async fn test_root_returns_banner() {
    let server = test_server();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().starts_with("cloud-insights "));
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = test_server();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["name"], "cloud-insights");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_validate_credentials_ok() {
    let server = test_server();
    let response = server
        .post("/validate-credentials")
        .json(&credentials())
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "success");
}

#[tokio::test]
async fn test_validate_credentials_rejects_empty_secret() {
    let server = test_server();
    let response = server
        .post("/validate-credentials")
        .json(&json!({"accessKeyId": "AKIATEST", "secretAccessKey": ""}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "AuthError");
}

#[tokio::test]
async fn test_instances_lists_configured_regions() {
    let server = test_server();
    let response = server.post("/instances").json(&credentials()).await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    let compute = json["computeInstances"].as_array().unwrap();
    assert_eq!(compute.len(), 3);
    assert!(compute.iter().all(|i| i["state"] != "terminated"));
    assert_eq!(json["managedDbInstances"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_generate_report_returns_pdf_attachment() {
    let server = test_server();
    let response = server
        .post("/generate-report")
        .json(&report_body(json!([web_server()]), "weekly"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    let disposition = response.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Acme-Prod-weekly-"));
    assert!(disposition.ends_with(".pdf\""));
    assert!(response.as_bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_generate_report_rejects_empty_selection() {
    let server = test_server();
    let response = server
        .post("/generate-report")
        .json(&report_body(json!([]), "daily"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "EmptySelection");
}

#[tokio::test]
async fn test_generate_report_rejects_unknown_frequency() {
    let server = test_server();
    let response = server
        .post("/generate-report")
        .json(&report_body(json!([web_server()]), "yearly"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "InvalidFrequency");
}

#[tokio::test]
async fn test_generate_report_rejects_bad_credentials() {
    let server = test_server();
    let mut body = report_body(json!([web_server()]), "daily");
    body["credentials"]["secretAccessKey"] = json!("");
    let response = server.post("/generate-report").json(&body).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_report_rejects_instance_missing_field() {
    let server = test_server();
    let mut instance = web_server();
    instance.as_object_mut().unwrap().remove("region");
    let response = server
        .post("/generate-report")
        .json(&report_body(json!([instance]), "daily"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "InvalidRequest");
    assert!(json["detail"].as_str().unwrap().contains("region"));
}

#[tokio::test]
async fn test_instances_rejects_non_json_body() {
    let server = test_server();
    let response = server.post("/instances").text("not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "InvalidRequest");
}
