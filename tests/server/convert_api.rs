use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{POLL_MAX_ATTEMPTS, spawn_app, spawn_app_unconfigured};

fn job_created_response(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(serde_json::json!({
        "data": {"id": id, "status": "waiting", "tasks": []}
    }))
}

fn job_status_response(id: &str, status: &str, tasks: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "data": {"id": id, "status": status, "tasks": tasks}
    }))
}

fn convert_payload() -> serde_json::Value {
    serde_json::json!({
        "fileName": "report.docx",
        "targetFormat": "pdf",
        "fileContent": "aGVsbG8gd29ybGQ="
    })
}

#[tokio::test]
async fn finished_job_returns_download_url() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/jobs"))
        .respond_with(job_created_response("job-1"))
        .mount(&app.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/jobs/job-1"))
        .respond_with(job_status_response(
            "job-1",
            "finished",
            serde_json::json!([
                {"operation": "import/base64", "status": "finished"},
                {"operation": "convert", "status": "finished"},
                {
                    "operation": "export/url",
                    "status": "finished",
                    "result": {"files": [{"url": "https://files.example.com/report.pdf"}]}
                }
            ]),
        ))
        .mount(&app.mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.api_url("/convert"))
        .json(&convert_payload())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["downloadUrl"], "https://files.example.com/report.pdf");
    assert_eq!(body["fileName"], "report.pdf");
}

#[tokio::test]
async fn errored_job_surfaces_provider_message() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/jobs"))
        .respond_with(job_created_response("job-2"))
        .mount(&app.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/jobs/job-2"))
        .respond_with(job_status_response(
            "job-2",
            "error",
            serde_json::json!([
                {"operation": "convert", "status": "error", "message": "unsupported format"}
            ]),
        ))
        .mount(&app.mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.api_url("/convert"))
        .json(&convert_payload())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("unsupported format"));
}

#[tokio::test]
async fn non_terminal_job_times_out_after_exactly_max_attempts() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/jobs"))
        .respond_with(job_created_response("job-3"))
        .mount(&app.mock_server)
        .await;

    // The status endpoint must be queried exactly POLL_MAX_ATTEMPTS times;
    // the expectation is verified when the mock server drops.
    Mock::given(method("GET"))
        .and(path("/v2/jobs/job-3"))
        .respond_with(job_status_response(
            "job-3",
            "processing",
            serde_json::json!([]),
        ))
        .expect(u64::from(POLL_MAX_ATTEMPTS))
        .mount(&app.mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.api_url("/convert"))
        .json(&convert_payload())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("did not finish"));
}

#[tokio::test]
async fn rejected_job_creation_fails_the_request() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/jobs"))
        .respond_with(ResponseTemplate::new(422).set_body_string("missing tasks"))
        .mount(&app.mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.api_url("/convert"))
        .json(&convert_payload())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("422"));
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.api_url("/convert"))
        .json(&serde_json::json!({
            "fileName": "",
            "targetFormat": "pdf",
            "fileContent": "aGVsbG8="
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn missing_conversion_configuration_returns_500() {
    let app = spawn_app_unconfigured().await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.api_url("/convert"))
        .json(&convert_payload())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "configuration missing");
}
