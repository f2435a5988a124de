use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use uplift::application::routes::app_router;
use uplift::application::state::{AppState, AppStateConfig};
use uplift::domain::content::default_categories;
use uplift::domain::repositories::ContentRepository;
use uplift::infrastructure::convert::ConversionClient;
use uplift::infrastructure::database::Database;
use uplift::infrastructure::generator::Provider;
use wiremock::ResponseTemplate;

pub const POLL_MAX_ATTEMPTS: u32 = 3;

pub struct TestApp {
    pub address: String,
    pub content_repo: Arc<dyn ContentRepository>,
    pub mock_server: wiremock::MockServer,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Provider::Mistral).await
}

pub async fn spawn_app_with(provider: Provider) -> TestApp {
    let mock_server = wiremock::MockServer::start().await;
    let http_client = reqwest::Client::new();

    let config = AppStateConfig {
        generator: Some(provider.build(
            http_client.clone(),
            mock_server.uri(),
            "test-key".to_string(),
            "test-model".to_string(),
        )),
        categories: default_categories(chrono::Duration::hours(24)),
        converter: Some(ConversionClient::new(
            http_client,
            mock_server.uri(),
            "test-key".to_string(),
        )),
        poll_interval: Duration::from_millis(20),
        poll_max_attempts: POLL_MAX_ATTEMPTS,
    };

    spawn_app_inner(config, mock_server).await
}

/// An app with no provider or conversion credentials configured.
pub async fn spawn_app_unconfigured() -> TestApp {
    let mock_server = wiremock::MockServer::start().await;

    let config = AppStateConfig {
        generator: None,
        categories: default_categories(chrono::Duration::hours(24)),
        converter: None,
        poll_interval: Duration::from_millis(20),
        poll_max_attempts: POLL_MAX_ATTEMPTS,
    };

    spawn_app_inner(config, mock_server).await
}

async fn spawn_app_inner(config: AppStateConfig, mock_server: wiremock::MockServer) -> TestApp {
    let database = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    let state = AppState::from_database(&database, config);
    let content_repo = state.content_repo.clone();

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        content_repo,
        mock_server,
        server_handle,
    }
}

/// A Mistral-shaped chat-completions response carrying `content`.
pub fn chat_response(content: &str) -> ResponseTemplate {
    let body = serde_json::json!({
        "id": "cmpl-test",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }]
    });
    ResponseTemplate::new(200).set_body_json(body)
}

/// A Gemini-shaped generateContent response carrying `content`.
pub fn gemini_response(content: &str) -> ResponseTemplate {
    let body = serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{"text": content}],
                "role": "model"
            },
            "finishReason": "STOP"
        }]
    });
    ResponseTemplate::new(200).set_body_json(body)
}
