//! Mock webhook server for testing notification delivery
//!
//! This simulates a webhook endpoint that receives notifications,
//! allowing tests to verify what the engine pushed.

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock webhook server that records notification requests
pub struct MockWebhookServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockWebhookServer {
    /// Create a new mock webhook server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Mock successful webhook delivery
    pub async fn mock_success(&self) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    /// Mock webhook failure
    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    /// Bodies of all received notifications
    pub async fn get_captured_requests(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| request.body_json::<Value>().ok())
            .collect()
    }

    /// Get the number of webhook requests received
    pub async fn request_count(&self) -> usize {
        self.get_captured_requests().await.len()
    }

    /// Get the webhook URL
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.base_url)
    }

    /// Verify that a notification of `kind` was sent with a message containing `text`
    pub async fn assert_notification_sent(&self, kind: &str, text: &str) -> bool {
        self.get_captured_requests().await.iter().any(|body| {
            let kind_matches = body.get("kind").and_then(|v| v.as_str()) == Some(kind);
            let message_matches = body
                .get("message")
                .and_then(|v| v.as_str())
                .map(|v| v.contains(text))
                .unwrap_or(false);
            kind_matches && message_matches
        })
    }
}
