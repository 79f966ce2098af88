use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::models::{ContentPayload, UserId};

/// Errors from the outbound transport. Never retried here; the wire's
/// retry story belongs to the transport service itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transport returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Outbound side of the transport layer: plain notifications and relayed
/// chat payloads. The engine only ever sees this seam.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a service message (match found, partner left, ...) to a user.
    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), TransportError>;

    /// Deliver relayed chat content to a user.
    async fn deliver(&self, user_id: UserId, payload: &ContentPayload)
        -> Result<(), TransportError>;
}

/// Webhook-backed transport client.
///
/// POSTs JSON to `{base_url}/notify` and `{base_url}/deliver`; the chat
/// platform adapter on the other end turns these into real messages.
pub struct WebhookTransport {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl WebhookTransport {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            token,
            client,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), TransportError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), TransportError> {
        self.post(
            "notify",
            serde_json::json!({ "user_id": user_id, "text": text }),
        )
        .await
    }

    async fn deliver(
        &self,
        user_id: UserId,
        payload: &ContentPayload,
    ) -> Result<(), TransportError> {
        self.post(
            "deliver",
            serde_json::json!({ "user_id": user_id, "payload": payload }),
        )
        .await
    }
}

/// Forwards chat content from a sender to their resolved partner.
///
/// Fire-and-forget from the engine's perspective: a failure is logged and
/// reported to the acting user, never retried, and never rolls back the
/// pairing it rode on.
#[derive(Clone)]
pub struct RelayDispatcher {
    transport: Arc<dyn Transport>,
}

impl RelayDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn forward(
        &self,
        sender: UserId,
        partner: UserId,
        payload: &ContentPayload,
    ) -> Result<(), TransportError> {
        if let Err(e) = self.transport.deliver(partner, payload).await {
            tracing::warn!(sender = %sender, partner = %partner, error = %e, "failed to forward content");
            return Err(e);
        }
        tracing::debug!(sender = %sender, partner = %partner, "content forwarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_webhook_deliver_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/deliver")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let transport = WebhookTransport::new(server.url(), None);
        let payload = ContentPayload {
            text: Some("hello".to_string()),
            media: None,
            file_id: None,
            caption: None,
        };

        transport.deliver(UserId(42), &payload).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_surfaces_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/deliver")
            .with_status(502)
            .create_async()
            .await;

        let transport = Arc::new(WebhookTransport::new(server.url(), None));
        let dispatcher = RelayDispatcher::new(transport);
        let payload = ContentPayload {
            text: Some("hello".to_string()),
            media: None,
            file_id: None,
            caption: None,
        };

        let result = dispatcher.forward(UserId(1), UserId(2), &payload).await;
        assert!(matches!(result, Err(TransportError::Status(_))));
    }

    #[tokio::test]
    async fn test_notify_includes_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/notify")
            .match_header("authorization", "Bearer sekrit")
            .with_status(200)
            .create_async()
            .await;

        let transport = WebhookTransport::new(server.url(), Some("sekrit".to_string()));
        transport.notify(UserId(7), "partner found").await.unwrap();
        mock.assert_async().await;
    }
}
