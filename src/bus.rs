//! Event-bus seam used to reach the out-of-process persistor.
//!
//! The messaging runtime itself is supplied by the host. This crate only
//! needs three capabilities from it: point-to-point `send`, fan-out
//! `publish`, and `request` with a single reply. [`LocalBus`] is an
//! in-process implementation of the same seam, used to wire a persistor
//! handler into the current process and to drive tests.

use futures::future::BoxFuture;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors surfaced by the event bus itself, as opposed to the persistor.
#[derive(Debug, Error)]
pub enum BusError {
    /// No reply arrived within the delivery timeout.
    #[error("reply timed out")]
    Timeout,

    /// No handler is registered at the target address.
    #[error("no handler registered at address: {0}")]
    NoHandler(String),

    /// The bus has been closed.
    #[error("bus closed")]
    Closed,

    /// The remote side failed the message with an error string.
    #[error("delivery failure: {0}")]
    Failure(String),
}

/// Per-message delivery tuning.
#[derive(Debug, Clone, Default)]
pub struct DeliveryOptions {
    /// How long to wait for a reply before failing with [`BusError::Timeout`].
    pub timeout: Option<Duration>,
    /// Headers forwarded alongside the message body.
    pub headers: HashMap<String, String>,
}

impl DeliveryOptions {
    /// Set the reply timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// The request/reply messaging facility used to reach the persistor.
///
/// Implementations must be cheap to share behind an [`Arc`]; the facade and
/// the logging decorator both hold `Arc<dyn EventBus>`.
#[async_trait::async_trait]
pub trait EventBus: Send + Sync {
    /// Send a message to `address` and wait for a single reply body.
    async fn request(
        &self,
        address: &str,
        message: JsonValue,
        options: DeliveryOptions,
    ) -> std::result::Result<JsonValue, BusError>;

    /// Send a message to `address` without waiting for a reply.
    async fn send(&self, address: &str, message: JsonValue) -> std::result::Result<(), BusError>;

    /// Publish a message to every subscriber of `address`.
    async fn publish(&self, address: &str, message: JsonValue)
        -> std::result::Result<(), BusError>;
}

type BusHandler = Arc<dyn Fn(JsonValue) -> BoxFuture<'static, JsonValue> + Send + Sync>;

/// In-process event bus with one handler per address.
///
/// Request dispatch invokes the registered handler and treats its return
/// value as the reply body. Sending to an address with no handler fails,
/// publishing to one is a no-op, mirroring the host runtime's local mode.
///
/// # Example
///
/// ```
/// use mongo_bus::bus::{DeliveryOptions, EventBus, LocalBus};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = LocalBus::new();
/// bus.register_handler("echo", |msg| async move { msg }).await;
///
/// let reply = bus
///     .request("echo", json!({"ping": 1}), DeliveryOptions::default())
///     .await
///     .unwrap();
/// assert_eq!(reply, json!({"ping": 1}));
/// # }
/// ```
#[derive(Default)]
pub struct LocalBus {
    handlers: RwLock<HashMap<String, BusHandler>>,
}

impl LocalBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reply handler for `address`, replacing any previous one.
    pub async fn register_handler<F, Fut>(&self, address: impl Into<String>, handler: F)
    where
        F: Fn(JsonValue) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = JsonValue> + Send + 'static,
    {
        let handler: BusHandler = Arc::new(move |msg| Box::pin(handler(msg)));
        self.handlers.write().await.insert(address.into(), handler);
    }

    /// Remove the handler for `address`.
    pub async fn unregister_handler(&self, address: &str) {
        self.handlers.write().await.remove(address);
    }

    async fn handler(&self, address: &str) -> Option<BusHandler> {
        self.handlers.read().await.get(address).cloned()
    }
}

#[async_trait::async_trait]
impl EventBus for LocalBus {
    async fn request(
        &self,
        address: &str,
        message: JsonValue,
        options: DeliveryOptions,
    ) -> std::result::Result<JsonValue, BusError> {
        let handler = self
            .handler(address)
            .await
            .ok_or_else(|| BusError::NoHandler(address.to_string()))?;

        let fut = handler(message);
        match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| BusError::Timeout),
            None => Ok(fut.await),
        }
    }

    async fn send(&self, address: &str, message: JsonValue) -> std::result::Result<(), BusError> {
        let handler = self
            .handler(address)
            .await
            .ok_or_else(|| BusError::NoHandler(address.to_string()))?;
        handler(message).await;
        Ok(())
    }

    async fn publish(
        &self,
        address: &str,
        message: JsonValue,
    ) -> std::result::Result<(), BusError> {
        if let Some(handler) = self.handler(address).await {
            handler(message).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_reply() {
        let bus = LocalBus::new();
        bus.register_handler("test.address", |msg| async move {
            json!({"status": "ok", "echo": msg})
        })
        .await;

        let reply = bus
            .request("test.address", json!({"action": "find"}), DeliveryOptions::default())
            .await
            .unwrap();
        assert_eq!(reply["status"], "ok");
        assert_eq!(reply["echo"]["action"], "find");
    }

    #[tokio::test]
    async fn test_request_no_handler() {
        let bus = LocalBus::new();
        let result = bus
            .request("missing", json!({}), DeliveryOptions::default())
            .await;
        assert!(matches!(result, Err(BusError::NoHandler(addr)) if addr == "missing"));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let bus = LocalBus::new();
        bus.register_handler("slow", |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            json!({})
        })
        .await;

        let options = DeliveryOptions::default().timeout(Duration::from_millis(20));
        let result = bus.request("slow", json!({}), options).await;
        assert!(matches!(result, Err(BusError::Timeout)));
    }

    #[tokio::test]
    async fn test_send_requires_handler() {
        let bus = LocalBus::new();
        assert!(matches!(
            bus.send("missing", json!({})).await,
            Err(BusError::NoHandler(_))
        ));

        bus.register_handler("present", |_| async { json!(null) }).await;
        assert!(bus.send("present", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_noop() {
        let bus = LocalBus::new();
        assert!(bus.publish("nobody", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_unregister_handler() {
        let bus = LocalBus::new();
        bus.register_handler("a", |_| async { json!(null) }).await;
        bus.unregister_handler("a").await;
        assert!(matches!(
            bus.send("a", json!({})).await,
            Err(BusError::NoHandler(_))
        ));
    }

    #[test]
    fn test_delivery_options() {
        let options = DeliveryOptions::default()
            .timeout(Duration::from_secs(5))
            .header("X-Request-Id", "42");
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.headers.get("X-Request-Id").map(String::as_str), Some("42"));
    }
}
