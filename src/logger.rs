//! Event-bus decorator mirroring traffic into a `logs` collection.

use crate::bus::{BusError, DeliveryOptions, EventBus};
use crate::mongodb::{MongoDb, WriteConcern, WriteOptions};
use bson::{doc, Document};
use chrono::{SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

const LOGS_COLLECTION: &str = "logs";

/// An [`EventBus`] decorator that audits every message.
///
/// Each `send`/`publish`/`request` is mirrored into the `logs` collection of
/// the persistor reachable over the inner bus, fire-and-forget with the
/// weakest write concern. Replies are logged under the correlation id of the
/// request entry. The decorator writes its own log entries through the inner
/// bus, so they are not themselves audited.
pub struct MongoLoggingBus {
    inner: Arc<dyn EventBus>,
    mongo: MongoDb,
}

impl MongoLoggingBus {
    /// Wrap `inner`, writing audit entries through the persistor at
    /// `persistor_address`.
    pub fn new(inner: Arc<dyn EventBus>, persistor_address: impl Into<String>) -> Self {
        let mongo = MongoDb::new(inner.clone(), persistor_address);
        Self { inner, mongo }
    }

    fn prepare_log(address: &str, message: &JsonValue) -> Document {
        doc! {
            "message": encode(message),
            "address": address,
            "date": mongo_now(),
        }
    }

    fn send_log(&self, address: &str, message: &JsonValue) {
        let mut entry = Self::prepare_log(address, message);
        entry.insert("type", "SEND");
        self.spawn_log(entry);
    }

    fn publish_log(&self, address: &str, message: &JsonValue) {
        let mut entry = Self::prepare_log(address, message);
        entry.insert("type", "PUBLISH");
        self.spawn_log(entry);
    }

    fn request_log(&self, address: &str, message: &JsonValue) -> String {
        let log_message_id = Uuid::new_v4().to_string();
        let mut entry = Self::prepare_log(address, message);
        entry.insert("_id", log_message_id.clone());
        entry.insert("type", "SEND_WITH_REPLY");
        self.spawn_log(entry);
        log_message_id
    }

    fn response_log(&self, log_message_id: &str, response: &JsonValue) {
        let entry = doc! {
            "response": encode(response),
            "messageId": log_message_id,
            "date": mongo_now(),
            "type": "REPLY",
        };
        self.spawn_log(entry);
    }

    fn spawn_log(&self, entry: Document) {
        let mongo = self.mongo.clone();
        let options = WriteOptions::default().write_concern(WriteConcern::None);
        tokio::spawn(async move {
            if let Err(err) = mongo
                .save_with_options(LOGS_COLLECTION, entry, options)
                .await
            {
                tracing::debug!(error = %err, "dropped audit log entry");
            }
        });
    }
}

#[async_trait::async_trait]
impl EventBus for MongoLoggingBus {
    async fn request(
        &self,
        address: &str,
        message: JsonValue,
        options: DeliveryOptions,
    ) -> std::result::Result<JsonValue, BusError> {
        let log_message_id = self.request_log(address, &message);
        match self.inner.request(address, message, options).await {
            Ok(reply) => {
                self.response_log(&log_message_id, &reply);
                Ok(reply)
            }
            Err(err) => {
                tracing::error!(
                    message_id = %log_message_id,
                    address,
                    error = %err,
                    "request failed"
                );
                Err(err)
            }
        }
    }

    async fn send(&self, address: &str, message: JsonValue) -> std::result::Result<(), BusError> {
        self.send_log(address, &message);
        self.inner.send(address, message).await
    }

    async fn publish(
        &self,
        address: &str,
        message: JsonValue,
    ) -> std::result::Result<(), BusError> {
        self.publish_log(address, &message);
        self.inner.publish(address, message).await
    }
}

fn mongo_now() -> Document {
    doc! { "$date": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true) }
}

fn encode(message: &JsonValue) -> String {
    match message {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
