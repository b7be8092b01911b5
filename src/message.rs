//! Reply envelope returned by the persistor.

use crate::error::{Error, Result};
use crate::json::json_to_doc;
use bson::Document;
use serde_json::{json, Value as JsonValue};

/// Fallback used when an error reply carries no message at all.
const DEFAULT_ERROR: &str = "query helper error";

/// A persistor reply body.
///
/// Every reply is a JSON object with a `status` field (`"ok"` or `"error"`)
/// plus operation-specific payload fields (`results`, `result`, `number`,
/// `count`, `values`, `_id`). This wrapper adapts those fields into typed
/// accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMessage {
    body: JsonValue,
}

impl ResultMessage {
    /// Create an empty `ok` reply.
    pub fn ok() -> Self {
        Self {
            body: json!({ "status": "ok" }),
        }
    }

    /// Wrap a reply body, defaulting `status` to `ok` when absent.
    pub fn from_body(body: JsonValue) -> Self {
        let mut body = match body {
            JsonValue::Object(map) => JsonValue::Object(map),
            _ => json!({}),
        };
        if body.get("status").is_none() {
            body["status"] = json!("ok");
        }
        Self { body }
    }

    /// Create an `error` reply carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            body: json!({ "status": "error", "message": message.into() }),
        }
    }

    /// Add or replace a body field.
    pub fn put(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        let key: String = key.into();
        self.body[key.as_str()] = value;
        self
    }

    /// The reply `status` field.
    pub fn status(&self) -> &str {
        self.body["status"].as_str().unwrap_or("")
    }

    /// Whether the persistor reported success.
    pub fn is_ok(&self) -> bool {
        self.status() == "ok"
    }

    /// The error message of a failed reply.
    ///
    /// Reads `error`, falls back to `message`, then to a fixed default.
    pub fn error_message(&self) -> String {
        self.body
            .get("error")
            .and_then(JsonValue::as_str)
            .or_else(|| self.body.get("message").and_then(JsonValue::as_str))
            .unwrap_or(DEFAULT_ERROR)
            .to_string()
    }

    /// Turn a `status: "error"` reply into [`Error::Persistor`].
    pub fn into_result(self) -> Result<ResultMessage> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(Error::persistor(self.error_message()))
        }
    }

    /// The `results` array of a find/aggregate reply, as documents.
    pub fn results(&self) -> Result<Vec<Document>> {
        match self.body.get("results").and_then(JsonValue::as_array) {
            Some(items) => items.iter().map(json_to_doc).collect(),
            None => Ok(Vec::new()),
        }
    }

    /// The single `result` document of a findone/find_and_modify reply.
    pub fn result(&self) -> Result<Option<Document>> {
        match self.body.get("result") {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => json_to_doc(value).map(Some),
        }
    }

    /// The `number` field of a write reply.
    pub fn number(&self) -> Option<i64> {
        self.body.get("number").and_then(JsonValue::as_i64)
    }

    /// The `count` field of a count reply.
    pub fn count(&self) -> Option<i64> {
        self.body.get("count").and_then(JsonValue::as_i64)
    }

    /// The `values` array of a distinct reply.
    pub fn values(&self) -> Option<&Vec<JsonValue>> {
        self.body.get("values").and_then(JsonValue::as_array)
    }

    /// The generated `_id` of a save reply.
    pub fn saved_id(&self) -> Option<&str> {
        self.body.get("_id").and_then(JsonValue::as_str)
    }

    /// The raw reply body.
    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    /// Consume the wrapper, returning the raw body.
    pub fn into_body(self) -> JsonValue {
        self.body
    }
}

impl Default for ResultMessage {
    fn default() -> Self {
        Self::ok()
    }
}
