//! # mongo-bus
//!
//! MongoDB persistor facade over an async event bus.
//!
//! This crate builds MongoDB query/update/aggregation documents and relays
//! them as JSON command envelopes over a request/reply event bus to a
//! separate persistor process, adapting each reply into a typed result. It
//! holds no database state: every operation is one method call, one
//! envelope, one reply.
//!
//! ## Features
//!
//! - Fluent builders for criteria, update modifiers and aggregate commands
//! - One-envelope-per-operation facade over the full persistor action set
//! - Reply adaptation into [`ResultMessage`] with typed accessors
//! - An audit decorator mirroring bus traffic into a `logs` collection
//! - A local in-process bus for wiring a persistor handler and for tests
//!
//! ## Quick Start
//!
//! ```
//! use mongo_bus::bus::LocalBus;
//! use mongo_bus::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> mongo_bus::Result<()> {
//!     let bus = Arc::new(LocalBus::new());
//!     // the persistor process answers at this address; tests stub it
//!     bus.register_handler("wse.mongodb.persistor", |_envelope| async {
//!         json!({ "status": "ok", "_id": "5f2d" })
//!     })
//!     .await;
//!
//!     let mongo = MongoDb::new(bus, "wse.mongodb.persistor");
//!
//!     let saved = mongo.save("notes", doc! { "content": "blip" }).await?;
//!     let id = saved.saved_id().unwrap_or_default().to_string();
//!
//!     let update = UpdateBuilder::new().set("content", "blop").build();
//!     mongo.update("notes", doc! { "_id": id }, update).await?;
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod bus;
pub mod error;
pub mod json;
pub mod logger;
pub mod message;
pub mod mongodb;
pub mod query;
pub mod update;

// Re-export main types
pub use aggregation::{AggregationBuilder, GraphLookupOptions};
pub use bus::{BusError, DeliveryOptions, EventBus, LocalBus};
pub use error::{Error, ErrorKind, Result};
pub use logger::MongoLoggingBus;
pub use message::ResultMessage;
pub use mongodb::{
    FindAndModifyOptions, FindOneOptions, FindOptions, FindOptionsBuilder, MongoDb,
    ReadPreference, UpdateOptions, UpdateOptionsBuilder, WriteConcern, WriteOptions,
};
pub use query::QueryBuilder;
pub use update::UpdateBuilder;

// Re-export bson for convenience
pub use bson;
pub use bson::doc;

/// Prelude module for common imports.
pub mod prelude {
    pub use super::aggregation::AggregationBuilder;
    pub use super::bus::{DeliveryOptions, EventBus};
    pub use super::error::{Error, ErrorKind, Result};
    pub use super::message::ResultMessage;
    pub use super::mongodb::{
        FindAndModifyOptions, FindOneOptions, FindOptions, MongoDb, ReadPreference,
        UpdateOptions, WriteConcern, WriteOptions,
    };
    pub use super::query::QueryBuilder;
    pub use super::update::UpdateBuilder;
    pub use bson::{doc, Document};
    pub use serde::{Deserialize, Serialize};
}

/// Get the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
