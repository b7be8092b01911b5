//! The persistor facade.
//!
//! Every operation builds a JSON command envelope with an `action` field,
//! relays it over the event bus to the persistor address, and adapts the
//! reply body into a [`ResultMessage`]. There is no state beyond the bus
//! handle and the address.

use crate::bus::{DeliveryOptions, EventBus};
use crate::error::{Error, Result};
use crate::json::doc_to_json;
use crate::message::ResultMessage;
use bson::Document;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Plain-date layout used by [`format_date`] and [`parse_date`].
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M.%S%.3f";

/// Write concern forwarded to the persistor by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConcern {
    /// No acknowledgement at all.
    None,
    Normal,
    Safe,
    Majority,
    FsyncSafe,
    JournalSafe,
    ReplicasSafe,
}

impl WriteConcern {
    /// The wire name of this concern.
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteConcern::None => "NONE",
            WriteConcern::Normal => "NORMAL",
            WriteConcern::Safe => "SAFE",
            WriteConcern::Majority => "MAJORITY",
            WriteConcern::FsyncSafe => "FSYNC_SAFE",
            WriteConcern::JournalSafe => "JOURNAL_SAFE",
            WriteConcern::ReplicasSafe => "REPLICAS_SAFE",
        }
    }
}

/// Read preference forwarded to the persistor by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPreference {
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

impl ReadPreference {
    /// The wire name of this preference.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadPreference::Primary => "primary",
            ReadPreference::PrimaryPreferred => "primaryPreferred",
            ReadPreference::Secondary => "secondary",
            ReadPreference::SecondaryPreferred => "secondaryPreferred",
            ReadPreference::Nearest => "nearest",
        }
    }
}

/// Options shared by the plain write operations (save, insert, delete, bulk).
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Write concern forwarded to the persistor.
    pub write_concern: Option<WriteConcern>,
    /// Delivery tuning for the bus request.
    pub delivery: DeliveryOptions,
}

impl WriteOptions {
    /// Set the write concern.
    pub fn write_concern(mut self, concern: WriteConcern) -> Self {
        self.write_concern = Some(concern);
        self
    }

    /// Set the delivery options.
    pub fn delivery(mut self, delivery: DeliveryOptions) -> Self {
        self.delivery = delivery;
        self
    }
}

/// Options for update operations.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Insert the document when nothing matches.
    pub upsert: bool,
    /// Update every matching document instead of the first.
    pub multi: bool,
    /// Array filters for positional updates.
    pub array_filters: Option<Vec<Document>>,
    /// Write concern forwarded to the persistor.
    pub write_concern: Option<WriteConcern>,
    /// Delivery tuning for the bus request.
    pub delivery: DeliveryOptions,
}

impl UpdateOptions {
    /// Create a builder.
    pub fn builder() -> UpdateOptionsBuilder {
        UpdateOptionsBuilder::default()
    }
}

/// Builder for [`UpdateOptions`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptionsBuilder {
    options: UpdateOptions,
}

impl UpdateOptionsBuilder {
    /// Set the upsert flag.
    pub fn upsert(mut self, upsert: bool) -> Self {
        self.options.upsert = upsert;
        self
    }

    /// Set the multi flag.
    pub fn multi(mut self, multi: bool) -> Self {
        self.options.multi = multi;
        self
    }

    /// Set array filters.
    pub fn array_filters(mut self, filters: Vec<Document>) -> Self {
        self.options.array_filters = Some(filters);
        self
    }

    /// Set the write concern.
    pub fn write_concern(mut self, concern: WriteConcern) -> Self {
        self.options.write_concern = Some(concern);
        self
    }

    /// Set the delivery options.
    pub fn delivery(mut self, delivery: DeliveryOptions) -> Self {
        self.options.delivery = delivery;
        self
    }

    /// Build the options.
    pub fn build(self) -> UpdateOptions {
        self.options
    }
}

/// Options for find operations.
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Sort order.
    pub sort: Option<Document>,
    /// Fields to include/exclude.
    pub keys: Option<Document>,
    /// Number of documents to skip, `-1` for none.
    pub skip: i64,
    /// Maximum number of documents, `-1` for no limit.
    pub limit: i64,
    /// Batch size for the persistor-side cursor.
    pub batch_size: i32,
    /// Read preference forwarded to the persistor.
    pub read_preference: Option<ReadPreference>,
    /// Delivery tuning for the bus request.
    pub delivery: DeliveryOptions,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            sort: None,
            keys: None,
            skip: -1,
            limit: -1,
            batch_size: i32::MAX,
            read_preference: None,
            delivery: DeliveryOptions::default(),
        }
    }
}

impl FindOptions {
    /// Create a builder.
    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::default()
    }
}

/// Builder for [`FindOptions`].
#[derive(Debug, Clone, Default)]
pub struct FindOptionsBuilder {
    options: FindOptions,
}

impl FindOptionsBuilder {
    /// Set the sort order.
    pub fn sort(mut self, sort: Document) -> Self {
        self.options.sort = Some(sort);
        self
    }

    /// Set the projection keys.
    pub fn keys(mut self, keys: Document) -> Self {
        self.options.keys = Some(keys);
        self
    }

    /// Set the skip.
    pub fn skip(mut self, skip: i64) -> Self {
        self.options.skip = skip;
        self
    }

    /// Set the limit.
    pub fn limit(mut self, limit: i64) -> Self {
        self.options.limit = limit;
        self
    }

    /// Set the batch size.
    pub fn batch_size(mut self, batch_size: i32) -> Self {
        self.options.batch_size = batch_size;
        self
    }

    /// Set the read preference.
    pub fn read_preference(mut self, preference: ReadPreference) -> Self {
        self.options.read_preference = Some(preference);
        self
    }

    /// Set the delivery options.
    pub fn delivery(mut self, delivery: DeliveryOptions) -> Self {
        self.options.delivery = delivery;
        self
    }

    /// Build the options.
    pub fn build(self) -> FindOptions {
        self.options
    }
}

/// Options for findone operations.
#[derive(Debug, Clone, Default)]
pub struct FindOneOptions {
    /// Fields to include/exclude.
    pub keys: Option<Document>,
    /// Related document paths the persistor should fetch along.
    pub fetch: Option<Vec<String>>,
    /// Read preference forwarded to the persistor.
    pub read_preference: Option<ReadPreference>,
    /// Delivery tuning for the bus request.
    pub delivery: DeliveryOptions,
}

/// Options for find_and_modify operations.
#[derive(Debug, Clone, Default)]
pub struct FindAndModifyOptions {
    /// Sort order deciding which document is modified.
    pub sort: Option<Document>,
    /// Fields to include/exclude in the returned document.
    pub fields: Option<Document>,
    /// Remove the matched document instead of updating it.
    pub remove: bool,
    /// Return the document as modified rather than as matched.
    pub return_new: bool,
    /// Insert the document when nothing matches.
    pub upsert: bool,
    /// Delivery tuning for the bus request.
    pub delivery: DeliveryOptions,
}

/// A handle on the out-of-process MongoDB persistor.
///
/// Cheap to clone; all clones share the same bus.
///
/// # Example
///
/// ```no_run
/// use mongo_bus::bus::LocalBus;
/// use mongo_bus::mongodb::MongoDb;
/// use bson::doc;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mongo_bus::Result<()> {
/// let bus = Arc::new(LocalBus::new());
/// let mongo = MongoDb::new(bus, "wse.mongodb.persistor");
///
/// let reply = mongo.save("notes", doc! { "content": "blip" }).await?;
/// let id = reply.saved_id().map(str::to_string);
///
/// let found = mongo.find_one("notes", doc! { "_id": id.unwrap() }).await?;
/// # let _ = found;
/// # Ok(())
/// # }
/// ```
pub struct MongoDb {
    bus: Arc<dyn EventBus>,
    address: String,
}

impl MongoDb {
    /// Create a facade sending to the persistor registered at `address`.
    pub fn new(bus: Arc<dyn EventBus>, address: impl Into<String>) -> Self {
        Self {
            bus,
            address: address.into(),
        }
    }

    /// The persistor address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The underlying event bus.
    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    /// Save a document: insert it, or replace it when it carries an `_id`.
    pub async fn save(&self, collection: &str, document: Document) -> Result<ResultMessage> {
        self.save_with_options(collection, document, WriteOptions::default())
            .await
    }

    /// Save with write concern and delivery tuning.
    pub async fn save_with_options(
        &self,
        collection: &str,
        document: Document,
        options: WriteOptions,
    ) -> Result<ResultMessage> {
        let mut payload = json!({
            "action": "save",
            "collection": collection,
            "document": doc_to_json(&document)?,
        });
        put_write_concern(&mut payload, options.write_concern);
        self.send_request(payload, options.delivery).await
    }

    /// Insert a single document.
    pub async fn insert_one(&self, collection: &str, document: Document) -> Result<ResultMessage> {
        self.insert_with_options(collection, vec![document], WriteOptions::default())
            .await
    }

    /// Insert several documents.
    pub async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<ResultMessage> {
        self.insert_with_options(collection, documents, WriteOptions::default())
            .await
    }

    /// Insert with write concern and delivery tuning.
    ///
    /// A single document goes on the wire as `document`; several go as
    /// `documents` with `multiple: true`.
    pub async fn insert_with_options(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: WriteOptions,
    ) -> Result<ResultMessage> {
        if documents.is_empty() {
            return Err(Error::invalid_argument("documents must not be empty"));
        }

        let mut payload = json!({
            "action": "insert",
            "collection": collection,
        });
        if documents.len() > 1 {
            let converted: Vec<JsonValue> = documents
                .iter()
                .map(doc_to_json)
                .collect::<Result<_>>()?;
            payload["documents"] = JsonValue::Array(converted);
            payload["multiple"] = json!(true);
        } else {
            payload["document"] = doc_to_json(&documents[0])?;
        }
        put_write_concern(&mut payload, options.write_concern);
        self.send_request(payload, options.delivery).await
    }

    /// Update the first document matching `criteria` with `obj_new`.
    pub async fn update(
        &self,
        collection: &str,
        criteria: Document,
        obj_new: Document,
    ) -> Result<ResultMessage> {
        self.update_with_options(collection, criteria, obj_new, UpdateOptions::default())
            .await
    }

    /// Update with upsert/multi/array-filter control.
    pub async fn update_with_options(
        &self,
        collection: &str,
        criteria: Document,
        obj_new: Document,
        options: UpdateOptions,
    ) -> Result<ResultMessage> {
        let array_filters = match &options.array_filters {
            Some(filters) => {
                let converted: Vec<JsonValue> =
                    filters.iter().map(doc_to_json).collect::<Result<_>>()?;
                JsonValue::Array(converted)
            }
            None => JsonValue::Null,
        };
        let mut payload = json!({
            "action": "update",
            "collection": collection,
            "criteria": doc_to_json(&criteria)?,
            "objNew": doc_to_json(&obj_new)?,
            "upsert": options.upsert,
            "multi": options.multi,
            "arrayFilters": array_filters,
        });
        put_write_concern(&mut payload, options.write_concern);
        self.send_request(payload, options.delivery).await
    }

    /// Find every document matching `matcher`.
    pub async fn find(
        &self,
        collection: &str,
        matcher: impl Into<Option<Document>>,
    ) -> Result<ResultMessage> {
        self.find_with_options(collection, matcher, FindOptions::default())
            .await
    }

    /// Find with sort/projection/paging control.
    pub async fn find_with_options(
        &self,
        collection: &str,
        matcher: impl Into<Option<Document>>,
        options: FindOptions,
    ) -> Result<ResultMessage> {
        let mut payload = json!({
            "action": "find",
            "collection": collection,
            "matcher": opt_doc_to_json(matcher.into())?,
            "sort": opt_doc_to_json(options.sort)?,
            "keys": opt_doc_to_json(options.keys)?,
            "skip": options.skip,
            "limit": options.limit,
            "batch_size": options.batch_size,
        });
        put_read_preference(&mut payload, options.read_preference);
        self.send_request(payload, options.delivery).await
    }

    /// Find the first document matching `matcher`.
    pub async fn find_one(
        &self,
        collection: &str,
        matcher: impl Into<Option<Document>>,
    ) -> Result<ResultMessage> {
        self.find_one_with_options(collection, matcher, FindOneOptions::default())
            .await
    }

    /// Findone with projection/fetch control.
    pub async fn find_one_with_options(
        &self,
        collection: &str,
        matcher: impl Into<Option<Document>>,
        options: FindOneOptions,
    ) -> Result<ResultMessage> {
        let mut payload = json!({
            "action": "findone",
            "collection": collection,
            "matcher": opt_doc_to_json(matcher.into())?,
            "keys": opt_doc_to_json(options.keys)?,
        });
        if let Some(fetch) = options.fetch {
            payload["fetch"] = json!(fetch);
        }
        put_read_preference(&mut payload, options.read_preference);
        self.send_request(payload, options.delivery).await
    }

    /// Atomically find one document and update, replace or remove it.
    pub async fn find_and_modify(
        &self,
        collection: &str,
        matcher: Document,
        update: Document,
        options: FindAndModifyOptions,
    ) -> Result<ResultMessage> {
        let payload = json!({
            "action": "find_and_modify",
            "collection": collection,
            "matcher": doc_to_json(&matcher)?,
            "update": doc_to_json(&update)?,
            "sort": opt_doc_to_json(options.sort)?,
            "fields": opt_doc_to_json(options.fields)?,
            "remove": options.remove,
            "new": options.return_new,
            "upsert": options.upsert,
        });
        self.send_request(payload, options.delivery).await
    }

    /// Count the documents matching `matcher`.
    pub async fn count(
        &self,
        collection: &str,
        matcher: impl Into<Option<Document>>,
    ) -> Result<ResultMessage> {
        self.count_with_read_preference(collection, matcher, None)
            .await
    }

    /// Count with an explicit read preference.
    pub async fn count_with_read_preference(
        &self,
        collection: &str,
        matcher: impl Into<Option<Document>>,
        read_preference: impl Into<Option<ReadPreference>>,
    ) -> Result<ResultMessage> {
        let mut payload = json!({
            "action": "count",
            "collection": collection,
            "matcher": opt_doc_to_json(matcher.into())?,
        });
        put_read_preference(&mut payload, read_preference.into());
        self.send_request(payload, DeliveryOptions::default()).await
    }

    /// Distinct values of `key` across the collection.
    pub async fn distinct(&self, collection: &str, key: &str) -> Result<ResultMessage> {
        self.distinct_with_options(collection, key, None, None).await
    }

    /// Distinct values of `key` across documents matching `matcher`.
    ///
    /// `result_classname` asks the persistor to coerce values to a given
    /// type before deduplicating.
    pub async fn distinct_with_options(
        &self,
        collection: &str,
        key: &str,
        matcher: impl Into<Option<Document>>,
        result_classname: Option<&str>,
    ) -> Result<ResultMessage> {
        let mut payload = json!({
            "action": "distinct",
            "collection": collection,
            "key": key,
            "matcher": opt_doc_to_json(matcher.into())?,
        });
        if let Some(classname) = result_classname {
            payload["resultClassname"] = json!(classname);
        }
        self.send_request(payload, DeliveryOptions::default()).await
    }

    /// Delete every document matching `matcher`.
    pub async fn delete(
        &self,
        collection: &str,
        matcher: Document,
    ) -> Result<ResultMessage> {
        self.delete_with_options(collection, matcher, WriteOptions::default())
            .await
    }

    /// Delete with write concern and delivery tuning.
    pub async fn delete_with_options(
        &self,
        collection: &str,
        matcher: Document,
        options: WriteOptions,
    ) -> Result<ResultMessage> {
        let mut payload = json!({
            "action": "delete",
            "collection": collection,
            "matcher": doc_to_json(&matcher)?,
        });
        put_write_concern(&mut payload, options.write_concern);
        self.send_request(payload, options.delivery).await
    }

    /// Run a batch of write commands in one round trip.
    pub async fn bulk(&self, collection: &str, commands: Vec<Document>) -> Result<ResultMessage> {
        self.bulk_with_options(collection, commands, WriteOptions::default())
            .await
    }

    /// Bulk with write concern and delivery tuning.
    pub async fn bulk_with_options(
        &self,
        collection: &str,
        commands: Vec<Document>,
        options: WriteOptions,
    ) -> Result<ResultMessage> {
        let converted: Vec<JsonValue> = commands
            .iter()
            .map(doc_to_json)
            .collect::<Result<_>>()?;
        let mut payload = json!({
            "action": "bulk",
            "collection": collection,
            "commands": converted,
        });
        put_write_concern(&mut payload, options.write_concern);
        self.send_request(payload, options.delivery).await
    }

    /// Run a raw database command, passed as its JSON string form.
    pub async fn command(&self, command: impl Into<String>) -> Result<ResultMessage> {
        self.command_with_options(command, DeliveryOptions::default())
            .await
    }

    /// Raw command with delivery tuning.
    pub async fn command_with_options(
        &self,
        command: impl Into<String>,
        delivery: DeliveryOptions,
    ) -> Result<ResultMessage> {
        let command: String = command.into();
        let payload = json!({
            "action": "command",
            "command": command,
        });
        self.send_request(payload, delivery).await
    }

    /// Run an aggregation pipeline and resolve to its `results` array.
    pub async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>> {
        let converted: Vec<JsonValue> = pipeline
            .iter()
            .map(doc_to_json)
            .collect::<Result<_>>()?;
        let payload = json!({
            "action": "aggregate",
            "collection": collection,
            "pipelines": converted,
        });
        let reply = self
            .send_request(payload, DeliveryOptions::default())
            .await?
            .into_result()?;
        reply.results()
    }

    /// Run a full aggregate command document (see
    /// [`AggregationBuilder`](crate::aggregation::AggregationBuilder)).
    pub async fn aggregate_command(&self, command: Document) -> Result<ResultMessage> {
        let command = doc_to_json(&command)?;
        self.command(serde_json::to_string(&command)?).await
    }

    /// Ask the persistor-side cursor for its next batch.
    pub async fn get_next_batch(
        &self,
        collection: &str,
        cursor_id: i64,
    ) -> Result<ResultMessage> {
        self.get_next_batch_with_size(collection, cursor_id, i32::MAX)
            .await
    }

    /// Next batch with an explicit batch size.
    pub async fn get_next_batch_with_size(
        &self,
        collection: &str,
        cursor_id: i64,
        batch_size: i32,
    ) -> Result<ResultMessage> {
        let command = json!({
            "getMore": cursor_id,
            "collection": collection,
            "batchSize": batch_size,
        });
        self.command(serde_json::to_string(&command)?).await
    }

    /// Run an aggregate command, then drain its cursor for at most
    /// `max_batch` additional batches, folding every `nextBatch` into the
    /// reply's `firstBatch`.
    ///
    /// A failed batch fetch ends the loop; the batches accumulated so far
    /// are returned.
    pub async fn aggregate_batched(
        &self,
        collection: &str,
        command: Document,
        max_batch: usize,
    ) -> Result<ResultMessage> {
        let reply = self.aggregate_command(command).await?;
        if !reply.is_ok() {
            return Ok(reply);
        }

        let mut body = reply.into_body();
        if !body["result"].is_object() {
            body["result"] = json!({});
        }
        if !body["result"]["cursor"].is_object() {
            body["result"]["cursor"] = json!({});
        }

        let mut first_batch: Vec<JsonValue> = body["result"]["cursor"]["firstBatch"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        let mut cursor = body["result"]["cursor"].clone();

        for _ in 0..max_batch {
            let cursor_id = cursor.get("id").and_then(JsonValue::as_i64).unwrap_or(0);
            if cursor_id <= 0 {
                break;
            }
            let next = self.get_next_batch(collection, cursor_id).await?;
            if !next.is_ok() {
                break;
            }
            let next_body = next.into_body();
            cursor = next_body["result"]["cursor"].clone();
            if let Some(batch) = cursor.get("nextBatch").and_then(JsonValue::as_array) {
                first_batch.extend(batch.iter().cloned());
            }
        }

        body["result"]["cursor"]["firstBatch"] = JsonValue::Array(first_batch);
        Ok(ResultMessage::from_body(body))
    }

    /// List the collections of the database.
    pub async fn get_collections(&self) -> Result<ResultMessage> {
        self.send_request(json!({ "action": "getCollections" }), DeliveryOptions::default())
            .await
    }

    /// Storage statistics for one collection.
    pub async fn get_collection_stats(&self, collection: &str) -> Result<ResultMessage> {
        let payload = json!({
            "action": "collectionStats",
            "collection": collection,
        });
        self.send_request(payload, DeliveryOptions::default()).await
    }

    async fn send_request(
        &self,
        payload: JsonValue,
        delivery: DeliveryOptions,
    ) -> Result<ResultMessage> {
        let body = self.bus.request(&self.address, payload, delivery).await?;
        Ok(ResultMessage::from_body(body))
    }
}

impl Clone for MongoDb {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
            address: self.address.clone(),
        }
    }
}

/// Whether a raw reply body reports success.
pub fn is_ok(body: &JsonValue) -> bool {
    body.get("status").and_then(JsonValue::as_str) == Some("ok")
}

/// The error string of a raw reply body.
pub fn to_error_str(body: &JsonValue) -> String {
    ResultMessage::from_body(body.clone()).error_message()
}

fn put_write_concern(payload: &mut JsonValue, concern: Option<WriteConcern>) {
    if let Some(concern) = concern {
        payload["write_concern"] = json!(concern.as_str());
    }
}

fn put_read_preference(payload: &mut JsonValue, preference: Option<ReadPreference>) {
    if let Some(preference) = preference {
        payload["read_preference"] = json!(preference.as_str());
    }
}

fn opt_doc_to_json(doc: Option<Document>) -> Result<JsonValue> {
    match doc {
        Some(doc) => doc_to_json(&doc),
        None => Ok(JsonValue::Null),
    }
}

/// The current instant as an extended-JSON `$date` object.
pub fn now() -> JsonValue {
    to_mongo_date(Utc::now())
}

/// A `DateTime` as an extended-JSON `$date` object (ISO offset form).
pub fn to_mongo_date(date: DateTime<Utc>) -> JsonValue {
    json!({ "$date": date.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// An instant `offset_in_seconds` from now, as an extended-JSON `$date`.
pub fn offset_from_now(offset_in_seconds: i64) -> JsonValue {
    to_mongo_date(Utc::now() + chrono::Duration::seconds(offset_in_seconds))
}

/// Parse an extended-JSON `$date` object carrying either epoch millis or an
/// ISO offset string.
pub fn parse_iso_date(date: &JsonValue) -> Result<DateTime<Utc>> {
    match date.get("$date") {
        Some(JsonValue::Number(n)) => {
            let millis = n
                .as_i64()
                .ok_or_else(|| Error::DateParse(format!("millis out of range: {n}")))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| Error::DateParse(format!("millis out of range: {millis}")))
        }
        Some(JsonValue::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::DateParse(e.to_string())),
        _ => Err(Error::DateParse("missing $date field".to_string())),
    }
}

/// Format an instant with the plain `yyyy-MM-dd HH:mm.ss.SSS` layout.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse an instant from the plain `yyyy-MM-dd HH:mm.ss.SSS` layout.
pub fn parse_date(date: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::DateParse(e.to_string()))
}
