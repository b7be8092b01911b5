//! Builder for MongoDB update documents.

use bson::{doc, Bson, Document};

/// Fluent builder assembling an update document out of modifier operators.
///
/// Fields added under the same operator merge into a single sub-document, so
/// the built update never contains a duplicate top-level modifier.
///
/// # Example
///
/// ```
/// use mongo_bus::update::UpdateBuilder;
/// use bson::doc;
///
/// let update = UpdateBuilder::new()
///     .set("name", "blop")
///     .set("modified", true)
///     .inc("revision", 1)
///     .build();
///
/// assert_eq!(update, doc! {
///     "$set": { "name": "blop", "modified": true },
///     "$inc": { "revision": 1_i64 },
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    update: Document,
}

impl UpdateBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a value (`$set`).
    pub fn set(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.modifier("$set", key, value.into())
    }

    /// Add a value to an array unless already present (`$addToSet`).
    pub fn add_to_set(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.modifier("$addToSet", key, value.into())
    }

    /// Append a value to an array (`$push`).
    pub fn push(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.modifier("$push", key, value.into())
    }

    /// Insert a value into an array at `position` (`$push` with `$each`/`$position`).
    pub fn push_at(self, key: impl Into<String>, value: impl Into<Bson>, position: i32) -> Self {
        let value: Bson = value.into();
        let insert = doc! { "$each": [value], "$position": position };
        self.modifier("$push", key, Bson::Document(insert))
    }

    /// Remove matching values from an array (`$pull`).
    pub fn pull(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.modifier("$pull", key, value.into())
    }

    /// Rename a field (`$rename`).
    pub fn rename(self, old_key: impl Into<String>, new_key: impl Into<String>) -> Self {
        self.modifier("$rename", old_key, Bson::String(new_key.into()))
    }

    /// Increment a numeric field (`$inc`).
    pub fn inc(self, key: impl Into<String>, value: i64) -> Self {
        self.modifier("$inc", key, Bson::Int64(value))
    }

    /// Remove a field (`$unset`).
    pub fn unset(self, key: impl Into<String>) -> Self {
        self.modifier("$unset", key, Bson::Int32(1))
    }

    /// Whether no modifier has been added yet.
    pub fn is_empty(&self) -> bool {
        self.update.is_empty()
    }

    /// Return the built update document.
    pub fn build(self) -> Document {
        self.update
    }

    fn modifier(mut self, operator: &str, key: impl Into<String>, value: Bson) -> Self {
        match self.update.get_document_mut(operator) {
            Ok(sub) => {
                sub.insert(key.into(), value);
            }
            Err(_) => {
                let mut sub = Document::new();
                sub.insert(key.into(), value);
                self.update.insert(operator, sub);
            }
        }
        self
    }
}
