//! Builder for MongoDB query documents.

use bson::{doc, Bson, Document};

/// Fluent builder assembling a criteria document.
///
/// Comparison operators applied to the same field merge into one operator
/// sub-document; a later [`eq`](QueryBuilder::eq) replaces whatever was
/// there for that field.
///
/// # Example
///
/// ```
/// use mongo_bus::query::QueryBuilder;
/// use bson::doc;
///
/// let query = QueryBuilder::new()
///     .gte("age", 18)
///     .lt("age", 65)
///     .eq("country", "fr")
///     .build();
///
/// assert_eq!(query, doc! {
///     "age": { "$gte": 18, "$lt": 65 },
///     "country": "fr",
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Document,
}

impl QueryBuilder {
    /// Create an empty builder (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a field by equality.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// `$ne`
    pub fn ne(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.operator(key, "$ne", value.into())
    }

    /// `$gt`
    pub fn gt(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.operator(key, "$gt", value.into())
    }

    /// `$gte`
    pub fn gte(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.operator(key, "$gte", value.into())
    }

    /// `$lt`
    pub fn lt(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.operator(key, "$lt", value.into())
    }

    /// `$lte`
    pub fn lte(self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.operator(key, "$lte", value.into())
    }

    /// `$in`
    pub fn is_in<B: Into<Bson>>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = B>,
    ) -> Self {
        let array: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.operator(key, "$in", Bson::Array(array))
    }

    /// `$nin`
    pub fn not_in<B: Into<Bson>>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = B>,
    ) -> Self {
        let array: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.operator(key, "$nin", Bson::Array(array))
    }

    /// `$exists`
    pub fn exists(self, key: impl Into<String>, exists: bool) -> Self {
        self.operator(key, "$exists", Bson::Boolean(exists))
    }

    /// `$regex`
    pub fn regex(self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.operator(key, "$regex", Bson::String(pattern.into()))
    }

    /// `$regex` with options (`i`, `m`, ...).
    pub fn regex_with_options(
        self,
        key: impl Into<String>,
        pattern: impl Into<String>,
        options: impl Into<String>,
    ) -> Self {
        let key = key.into();
        self.operator(key.clone(), "$regex", Bson::String(pattern.into()))
            .operator(key, "$options", Bson::String(options.into()))
    }

    /// `$mod`
    pub fn modulo(self, key: impl Into<String>, divisor: i64, remainder: i64) -> Self {
        self.operator(key, "$mod", Bson::Array(vec![Bson::Int64(divisor), Bson::Int64(remainder)]))
    }

    /// `$all`
    pub fn all<B: Into<Bson>>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = B>,
    ) -> Self {
        let array: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.operator(key, "$all", Bson::Array(array))
    }

    /// `$size`
    pub fn size(self, key: impl Into<String>, size: i64) -> Self {
        self.operator(key, "$size", Bson::Int64(size))
    }

    /// `$elemMatch`
    pub fn elem_match(self, key: impl Into<String>, criteria: Document) -> Self {
        self.operator(key, "$elemMatch", Bson::Document(criteria))
    }

    /// `$not` wrapping an operator document.
    pub fn not(self, key: impl Into<String>, criteria: Document) -> Self {
        self.operator(key, "$not", Bson::Document(criteria))
    }

    /// `$text` search on the collection's text index.
    pub fn text(mut self, search: impl Into<String>) -> Self {
        let search: String = search.into();
        self.query.insert("$text", doc! { "$search": search });
        self
    }

    /// `$and` over sub-queries.
    pub fn and(self, branches: impl IntoIterator<Item = Document>) -> Self {
        self.logical("$and", branches)
    }

    /// `$or` over sub-queries.
    pub fn or(self, branches: impl IntoIterator<Item = Document>) -> Self {
        self.logical("$or", branches)
    }

    /// `$nor` over sub-queries.
    pub fn nor(self, branches: impl IntoIterator<Item = Document>) -> Self {
        self.logical("$nor", branches)
    }

    /// Whether no criteria has been added yet.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Return the built criteria document.
    pub fn build(self) -> Document {
        self.query
    }

    fn logical(mut self, op: &str, branches: impl IntoIterator<Item = Document>) -> Self {
        let array: Vec<Bson> = branches.into_iter().map(Bson::Document).collect();
        match self.query.get_array_mut(op) {
            Ok(existing) => existing.extend(array),
            Err(_) => {
                self.query.insert(op, Bson::Array(array));
            }
        }
        self
    }

    fn operator(mut self, key: impl Into<String>, op: &str, value: Bson) -> Self {
        let key = key.into();
        match self.query.get_document_mut(&key) {
            Ok(sub) if sub.keys().any(|k| k.starts_with('$')) => {
                sub.insert(op, value);
            }
            _ => {
                let mut sub = Document::new();
                sub.insert(op, value);
                self.query.insert(key, sub);
            }
        }
        self
    }
}

impl From<QueryBuilder> for Document {
    fn from(builder: QueryBuilder) -> Document {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_matches_everything() {
        assert_eq!(QueryBuilder::new().build(), Document::new());
    }

    #[test]
    fn test_eq() {
        let query = QueryBuilder::new().eq("test", "test").build();
        assert_eq!(query, doc! { "test": "test" });
    }

    #[test]
    fn test_range_merges_on_field() {
        let query = QueryBuilder::new().gt("n", 1).lte("n", 9).build();
        assert_eq!(query, doc! { "n": { "$gt": 1, "$lte": 9 } });
    }

    #[test]
    fn test_eq_replaces_operators() {
        let query = QueryBuilder::new().gt("n", 1).eq("n", 5).build();
        assert_eq!(query, doc! { "n": 5 });
    }

    #[test]
    fn test_in_and_nin() {
        let query = QueryBuilder::new()
            .is_in("status", ["draft", "sent"])
            .not_in("kind", ["spam"])
            .build();
        assert_eq!(
            query,
            doc! {
                "status": { "$in": ["draft", "sent"] },
                "kind": { "$nin": ["spam"] },
            }
        );
    }

    #[test]
    fn test_exists_regex_size() {
        let query = QueryBuilder::new()
            .exists("deleted", false)
            .regex("name", "^jo")
            .size("tags", 2)
            .build();
        assert_eq!(
            query,
            doc! {
                "deleted": { "$exists": false },
                "name": { "$regex": "^jo" },
                "tags": { "$size": 2_i64 },
            }
        );
    }

    #[test]
    fn test_regex_with_options() {
        let query = QueryBuilder::new().regex_with_options("name", "^jo", "i").build();
        assert_eq!(query, doc! { "name": { "$regex": "^jo", "$options": "i" } });
    }

    #[test]
    fn test_modulo_and_all() {
        let query = QueryBuilder::new()
            .modulo("n", 4, 0)
            .all("tags", ["a", "b"])
            .build();
        assert_eq!(
            query,
            doc! {
                "n": { "$mod": [4_i64, 0_i64] },
                "tags": { "$all": ["a", "b"] },
            }
        );
    }

    #[test]
    fn test_elem_match() {
        let query = QueryBuilder::new()
            .elem_match("scores", doc! { "value": { "$gt": 10 } })
            .build();
        assert_eq!(query, doc! { "scores": { "$elemMatch": { "value": { "$gt": 10 } } } });
    }

    #[test]
    fn test_text() {
        let query = QueryBuilder::new().text("coffee").build();
        assert_eq!(query, doc! { "$text": { "$search": "coffee" } });
    }

    #[test]
    fn test_or_combinator() {
        let query = QueryBuilder::new()
            .or([doc! { "a": 1 }, doc! { "b": 2 }])
            .build();
        assert_eq!(query, doc! { "$or": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn test_or_appends() {
        let query = QueryBuilder::new()
            .or([doc! { "a": 1 }])
            .or([doc! { "b": 2 }])
            .build();
        assert_eq!(query, doc! { "$or": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn test_nested_plain_document_not_treated_as_operators() {
        // a plain subdocument value must be replaced, not merged into
        let query = QueryBuilder::new()
            .eq("loc", doc! { "city": "paris" })
            .gt("loc", 1)
            .build();
        assert_eq!(query, doc! { "loc": { "$gt": 1 } });
    }
}
