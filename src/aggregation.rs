//! Builder for MongoDB aggregate commands.

use bson::{doc, Bson, Document};

/// Optional knobs for a `$graphLookup` stage.
#[derive(Debug, Clone, Default)]
pub struct GraphLookupOptions {
    /// Recursion depth limit.
    pub max_depth: Option<i64>,
    /// Field added to each traversed document holding its depth.
    pub depth_field: Option<String>,
    /// Extra criteria applied to traversed documents.
    pub restrict_search_with_match: Option<Document>,
}

impl GraphLookupOptions {
    /// Limit recursion depth.
    pub fn max_depth(mut self, depth: i64) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Record each document's depth under `field`.
    pub fn depth_field(mut self, field: impl Into<String>) -> Self {
        self.depth_field = Some(field.into());
        self
    }

    /// Restrict traversal to documents matching `criteria`.
    pub fn restrict_search_with_match(mut self, criteria: Document) -> Self {
        self.restrict_search_with_match = Some(criteria);
        self
    }
}

/// Fluent builder assembling a complete `aggregate` command document.
///
/// The command carries the collection name, the pipeline stages in call
/// order, and the mandatory cursor sub-document.
///
/// # Example
///
/// ```
/// use mongo_bus::aggregation::AggregationBuilder;
/// use mongo_bus::query::QueryBuilder;
/// use bson::doc;
///
/// let command = AggregationBuilder::start_with_collection("events")
///     .with_match(QueryBuilder::new().eq("kind", "login"))
///     .with_group(doc! { "_id": "$userId", "total": { "$sum": 1 } })
///     .with_sort(doc! { "total": -1 })
///     .with_limit(10)
///     .command();
///
/// assert_eq!(command.get_str("aggregate").unwrap(), "events");
/// assert_eq!(command.get_array("pipeline").unwrap().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct AggregationBuilder {
    command: Document,
}

impl AggregationBuilder {
    /// Start an aggregate command against `collection`.
    pub fn start_with_collection(collection: impl Into<String>) -> Self {
        let collection: String = collection.into();
        Self {
            command: doc! {
                "aggregate": collection,
                "pipeline": [],
                // the persistor requires an explicit cursor sub-document
                "cursor": { "batchSize": i32::MAX },
            },
        }
    }

    /// Allow stages to spill to disk.
    pub fn with_allow_disk_use(mut self, allow_disk_use: bool) -> Self {
        self.command.insert("allowDiskUse", allow_disk_use);
        self
    }

    /// Append a `$graphLookup` stage recursing over this command's own collection.
    pub fn with_graph_lookup(
        self,
        start_with: impl Into<Bson>,
        connect_from_field: impl Into<String>,
        connect_to_field: impl Into<String>,
        as_field: impl Into<String>,
        options: GraphLookupOptions,
    ) -> Self {
        let from = self.command.get_str("aggregate").unwrap_or_default().to_string();
        self.with_graph_lookup_from(
            from,
            start_with,
            connect_from_field,
            connect_to_field,
            as_field,
            options,
        )
    }

    /// Append a `$graphLookup` stage recursing over `collection`.
    pub fn with_graph_lookup_from(
        mut self,
        collection: impl Into<String>,
        start_with: impl Into<Bson>,
        connect_from_field: impl Into<String>,
        connect_to_field: impl Into<String>,
        as_field: impl Into<String>,
        options: GraphLookupOptions,
    ) -> Self {
        let collection: String = collection.into();
        let start_with: Bson = start_with.into();
        let connect_from_field: String = connect_from_field.into();
        let connect_to_field: String = connect_to_field.into();
        let as_field: String = as_field.into();
        let mut graph = doc! {
            "from": collection,
            "startWith": start_with,
            "connectFromField": connect_from_field,
            "connectToField": connect_to_field,
            "as": as_field,
        };
        if let Some(depth) = options.max_depth {
            graph.insert("maxDepth", depth);
        }
        if let Some(field) = options.depth_field {
            graph.insert("depthField", field);
        }
        if let Some(criteria) = options.restrict_search_with_match {
            graph.insert("restrictSearchWithMatch", criteria);
        }
        self.push_stage(doc! { "$graphLookup": graph });
        self
    }

    /// Append a `$match` stage.
    pub fn with_match(mut self, criteria: impl Into<Document>) -> Self {
        let criteria: Document = criteria.into();
        self.push_stage(doc! { "$match": criteria });
        self
    }

    /// Append a `$project` stage.
    pub fn with_projection(mut self, projection: Document) -> Self {
        self.push_stage(doc! { "$project": projection });
        self
    }

    /// Append an `$addFields` stage.
    pub fn with_add_fields(mut self, fields: Document) -> Self {
        self.push_stage(doc! { "$addFields": fields });
        self
    }

    /// Append a `$collStats` stage.
    pub fn with_coll_stats(mut self, coll_stats: Document) -> Self {
        self.push_stage(doc! { "$collStats": coll_stats });
        self
    }

    /// Append a `$count` stage writing the count to `field`.
    pub fn with_count(mut self, field: impl Into<String>) -> Self {
        let field: String = field.into();
        self.push_stage(doc! { "$count": field });
        self
    }

    /// Append a `$group` stage.
    pub fn with_group(mut self, group: Document) -> Self {
        self.push_stage(doc! { "$group": group });
        self
    }

    /// Append an `$unwind` stage over `field_path` (e.g. `"$recipients"`).
    pub fn with_unwind(mut self, field_path: impl Into<String>) -> Self {
        let field_path: String = field_path.into();
        self.push_stage(doc! { "$unwind": field_path });
        self
    }

    /// Append a `$limit` stage.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.push_stage(doc! { "$limit": limit });
        self
    }

    /// Append a `$skip` stage.
    pub fn with_skip(mut self, skip: i64) -> Self {
        self.push_stage(doc! { "$skip": skip });
        self
    }

    /// Append a `$sort` stage.
    pub fn with_sort(mut self, sorts: Document) -> Self {
        self.push_stage(doc! { "$sort": sorts });
        self
    }

    /// Append a `$lookup` stage.
    pub fn with_lookup(
        mut self,
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        let from: String = from.into();
        let local_field: String = local_field.into();
        let foreign_field: String = foreign_field.into();
        let as_field: String = as_field.into();
        self.push_stage(doc! {
            "$lookup": {
                "from": from,
                "localField": local_field,
                "foreignField": foreign_field,
                "as": as_field,
            }
        });
        self
    }

    /// Return the built aggregate command.
    pub fn command(self) -> Document {
        self.command
    }

    fn push_stage(&mut self, stage: Document) {
        if let Ok(pipeline) = self.command.get_array_mut("pipeline") {
            pipeline.push(Bson::Document(stage));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_graph_lookup_command() {
        let command = AggregationBuilder::start_with_collection("test")
            .with_allow_disk_use(true)
            .with_graph_lookup(
                "uid1",
                "id",
                "parentId",
                "tree",
                GraphLookupOptions::default()
                    .max_depth(5)
                    .depth_field("depth")
                    .restrict_search_with_match(doc! { "fname": "nabil" }),
            )
            .with_limit(5)
            .with_match(QueryBuilder::new().eq("test", "test"))
            .with_projection(doc! { "title": 1 })
            .command();

        assert_eq!(
            command,
            doc! {
                "aggregate": "test",
                "pipeline": [
                    {
                        "$graphLookup": {
                            "from": "test",
                            "startWith": "uid1",
                            "connectFromField": "id",
                            "connectToField": "parentId",
                            "as": "tree",
                            "maxDepth": 5_i64,
                            "depthField": "depth",
                            "restrictSearchWithMatch": { "fname": "nabil" },
                        }
                    },
                    { "$limit": 5_i64 },
                    { "$match": { "test": "test" } },
                    { "$project": { "title": 1 } },
                ],
                "cursor": { "batchSize": i32::MAX },
                "allowDiskUse": true,
            }
        );
    }

    #[test]
    fn test_group_unwind_command() {
        let command = AggregationBuilder::start_with_collection("test")
            .with_group(doc! { "_id": "notifiedUsers" })
            .with_unwind("$recipients")
            .with_match(QueryBuilder::new().eq("test", "test"))
            .with_projection(doc! { "title": 1 })
            .command();

        assert_eq!(
            command,
            doc! {
                "aggregate": "test",
                "pipeline": [
                    { "$group": { "_id": "notifiedUsers" } },
                    { "$unwind": "$recipients" },
                    { "$match": { "test": "test" } },
                    { "$project": { "title": 1 } },
                ],
                "cursor": { "batchSize": i32::MAX },
            }
        );
    }

    #[test]
    fn test_graph_lookup_from_other_collection() {
        let command = AggregationBuilder::start_with_collection("folders")
            .with_graph_lookup_from(
                "documents",
                "$_id",
                "id",
                "folderId",
                "children",
                GraphLookupOptions::default(),
            )
            .command();

        let pipeline = command.get_array("pipeline").unwrap();
        let stage = pipeline[0].as_document().unwrap();
        let graph = stage.get_document("$graphLookup").unwrap();
        assert_eq!(graph.get_str("from").unwrap(), "documents");
        assert!(!graph.contains_key("maxDepth"));
        assert!(!graph.contains_key("depthField"));
    }

    #[test]
    fn test_lookup_and_sort() {
        let command = AggregationBuilder::start_with_collection("orders")
            .with_lookup("users", "userId", "_id", "user")
            .with_sort(doc! { "created": -1 })
            .with_skip(20)
            .command();

        let pipeline = command.get_array("pipeline").unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline[0].as_document().unwrap(),
            &doc! { "$lookup": {
                "from": "users",
                "localField": "userId",
                "foreignField": "_id",
                "as": "user",
            }}
        );
    }

    #[test]
    fn test_count_and_coll_stats() {
        let command = AggregationBuilder::start_with_collection("logs")
            .with_coll_stats(doc! { "storageStats": {} })
            .with_count("total")
            .command();

        let pipeline = command.get_array("pipeline").unwrap();
        assert_eq!(pipeline[1].as_document().unwrap(), &doc! { "$count": "total" });
    }
}
