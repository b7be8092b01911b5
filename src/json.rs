//! Conversions between BSON documents and the extended-JSON wire format.
//!
//! Callers hand the facade `bson::Document`s; the persistor speaks MongoDB
//! extended JSON over the bus. Replies convert back on access.

use crate::error::{Error, Result};
use base64::Engine;
use bson::{oid::ObjectId, Bson, Document};
use serde_json::{json, Value as JsonValue};

/// Convert a BSON document to an extended-JSON value.
pub fn doc_to_json(doc: &Document) -> Result<JsonValue> {
    bson_to_json(&Bson::Document(doc.clone()))
}

/// Convert a BSON value to an extended-JSON value.
pub fn bson_to_json(value: &Bson) -> Result<JsonValue> {
    Ok(match value {
        Bson::Double(v) => json!(*v),
        Bson::String(v) => json!(v),
        Bson::Boolean(v) => json!(*v),
        Bson::Null => JsonValue::Null,
        Bson::Int32(v) => json!(*v),
        Bson::Int64(v) => json!(*v),
        Bson::Array(items) => {
            let converted: Vec<JsonValue> =
                items.iter().map(bson_to_json).collect::<Result<_>>()?;
            JsonValue::Array(converted)
        }
        Bson::Document(doc) => {
            let mut map = serde_json::Map::with_capacity(doc.len());
            for (k, v) in doc {
                map.insert(k.clone(), bson_to_json(v)?);
            }
            JsonValue::Object(map)
        }
        Bson::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
        Bson::DateTime(dt) => json!({ "$date": dt.timestamp_millis() }),
        Bson::Binary(bin) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bin.bytes);
            let subtype = u8::from(bin.subtype);
            json!({ "$binary": { "base64": encoded, "subType": format!("{subtype:02x}") } })
        }
        Bson::RegularExpression(re) => {
            json!({ "$regex": re.pattern, "$options": re.options })
        }
        Bson::Timestamp(ts) => json!({ "$timestamp": { "t": ts.time, "i": ts.increment } }),
        other => json!(other.to_string()),
    })
}

/// Convert an extended-JSON value to BSON.
pub fn json_to_bson(value: &JsonValue) -> Bson {
    match value {
        JsonValue::Null => Bson::Null,
        JsonValue::Bool(v) => Bson::Boolean(*v),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::Null
            }
        }
        JsonValue::String(s) => Bson::String(s.clone()),
        JsonValue::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        JsonValue::Object(map) => {
            if let Some(hex) = map.get("$oid").and_then(JsonValue::as_str) {
                if let Ok(oid) = ObjectId::parse_str(hex) {
                    return Bson::ObjectId(oid);
                }
            }
            if let Some(millis) = map.get("$date").and_then(JsonValue::as_i64) {
                return Bson::DateTime(bson::DateTime::from_millis(millis));
            }

            let mut doc = Document::new();
            for (k, v) in map {
                doc.insert(k.clone(), json_to_bson(v));
            }
            Bson::Document(doc)
        }
    }
}

/// Convert an extended-JSON value to a BSON document, failing on non-objects.
pub fn json_to_doc(value: &JsonValue) -> Result<Document> {
    match json_to_bson(value) {
        Bson::Document(doc) => Ok(doc),
        _ => Err(Error::Deserialization("expected a document".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_doc_to_json_scalars() {
        let doc = doc! {
            "name": "nabil",
            "age": 30,
            "ratio": 0.5,
            "active": true,
            "tags": ["a", "b"],
        };
        let json = doc_to_json(&doc).unwrap();
        assert_eq!(json["name"], "nabil");
        assert_eq!(json["age"], 30);
        assert_eq!(json["ratio"], 0.5);
        assert_eq!(json["active"], true);
        assert_eq!(json["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_object_id_round_trip() {
        let oid = ObjectId::new();
        let json = bson_to_json(&Bson::ObjectId(oid)).unwrap();
        assert_eq!(json["$oid"], oid.to_hex());
        assert_eq!(json_to_bson(&json), Bson::ObjectId(oid));
    }

    #[test]
    fn test_date_round_trip() {
        let dt = bson::DateTime::from_millis(1_704_067_200_000);
        let json = bson_to_json(&Bson::DateTime(dt)).unwrap();
        assert_eq!(json["$date"], 1_704_067_200_000_i64);
        assert_eq!(json_to_bson(&json), Bson::DateTime(dt));
    }

    #[test]
    fn test_regex_to_json() {
        let re = Bson::RegularExpression(bson::Regex {
            pattern: "^a".to_string(),
            options: "i".to_string(),
        });
        let json = bson_to_json(&re).unwrap();
        assert_eq!(json["$regex"], "^a");
        assert_eq!(json["$options"], "i");
    }

    #[test]
    fn test_binary_to_json() {
        let bin = Bson::Binary(bson::Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: b"hello".to_vec(),
        });
        let json = bson_to_json(&bin).unwrap();
        assert_eq!(json["$binary"]["base64"], "aGVsbG8=");
        assert_eq!(json["$binary"]["subType"], "00");
    }

    #[test]
    fn test_json_to_bson_numbers() {
        assert_eq!(json_to_bson(&json!(42)), Bson::Int64(42));
        assert!(matches!(json_to_bson(&json!(0.25)), Bson::Double(_)));
    }

    #[test]
    fn test_json_to_doc_rejects_non_object() {
        assert!(json_to_doc(&json!("scalar")).is_err());
        assert!(json_to_doc(&json!({"k": "v"})).is_ok());
    }

    #[test]
    fn test_nested_document_round_trip() {
        let doc = doc! { "outer": { "inner": [1, 2, { "deep": true }] } };
        let json = doc_to_json(&doc).unwrap();
        let back = json_to_doc(&json).unwrap();
        assert_eq!(back.get_document("outer").unwrap().get_array("inner").unwrap().len(), 3);
    }
}
