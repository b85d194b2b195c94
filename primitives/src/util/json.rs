//! Conversion of stored documents to the JSON sent in the responses.
//!
//! [`ObjectId`](bson::oid::ObjectId)s become their hex string and
//! [`DateTime`](bson::DateTime)s an RFC 3339 string, instead of the Extended JSON objects.
use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::Value;

pub fn document_to_json(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect(),
    )
}

pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(datetime) => Value::String(
            datetime
                .to_chrono()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Bson::Document(document) => document_to_json(document),
        Bson::Array(values) => Value::Array(values.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}
