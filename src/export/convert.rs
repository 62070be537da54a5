// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversion from raw Firestore documents to plain JSON.
//!
//! Timestamps become RFC 3339 strings, bytes become base64, geo points
//! become `{latitude, longitude}` objects, references stay path strings.

use crate::export::SourceDocument;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use gcloud_sdk::google::firestore::v1::{value::ValueType, Document, Value};

/// Convert a raw Firestore document into a [`SourceDocument`].
///
/// The document ID is the last segment of the full resource name
/// (`projects/{p}/databases/{d}/documents/{collection}/{id}`).
pub fn document_to_source(doc: Document) -> SourceDocument {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let fields = doc
        .fields
        .into_iter()
        .map(|(k, v)| (k, value_to_json(v)))
        .collect();

    SourceDocument { id, fields }
}

/// Map one Firestore value to JSON.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value.value_type {
        None | Some(ValueType::NullValue(_)) => serde_json::Value::Null,
        Some(ValueType::BooleanValue(b)) => serde_json::Value::Bool(b),
        Some(ValueType::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        // NaN and infinities have no JSON representation
        Some(ValueType::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(ValueType::TimestampValue(ts)) => timestamp_to_json(&ts),
        Some(ValueType::StringValue(s)) => serde_json::Value::String(s),
        Some(ValueType::BytesValue(b)) => serde_json::Value::String(STANDARD.encode(b)),
        Some(ValueType::ReferenceValue(r)) => serde_json::Value::String(r),
        Some(ValueType::GeoPointValue(p)) => serde_json::json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
        }),
        Some(ValueType::ArrayValue(arr)) => {
            serde_json::Value::Array(arr.values.into_iter().map(value_to_json).collect())
        }
        Some(ValueType::MapValue(map)) => serde_json::Value::Object(
            map.fields
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

fn timestamp_to_json(ts: &gcloud_sdk::prost_types::Timestamp) -> serde_json::Value {
    chrono::DateTime::from_timestamp(ts.seconds, ts.nanos.max(0) as u32)
        .map(|dt| serde_json::Value::String(dt.to_rfc3339()))
        .unwrap_or(serde_json::Value::Null)
}
