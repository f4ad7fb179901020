//! Conversions between domain types and their stored BSON form.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Binary, Bson, spec::BinarySubtype};
use uuid::Uuid;

/// `Uuid` as the driver writes it when serializing a document: generic
/// binary holding the 16 raw bytes. Filters on id fields must use this.
pub fn uuid_to_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

/// Millisecond precision; anything finer is dropped.
pub fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub fn from_bson_datetime(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}
