//! DynamoDB Streams change records, as delivered to an event handler, and
//! their plain JSON form.

use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;
use tracing::debug;

use crate::attribute::{deserialize_item_in, Item};
use crate::convert::{convert_map, Object};
use crate::error::Result;
use crate::path::FieldPath;

/// A batch of stream records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_name: OperationType,
    pub dynamodb: StreamRecord,
}

/// The `dynamodb` section of a record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    #[serde(default, deserialize_with = "keys")]
    pub keys: Option<Item>,
    #[serde(default, deserialize_with = "new_image")]
    pub new_image: Option<Item>,
    #[serde(default, deserialize_with = "old_image")]
    pub old_image: Option<Item>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

fn keys<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Item>, D::Error> {
    deserialize_item_in(deserializer, "Keys")
}

fn new_image<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Item>, D::Error> {
    deserialize_item_in(deserializer, "NewImage")
}

fn old_image<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Item>, D::Error> {
    deserialize_item_in(deserializer, "OldImage")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OperationType {
    Insert,
    Modify,
    Remove,
}

/// A stream record re-emitted as plain JSON.
///
/// Fields are declared in key order so the encoded document stays sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub event_id: String,
    pub event_name: OperationType,
    pub keys: Object,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_image: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}

impl ChangeRecord {
    /// Convert the key and image sections of `record`.
    ///
    /// Error paths start with the record's event id, e.g. `<id>.NewImage.a`.
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut path = FieldPath::new();
        path.push_key(&record.event_id);

        let stream = &record.dynamodb;
        let keys = convert_section("Keys", stream.keys.as_ref(), &mut path)?.unwrap_or_default();
        let new_image = convert_section("NewImage", stream.new_image.as_ref(), &mut path)?;
        let old_image = convert_section("OldImage", stream.old_image.as_ref(), &mut path)?;

        Ok(Self {
            event_id: record.event_id.clone(),
            event_name: record.event_name,
            keys,
            new_image,
            old_image,
            sequence_number: stream.sequence_number.clone(),
        })
    }
}

fn convert_section<'a>(
    name: &'static str,
    section: Option<&'a Item>,
    path: &mut FieldPath<'a>,
) -> Result<Option<Object>> {
    let Some(item) = section else {
        return Ok(None);
    };

    path.push_key(name);
    let object = convert_map(item, path)?;
    path.pop();

    Ok(Some(object))
}

/// Convert every record of `event`, one JSON document per record.
///
/// The first malformed record aborts the whole batch.
pub fn convert_event(event: &Event) -> Result<Vec<Vec<u8>>> {
    let documents = event
        .records
        .iter()
        .map(|record| {
            let change = ChangeRecord::from_record(record)?;
            Ok(serde_json::to_vec(&change)?)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(records = documents.len(), "converted stream event");

    Ok(documents)
}
