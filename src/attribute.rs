use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as SdkAttributeValue;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::{Error, Result};
use crate::path::FieldPath;

/// A record as stored in DynamoDB: attribute name to tagged value.
pub type Item = HashMap<String, AttributeValue>;

/// Type tags of the DynamoDB attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Tag {
    Null,
    Bool,
    N,
    S,
    B,
    Ns,
    Ss,
    Bs,
    L,
    M,
}

/// One tagged attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    /// Decimal number kept in its string form.
    N(String),
    S(String),
    B(Vec<u8>),
    Ns(Vec<String>),
    Ss(Vec<String>),
    Bs(Vec<Vec<u8>>),
    L(Vec<AttributeValue>),
    M(HashMap<String, AttributeValue>),
    /// A tag outside the set above, as received.
    Unknown(String),
}

impl AttributeValue {
    /// The type tag, or `None` for [`AttributeValue::Unknown`].
    pub fn tag(&self) -> Option<Tag> {
        let tag = match self {
            AttributeValue::Null => Tag::Null,
            AttributeValue::Bool(_) => Tag::Bool,
            AttributeValue::N(_) => Tag::N,
            AttributeValue::S(_) => Tag::S,
            AttributeValue::B(_) => Tag::B,
            AttributeValue::Ns(_) => Tag::Ns,
            AttributeValue::Ss(_) => Tag::Ss,
            AttributeValue::Bs(_) => Tag::Bs,
            AttributeValue::L(_) => Tag::L,
            AttributeValue::M(_) => Tag::M,
            AttributeValue::Unknown(_) => return None,
        };
        Some(tag)
    }
}

impl From<SdkAttributeValue> for AttributeValue {
    fn from(value: SdkAttributeValue) -> Self {
        match value {
            SdkAttributeValue::Null(_) => AttributeValue::Null,
            SdkAttributeValue::Bool(b) => AttributeValue::Bool(b),
            SdkAttributeValue::N(n) => AttributeValue::N(n),
            SdkAttributeValue::S(s) => AttributeValue::S(s),
            SdkAttributeValue::B(blob) => AttributeValue::B(blob.into_inner()),
            SdkAttributeValue::Ns(set) => AttributeValue::Ns(set),
            SdkAttributeValue::Ss(set) => AttributeValue::Ss(set),
            SdkAttributeValue::Bs(set) => {
                AttributeValue::Bs(set.into_iter().map(|blob| blob.into_inner()).collect())
            }
            SdkAttributeValue::L(list) => {
                AttributeValue::L(list.into_iter().map(AttributeValue::from).collect())
            }
            SdkAttributeValue::M(map) => AttributeValue::M(item_from_sdk(map)),
            // The SDK collapses tags it does not know into a single variant
            _ => AttributeValue::Unknown("UNKNOWN".to_string()),
        }
    }
}

/// Convert an item returned by the AWS SDK.
pub fn item_from_sdk(item: HashMap<String, SdkAttributeValue>) -> Item {
    item.into_iter()
        .map(|(k, v)| (k, AttributeValue::from(v)))
        .collect()
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        decode(&value, &mut FieldPath::new()).map_err(de::Error::custom)
    }
}

/// Decode an item from DynamoDB JSON (`{"name": {"S": "value"}, ...}`).
pub fn item_from_json(value: &Value) -> Result<Item> {
    decode_map(value, &mut FieldPath::new())
}

/// Deserialize an optional item held in a field named `section`.
///
/// Decode errors are reported relative to `section`, e.g. `NewImage.a.b`.
pub(crate) fn deserialize_item_in<'de, D>(
    deserializer: D,
    section: &str,
) -> std::result::Result<Option<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut path = FieldPath::new();
    path.push_key(section);
    decode_map(&value, &mut path)
        .map(Some)
        .map_err(de::Error::custom)
}

/// Decode one or more items from raw DynamoDB JSON.
///
/// Accepts a single item, an array of items, or an object holding an
/// `Items` array (the shape of a `Scan`/`Query` response).
pub fn items_from_slice(input: &[u8]) -> Result<Vec<Item>> {
    let value: Value = serde_json::from_slice(input).map_err(Error::Parse)?;

    match &value {
        Value::Array(items) => items.iter().map(item_from_json).collect(),
        Value::Object(object) => match object.get("Items") {
            Some(Value::Array(items)) => items.iter().map(item_from_json).collect(),
            _ => Ok(vec![item_from_json(&value)?]),
        },
        _ => Err(Error::Decode {
            path: FieldPath::new().to_string(),
            reason: "expected an item object or an array of items".to_string(),
        }),
    }
}

fn decode<'a>(value: &'a Value, path: &mut FieldPath<'a>) -> Result<AttributeValue> {
    let object = value
        .as_object()
        .ok_or_else(|| decode_error(path, "expected an object keyed by a type tag"))?;

    let mut entries = object.iter();
    let (tag, payload) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(decode_error(
                path,
                format!("expected exactly one type tag, found {}", object.len()),
            ))
        }
    };

    let Ok(tag) = tag.parse::<Tag>() else {
        return Ok(AttributeValue::Unknown(tag.clone()));
    };

    let attribute = match tag {
        Tag::Null => AttributeValue::Null,
        Tag::Bool => AttributeValue::Bool(
            payload
                .as_bool()
                .ok_or_else(|| decode_error(path, "BOOL payload must be a boolean"))?,
        ),
        Tag::N => AttributeValue::N(decode_string(payload, tag, path)?),
        Tag::S => AttributeValue::S(decode_string(payload, tag, path)?),
        Tag::B => AttributeValue::B(decode_binary(payload, tag, path)?),
        Tag::Ns => AttributeValue::Ns(decode_strings(payload, tag, path)?),
        Tag::Ss => AttributeValue::Ss(decode_strings(payload, tag, path)?),
        Tag::Bs => AttributeValue::Bs(
            decode_array(payload, tag, path)?
                .iter()
                .map(|element| decode_binary(element, tag, path))
                .collect::<Result<_>>()?,
        ),
        Tag::L => {
            let elements = decode_array(payload, tag, path)?;
            let mut list = Vec::with_capacity(elements.len());
            for (i, element) in elements.iter().enumerate() {
                path.push_index(i);
                list.push(decode(element, path)?);
                path.pop();
            }
            AttributeValue::L(list)
        }
        Tag::M => AttributeValue::M(decode_map(payload, path)?),
    };

    Ok(attribute)
}

fn decode_map<'a>(value: &'a Value, path: &mut FieldPath<'a>) -> Result<Item> {
    let object = value
        .as_object()
        .ok_or_else(|| decode_error(path, "expected an object of attributes"))?;

    let mut map = HashMap::with_capacity(object.len());
    for (key, element) in object {
        path.push_key(key);
        map.insert(key.clone(), decode(element, path)?);
        path.pop();
    }

    Ok(map)
}

fn decode_string(value: &Value, tag: Tag, path: &FieldPath) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| decode_error(path, format!("{tag} payload must be a string")))
}

fn decode_binary(value: &Value, tag: Tag, path: &FieldPath) -> Result<Vec<u8>> {
    let encoded = decode_string(value, tag, path)?;
    BASE64_STANDARD
        .decode(encoded)
        .map_err(|err| decode_error(path, format!("{tag} payload is not base64: {err}")))
}

fn decode_array<'v>(value: &'v Value, tag: Tag, path: &FieldPath) -> Result<&'v Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| decode_error(path, format!("{tag} payload must be an array")))
}

fn decode_strings(value: &Value, tag: Tag, path: &FieldPath) -> Result<Vec<String>> {
    decode_array(value, tag, path)?
        .iter()
        .map(|element| decode_string(element, tag, path))
        .collect()
}

fn decode_error(path: &FieldPath, reason: impl Into<String>) -> Error {
    Error::Decode {
        path: path.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn tag_names_match_wire_format() {
        assert_eq!(Tag::Null.to_string(), "NULL");
        assert_eq!(Tag::Bool.to_string(), "BOOL");
        assert_eq!(Tag::Ns.to_string(), "NS");
        assert_eq!("BS".parse::<Tag>().unwrap(), Tag::Bs);
        assert!("X".parse::<Tag>().is_err());
    }

    #[test]
    fn decodes_every_tag() {
        let item = item_from_json(&json!({
            "null": {"NULL": true},
            "bool": {"BOOL": false},
            "n": {"N": "72.99"},
            "s": {"S": "hello"},
            "b": {"B": "MDEwMTAxMDE="},
            "ns": {"NS": ["1", "2"]},
            "ss": {"SS": ["a", "b"]},
            "bs": {"BS": ["MTExMQ=="]},
            "l": {"L": [{"S": "x"}, {"N": "1"}]},
            "m": {"M": {"inner": {"BOOL": true}}}
        }))
        .unwrap();

        assert_eq!(item["null"], AttributeValue::Null);
        assert_eq!(item["bool"], AttributeValue::Bool(false));
        assert_eq!(item["n"], AttributeValue::N("72.99".to_string()));
        assert_eq!(item["s"], AttributeValue::S("hello".to_string()));
        assert_eq!(item["b"], AttributeValue::B(b"01010101".to_vec()));
        assert_eq!(
            item["ns"],
            AttributeValue::Ns(vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(item["bs"], AttributeValue::Bs(vec![b"1111".to_vec()]));
        assert_eq!(
            item["l"],
            AttributeValue::L(vec![
                AttributeValue::S("x".to_string()),
                AttributeValue::N("1".to_string()),
            ])
        );
        assert_eq!(
            item["m"],
            AttributeValue::M(HashMap::from([(
                "inner".to_string(),
                AttributeValue::Bool(true)
            )]))
        );
    }

    #[test]
    fn unknown_tag_is_kept_for_the_converter() {
        let item = item_from_json(&json!({"weird": {"X": 1}})).unwrap();

        assert_eq!(item["weird"], AttributeValue::Unknown("X".to_string()));
        assert_eq!(item["weird"].tag(), None);
    }

    #[test]
    fn bad_payload_reports_its_path() {
        let err = item_from_json(&json!({
            "outer": {"L": [{"S": "ok"}, {"B": "not base64!"}]}
        }))
        .unwrap_err();

        match err {
            Error::Decode { path, .. } => assert_eq!(path, "outer.1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_values_with_several_tags() {
        let err = item_from_json(&json!({"a": {"S": "x", "N": "1"}})).unwrap_err();

        assert!(matches!(err, Error::Decode { ref path, .. } if path == "a"));
    }

    #[test]
    fn deserializes_through_serde() {
        let value: AttributeValue = serde_json::from_str(r#"{"SS": ["a", "b", "c"]}"#).unwrap();

        assert_eq!(
            value,
            AttributeValue::Ss(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn reads_items_from_scan_output() {
        let input = br#"{"Items": [{"id": {"S": "1"}}, {"id": {"S": "2"}}], "Count": 2}"#;

        let items = items_from_slice(input).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["id"], AttributeValue::S("2".to_string()));
    }

    #[test]
    fn reads_single_item_and_arrays() {
        assert_eq!(items_from_slice(br#"{"id": {"N": "7"}}"#).unwrap().len(), 1);
        assert_eq!(
            items_from_slice(br#"[{"id": {"N": "7"}}, {"id": {"N": "8"}}]"#)
                .unwrap()
                .len(),
            2
        );
        assert!(matches!(
            items_from_slice(b"not json"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn converts_sdk_values() {
        let sdk = HashMap::from([
            ("n".to_string(), SdkAttributeValue::N("42".to_string())),
            ("nul".to_string(), SdkAttributeValue::Null(true)),
            (
                "bs".to_string(),
                SdkAttributeValue::Bs(vec![Blob::new("0000")]),
            ),
            (
                "l".to_string(),
                SdkAttributeValue::L(vec![SdkAttributeValue::Bool(true)]),
            ),
        ]);

        let item = item_from_sdk(sdk);

        assert_eq!(item["n"], AttributeValue::N("42".to_string()));
        assert_eq!(item["nul"], AttributeValue::Null);
        assert_eq!(item["bs"], AttributeValue::Bs(vec![b"0000".to_vec()]));
        assert_eq!(item["l"], AttributeValue::L(vec![AttributeValue::Bool(true)]));
    }
}
