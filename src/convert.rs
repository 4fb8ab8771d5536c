use std::collections::{BTreeMap, HashMap};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::Serialize;
use tracing::error;

use crate::attribute::{AttributeValue, Item};
use crate::error::{Error, Result};
use crate::path::FieldPath;

/// Converted object. Keys serialize in ascending order.
pub type Object = BTreeMap<String, JsonValue>;

/// Plain JSON produced from tagged attributes.
///
/// There is no number variant: DynamoDB numbers are carried as strings so
/// no precision is lost on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JsonValue {
    Null,
    Bool(bool),
    String(String),
    Array(Vec<JsonValue>),
    Object(Object),
}

/// Convert an item to JSON bytes.
///
/// Null-valued attributes are left out of the output object entirely.
pub fn convert_to_json(item: &Item) -> Result<Vec<u8>> {
    let object = convert_item(item)?;
    Ok(serde_json::to_vec(&object)?)
}

/// Convert an item to an [`Object`] without encoding it.
pub fn convert_item(item: &Item) -> Result<Object> {
    convert_map(item, &mut FieldPath::new())
}

pub(crate) fn convert_map<'a>(
    map: &'a HashMap<String, AttributeValue>,
    path: &mut FieldPath<'a>,
) -> Result<Object> {
    let mut object = Object::new();

    // Walk keys in order so the first malformed field reported is stable
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    for (key, value) in entries {
        path.push_key(key);
        let converted = convert_field(value, path)?;
        path.pop();

        if converted != JsonValue::Null {
            object.insert(key.clone(), converted);
        }
    }

    Ok(object)
}

/// Convert a single attribute value found at `path`.
pub fn convert_field<'a>(value: &'a AttributeValue, path: &mut FieldPath<'a>) -> Result<JsonValue> {
    let converted = match value {
        AttributeValue::B(bytes) => JsonValue::String(BASE64_STANDARD.encode(bytes)),
        AttributeValue::Bs(set) => JsonValue::Array(
            set.iter()
                .map(|bytes| JsonValue::String(BASE64_STANDARD.encode(bytes)))
                .collect(),
        ),
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::L(list) => {
            let mut elements = Vec::with_capacity(list.len());
            for (i, element) in list.iter().enumerate() {
                path.push_index(i);
                elements.push(convert_field(element, path)?);
                path.pop();
            }
            JsonValue::Array(elements)
        }
        AttributeValue::M(map) => JsonValue::Object(convert_map(map, path)?),
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::N(s) | AttributeValue::S(s) => JsonValue::String(s.clone()),
        AttributeValue::Ns(set) | AttributeValue::Ss(set) => {
            JsonValue::Array(set.iter().cloned().map(JsonValue::String).collect())
        }
        AttributeValue::Unknown(tag) => {
            let path = path.to_string();
            error!(%path, %tag, "malformed attribute value");
            return Err(Error::MalformedAttribute {
                path,
                tag: tag.clone(),
            });
        }
    };

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.to_string())
    }

    fn render(item: &Item) -> String {
        String::from_utf8(convert_to_json(item).unwrap()).unwrap()
    }

    #[test]
    fn keys_are_sorted() {
        let item = Item::from([
            ("z".to_string(), s("1")),
            ("a".to_string(), s("2")),
            ("m".to_string(), s("3")),
        ]);

        assert_eq!(render(&item), r#"{"a":"2","m":"3","z":"1"}"#);
    }

    #[test]
    fn null_fields_are_dropped() {
        let item = Item::from([
            ("x".to_string(), AttributeValue::Null),
            ("y".to_string(), s("v")),
        ]);

        assert_eq!(render(&item), r#"{"y":"v"}"#);
    }

    #[test]
    fn nested_null_fields_are_dropped() {
        let item = Item::from([(
            "m".to_string(),
            AttributeValue::M(HashMap::from([
                ("gone".to_string(), AttributeValue::Null),
                ("kept".to_string(), AttributeValue::Bool(false)),
            ])),
        )]);

        assert_eq!(render(&item), r#"{"m":{"kept":false}}"#);
    }

    #[test]
    fn nulls_inside_lists_stay() {
        let item = Item::from([(
            "l".to_string(),
            AttributeValue::L(vec![AttributeValue::Null, s("x")]),
        )]);

        assert_eq!(render(&item), r#"{"l":[null,"x"]}"#);
    }

    #[test]
    fn numbers_stay_strings() {
        let item = Item::from([
            ("price".to_string(), n("72.99")),
            ("big".to_string(), n("123456789012345678901234567890")),
        ]);

        assert_eq!(
            render(&item),
            r#"{"big":"123456789012345678901234567890","price":"72.99"}"#
        );
    }

    #[test]
    fn binary_is_base64() {
        let item = Item::from([("b".to_string(), AttributeValue::B(b"01010101".to_vec()))]);

        assert_eq!(render(&item), r#"{"b":"MDEwMTAxMDE="}"#);
    }

    #[test]
    fn sets_keep_their_order() {
        let item = Item::from([(
            "ss".to_string(),
            AttributeValue::Ss(vec!["c".into(), "a".into(), "b".into()]),
        )]);

        assert_eq!(render(&item), r#"{"ss":["c","a","b"]}"#);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(render(&Item::new()), "{}");

        let item = Item::from([
            ("ss".to_string(), AttributeValue::Ss(vec![])),
            ("l".to_string(), AttributeValue::L(vec![])),
            ("m".to_string(), AttributeValue::M(HashMap::new())),
        ]);
        assert_eq!(render(&item), r#"{"l":[],"m":{},"ss":[]}"#);
    }

    #[test]
    fn conversion_is_deterministic() {
        let item = Item::from([
            ("b".to_string(), s("1")),
            ("a".to_string(), AttributeValue::L(vec![n("1"), n("2")])),
            (
                "c".to_string(),
                AttributeValue::M(HashMap::from([
                    ("y".to_string(), s("y")),
                    ("x".to_string(), s("x")),
                ])),
            ),
        ]);

        assert_eq!(convert_to_json(&item).unwrap(), convert_to_json(&item).unwrap());
    }

    #[test]
    fn unknown_tag_at_top_level() {
        let item = Item::from([
            ("ok".to_string(), s("fine")),
            ("bad".to_string(), AttributeValue::Unknown("X".to_string())),
        ]);

        let err = convert_to_json(&item).unwrap_err();

        assert!(err.is_malformed());
        match err {
            Error::MalformedAttribute { path, tag } => {
                assert_eq!(path, "bad");
                assert_eq!(tag, "X");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_tag_nested_in_list_and_map() {
        let item = Item::from([(
            "outer".to_string(),
            AttributeValue::M(HashMap::from([(
                "items".to_string(),
                AttributeValue::L(vec![s("a"), AttributeValue::Unknown("Q".to_string())]),
            )])),
        )]);

        let err = convert_item(&item).unwrap_err();

        assert_eq!(
            err.to_string(),
            "malformed attribute at 'outer.items.1': unknown type tag 'Q'"
        );
    }

    #[test]
    fn first_malformed_field_in_key_order_is_reported() {
        let item: Item = ["h", "c", "f", "a", "g", "b", "e", "d"]
            .into_iter()
            .map(|key| (key.to_string(), AttributeValue::Unknown("X".to_string())))
            .collect();

        for _ in 0..20 {
            let copy: Item = item.clone().into_iter().collect();
            let err = convert_to_json(&copy).unwrap_err();
            assert_eq!(
                err.to_string(),
                "malformed attribute at 'a': unknown type tag 'X'"
            );
        }
    }

    #[test]
    fn dotted_key_is_told_apart_from_nesting() {
        let flat = Item::from([(
            "a.b".to_string(),
            AttributeValue::Unknown("X".to_string()),
        )]);
        let nested = Item::from([(
            "a".to_string(),
            AttributeValue::M(HashMap::from([(
                "b".to_string(),
                AttributeValue::Unknown("X".to_string()),
            )])),
        )]);

        assert_eq!(
            convert_item(&flat).unwrap_err().to_string(),
            r#"malformed attribute at '"a.b"': unknown type tag 'X'"#
        );
        assert_eq!(
            convert_item(&nested).unwrap_err().to_string(),
            "malformed attribute at 'a.b': unknown type tag 'X'"
        );
    }
}
