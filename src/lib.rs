//! Convert DynamoDB tagged attribute values into plain JSON.
//!
//! ```
//! use dynojson::{convert_to_json, AttributeValue, Item};
//!
//! let item = Item::from([
//!     ("price".to_string(), AttributeValue::N("72.99".to_string())),
//!     ("deleted".to_string(), AttributeValue::Null),
//! ]);
//!
//! assert_eq!(convert_to_json(&item).unwrap(), br#"{"price":"72.99"}"#);
//! ```

pub mod attribute;
pub mod convert;
pub mod error;
pub mod path;
pub mod scan;
pub mod stream;

pub use attribute::{item_from_json, item_from_sdk, items_from_slice, AttributeValue, Item, Tag};
pub use convert::{convert_field, convert_item, convert_to_json, JsonValue, Object};
pub use error::{Error, Result};
pub use path::FieldPath;
pub use stream::{convert_event, ChangeRecord, Event};
