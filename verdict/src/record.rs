//! Read access to a whole record, for rules that look at sibling fields.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// A record that rules can inspect by field name.
///
/// Typed structs usually derive this with `#[derive(Record)]`; dynamic
/// records (`serde_json::Map`, `HashMap<String, Value>`) implement it
/// directly.
///
/// # Example
///
/// ```
/// use serde::Serialize;
/// use verdict::Record;
///
/// #[derive(Clone, Serialize, Record)]
/// struct Signup {
///     password: String,
///     #[record(rename = "confirm")]
///     password_confirmation: String,
///     #[record(skip)]
///     session: u64,
/// }
///
/// let signup = Signup {
///     password: "hunter2".into(),
///     password_confirmation: "hunter2".into(),
///     session: 7,
/// };
/// assert_eq!(signup.get("confirm"), Some(serde_json::json!("hunter2")));
/// assert_eq!(signup.get("session"), None);
/// ```
pub trait Record: Clone + Send + Sync + 'static {
    /// Returns a dynamic view of the named field, or `None` if the record has no such field.
    fn get(&self, field: &str) -> Option<Value>;
}

/// Serializes a field for [`Record::get`].
///
/// Values that fail to serialize (e.g. maps with non-string keys) read as absent.
pub fn field_value<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Record field failed to serialize: {}", err);
            None
        }
    }
}

impl Record for Map<String, Value> {
    fn get(&self, field: &str) -> Option<Value> {
        Map::get(self, field).cloned()
    }
}

impl Record for HashMap<String, Value> {
    fn get(&self, field: &str) -> Option<Value> {
        HashMap::get(self, field).cloned()
    }
}

impl Record for () {
    fn get(&self, _field: &str) -> Option<Value> {
        None
    }
}
