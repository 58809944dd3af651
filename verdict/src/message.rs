//! Message lookup for failed fields.
//!
//! A failure is rendered through a [`Lookup`] by trying, in order, an
//! explicit override key, `"{rule}__{field}"`, and `"{rule}"`. The lookup
//! receives the failure's data merged with `field` and `name`, plus any
//! caller-supplied extras.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;
use crate::outcome::{Data, Failure, NAME_KEY};

/// Key under which the field name is passed to the lookup.
pub const FIELD_KEY: &str = "field";

/// Translation source used to render failure messages.
pub trait Lookup {
    /// Renders `key` with `data`.
    fn lookup(&self, key: &str, data: &Data) -> String;

    /// Check if `key` has a message.
    fn exists(&self, key: &str) -> bool;
}

impl<T: Lookup + ?Sized> Lookup for &T {
    fn lookup(&self, key: &str, data: &Data) -> String {
        (**self).lookup(key, data)
    }

    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }
}

/// Per-call options for [`Validator::message`](crate::Validator::message).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageOptions {
    key: Option<String>,
    data: Data,
}

impl MessageOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries `key` before the rule-derived keys.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Passes an extra entry to the lookup. Extras win over failure data.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Renders the message for `failure` on `field`.
pub(crate) fn render(failure: &Failure, field: &str, lookup: &impl Lookup, options: MessageOptions) -> String {
    let rule = failure.rule();
    let scoped = format!("{rule}__{field}");

    let key = options
        .key
        .filter(|key| lookup.exists(key))
        .or_else(|| lookup.exists(&scoped).then_some(scoped))
        .unwrap_or_else(|| rule.to_string());

    let mut data = failure.data().clone();
    data.insert(FIELD_KEY.to_string(), Value::String(field.to_string()));
    data.insert(NAME_KEY.to_string(), Value::String(rule.to_string()));
    data.extend(options.data);

    log::trace!("Rendering '{}' for field '{}'", key, field);
    lookup.lookup(&key, &data)
}

/// Replaces every `{param}` in `template` with the matching data entry.
///
/// Strings are inserted unquoted; other values in compact JSON. Unknown
/// parameters are left as written. The template is scanned once, so
/// braces inside inserted values are never expanded.
pub fn interpolate(template: &str, data: &Data) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        match data.get(&after[..close]) {
            Some(Value::String(s)) => result.push_str(s),
            Some(other) => result.push_str(&other.to_string()),
            None => {
                result.push('{');
                rest = after;
                continue;
            }
        }
        rest = &after[close + 1..];
    }
    result.push_str(rest);
    result
}

/// Flat key → template map.
///
/// # Example
///
/// ```
/// use verdict::{data, Lookup, MessageCatalog};
///
/// let catalog = MessageCatalog::from_json(r#"{"has_min_length": "At least {expected} characters"}"#)?;
/// assert_eq!(
///     catalog.lookup("has_min_length", &data! { "expected" => 2 }),
///     "At least 2 characters"
/// );
/// assert_eq!(catalog.lookup("missing", &data! {}), "missing");
/// # Ok::<(), verdict::error::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let catalog = Self::from_json(&json)?;
        log::debug!("Loaded {} messages from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Adds or replaces a template.
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    /// The raw template for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the catalog has no templates.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Lookup for MessageCatalog {
    fn lookup(&self, key: &str, data: &Data) -> String {
        match self.get(key) {
            Some(template) => interpolate(template, data),
            None => key.to_string(),
        }
    }

    fn exists(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}
