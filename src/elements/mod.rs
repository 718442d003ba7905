//! Element types, payloads and the registry of kinds the backend understands.

pub mod catalog;
pub mod defaults;
pub mod validation;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use catalog::{ElementCatalog, ElementKind, FieldGroup};
pub use defaults::{CatalogDefaults, DefaultDataProvider};
pub use validation::{CatalogValidator, ElementValidator, ValidationResult};

/// Tag selecting which validator, default provider and endpoint apply.
///
/// The workflow treats it as an opaque key; only the catalog gives it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementType(String);

impl ElementType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Field name to value mapping submitted for creation.
pub type ElementData = serde_json::Map<String, Value>;

/// Persisted entity as returned by the creation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Element(Value);

impl Element {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Server-assigned identifier, when the backend returns one.
    pub fn uuid(&self) -> Option<&str> {
        self.0
            .get("uuid")
            .or_else(|| self.0.get("id"))
            .and_then(Value::as_str)
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Raw value of `key`, or `""` when the key is absent.
pub(crate) fn value_or_blank(data: &ElementData, key: &str) -> Value {
    data.get(key).cloned().unwrap_or_else(|| Value::String(String::new()))
}

/// Whether `key` holds something other than null or a blank string.
/// Numbers, booleans and containers count as filled in.
pub(crate) fn is_filled(data: &ElementData, key: &str) -> bool {
    match data.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    }
}

/// Read a nested object, if present.
pub(crate) fn object_field<'a>(data: &'a ElementData, key: &str) -> Option<&'a ElementData> {
    data.get(key).and_then(Value::as_object)
}

/// Whether `key` holds a non-empty JSON array.
pub(crate) fn has_items(data: &ElementData, key: &str) -> bool {
    data.get(key)
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_uuid_prefers_uuid_over_id() {
        let element = Element::new(json!({"uuid": "abc", "id": "u1"}));
        assert_eq!(element.uuid(), Some("abc"));

        let element = Element::new(json!({"id": "u1", "name": "Login"}));
        assert_eq!(element.uuid(), Some("u1"));

        let element = Element::new(json!({"name": "Login"}));
        assert_eq!(element.uuid(), None);
    }

    #[test]
    fn test_element_type_serializes_as_plain_string() {
        let tag = ElementType::from("threat");
        assert_eq!(serde_json::to_value(&tag).unwrap(), json!("threat"));
        assert_eq!(tag.to_string(), "threat");
    }

    #[test]
    fn test_field_helpers_tolerate_missing_keys() {
        let data = json!({"name": "Login", "references": [], "standards": [{"ref": "x"}]});
        let data = data.as_object().unwrap();
        assert!(is_filled(data, "name"));
        assert!(!is_filled(data, "desc"));
        assert!(!has_items(data, "references"));
        assert!(has_items(data, "standards"));
        assert!(!has_items(data, "missing"));
        assert!(object_field(data, "test").is_none());
    }

    #[test]
    fn test_filled_and_raw_values_keep_non_strings() {
        let data = json!({"cost": 3, "state": " ", "impact": null, "steps": ["a"]});
        let data = data.as_object().unwrap();
        assert!(is_filled(data, "cost"));
        assert!(is_filled(data, "steps"));
        assert!(!is_filled(data, "state"));
        assert!(!is_filled(data, "impact"));
        assert!(!is_filled(data, "missing"));

        assert_eq!(value_or_blank(data, "cost"), json!(3));
        assert_eq!(value_or_blank(data, "impact"), Value::Null);
        assert_eq!(value_or_blank(data, "missing"), json!(""));
    }

    #[test]
    fn test_element_into_value_returns_payload() {
        let payload = json!({"uuid": "u1", "name": "Login"});
        assert_eq!(Element::from(payload.clone()).into_value(), payload);
    }
}
