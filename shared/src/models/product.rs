//! Product Model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_helpers;

/// Inventory item as delivered by the item feed
///
/// Only the identifier and category references are interpreted by the
/// engine; every other field is carried through to the transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProduct {
    #[serde(rename = "item_id", deserialize_with = "serde_helpers::string_or_number")]
    pub id: String,
    #[serde(rename = "category_id", default, deserialize_with = "serde_helpers::id_list")]
    pub category_ids: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SourceProduct {
    pub fn new(id: impl Into<String>, category_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            category_ids,
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mostly for tests and fixtures
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Feed sequence number this item was published under, if the feed sent one
    pub fn update_seq(&self) -> Option<u64> {
        match self.fields.get("update_seq")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// One page of the item feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPage {
    pub items: Vec<SourceProduct>,
    /// Cursor to resume from on the next pull
    pub next_cursor: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let json = r#"{
            "item_id": 118748,
            "category_id": [4, "7"],
            "item_desc": "Brass fitting",
            "qty_avail": 12,
            "update_seq": "905"
        }"#;
        let product: SourceProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, "118748");
        assert_eq!(product.category_ids, vec!["4".to_string(), "7".to_string()]);
        assert_eq!(product.field_str("item_desc"), Some("Brass fitting"));
        assert_eq!(product.update_seq(), Some(905));
        assert!(!product.fields.contains_key("item_id"));
    }

    #[test]
    fn test_null_categories_become_empty() {
        let product: SourceProduct =
            serde_json::from_str(r#"{"item_id": "A1", "category_id": null}"#).unwrap();
        assert!(product.category_ids.is_empty());

        let product: SourceProduct = serde_json::from_str(r#"{"item_id": "A1"}"#).unwrap();
        assert!(product.category_ids.is_empty());
    }

    #[test]
    fn test_serialize_round_trips_wire_names() {
        let product = SourceProduct::new("9", vec!["1".into()]).with_field("short_code", "SC-9");
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["item_id"], "9");
        assert_eq!(value["category_id"][0], "1");
        assert_eq!(value["short_code"], "SC-9");
    }
}
