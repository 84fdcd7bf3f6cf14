//! Product Model

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CategoryId;

/// Discount overlay applied to a listed product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Whole percentage (e.g. 15 = 15%)
    pub percent: u32,
    /// Offer that produced this discount, when it came from an offer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
}

/// Product listing projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price after discount. Zero means "contact for quote".
    pub price: Decimal,
    /// Price before discount
    pub original_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub image_url: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Ancestor labels, root first, ending with the product's own category
    #[serde(default)]
    pub category_path: Vec<String>,
    /// Attribute name -> selectable options
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Attribute name -> option -> units in stock
    #[serde(default)]
    pub attribute_stock: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_true", deserialize_with = "crate::serde_helpers::bool_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Whether the product carries a listable price
    pub fn has_price(&self) -> bool {
        self.price > Decimal::ZERO
    }

    /// Innermost category label, if the path is known
    pub fn category_label(&self) -> Option<&str> {
        self.category_path.last().map(String::as_str)
    }

    /// Parent of the innermost category, if any
    pub fn parent_category_label(&self) -> Option<&str> {
        let len = self.category_path.len();
        if len > 1 {
            self.category_path.get(len - 2).map(String::as_str)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn decode(extra: Value) -> Product {
        let mut raw = json!({
            "id": "a",
            "name": "Globo",
            "price": 50,
            "original_price": 50,
            "image_url": "",
        });
        if let (Some(obj), Value::Object(extra)) = (raw.as_object_mut(), extra) {
            obj.extend(extra);
        }
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_active_flag_defaults_to_true() {
        assert!(decode(json!({})).active);
        assert!(decode(json!({"active": null})).active);
        assert!(!decode(json!({"active": false})).active);
    }
}
