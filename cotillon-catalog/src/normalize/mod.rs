//! Payload normalization boundary
//!
//! Every raw record from the catalog service passes through here exactly
//! once. Field-name variants (`nombre`/`name`, `precio`/`price`, ...) are
//! resolved in this module and nowhere else; downstream code only sees the
//! canonical records from `shared::models`.

mod category;
mod offer;
mod product;

pub use category::{normalize_categories, normalize_category};
pub use offer::{normalize_offer, normalize_offers};
pub use product::{NormalizeContext, normalize_product, normalize_products, resolve_image_url};

use serde_json::Value;

/// Unwrap a list payload: a bare array, `{results: [...]}` or `{items: [...]}`
///
/// Anything else yields no items.
pub fn list_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => ["results", "items"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
