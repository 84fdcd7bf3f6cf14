//! Cart Model

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line in the shopping cart
///
/// A line is identified by the product id together with the chosen
/// attribute values, so two colours of the same product are two lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    pub quantity: u32,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl CartItem {
    /// Line subtotal
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Whether this line holds the given product variant
    pub fn is_same_line(&self, id: &str, attributes: &BTreeMap<String, String>) -> bool {
        self.id == id && &self.attributes == attributes
    }
}
