//! Offer Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CategoryId;

/// Promotional offer targeting a product or a whole category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Percentage off (e.g. 20 = 20%)
    pub percent: Decimal,
    /// Valid from (Unix millis), open when absent
    #[serde(default)]
    pub starts_at: Option<i64>,
    /// Valid until (Unix millis), open when absent
    #[serde(default)]
    pub ends_at: Option<i64>,
    #[serde(default = "default_true", deserialize_with = "crate::serde_helpers::bool_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Offer {
    /// Whether the offer applies at the given instant
    pub fn is_active_at(&self, now_millis: i64) -> bool {
        if !self.active {
            return false;
        }
        let starts_ok = self.starts_at.is_none_or(|s| s <= now_millis);
        let ends_ok = self.ends_at.is_none_or(|e| e >= now_millis);
        starts_ok && ends_ok
    }

    /// Whether the offer targets this product, directly or through its category
    pub fn targets(&self, product_id: &str, category_id: Option<CategoryId>) -> bool {
        if self.product_id.as_deref() == Some(product_id) {
            return true;
        }
        matches!((self.category_id, category_id), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> Offer {
        Offer {
            id: Some("of-1".to_string()),
            product_id: Some("p-1".to_string()),
            category_id: Some(7),
            percent: Decimal::from(10),
            starts_at: Some(1_000),
            ends_at: Some(2_000),
            active: true,
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let o = offer();
        assert!(!o.is_active_at(999));
        assert!(o.is_active_at(1_000));
        assert!(o.is_active_at(2_000));
        assert!(!o.is_active_at(2_001));
    }

    #[test]
    fn test_inactive_flag_wins_over_window() {
        let mut o = offer();
        o.active = false;
        assert!(!o.is_active_at(1_500));
    }

    #[test]
    fn test_open_window() {
        let mut o = offer();
        o.starts_at = None;
        o.ends_at = None;
        assert!(o.is_active_at(i64::MAX));
    }

    #[test]
    fn test_targets_product_or_category() {
        let o = offer();
        assert!(o.targets("p-1", None));
        assert!(o.targets("other", Some(7)));
        assert!(!o.targets("other", Some(8)));
        assert!(!o.targets("other", None));
    }
}
