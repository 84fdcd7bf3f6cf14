//! Paging envelopes
//!
//! `ProductPage` is what the catalog service answers to a product list
//! request, still carrying raw item payloads. `PaginatedResponse` is the
//! typed, reconciled page handed to the storefront.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw product list response from the catalog service
///
/// The service answers either `{items, total, pages}` or a bare array; both
/// decode into this shape. Items stay untyped until normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default, alias = "results")]
    pub items: Vec<Value>,
    #[serde(default, alias = "count")]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
}

impl ProductPage {
    /// Decode a response body that is either an envelope or a bare array
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(items) => Ok(Self {
                items,
                total: None,
                pages: None,
            }),
            other => serde_json::from_value(other),
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Items on the current page
    pub data: Vec<T>,
    /// Total matching records
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total pages, never below 1
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = total_pages(total, limit);
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Single-page response (no pagination)
    pub fn single_page(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            data,
            total,
            page: 1,
            limit: total as u32,
            total_pages: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Number of pages needed for `total` records at `limit` per page (min 1)
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(100, 0), 1);
    }

    #[test]
    fn test_product_page_from_envelope() {
        let page = ProductPage::from_value(json!({
            "items": [{"id": "a"}],
            "total": 40,
            "pages": 4
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(40));
        assert_eq!(page.pages, Some(4));
    }

    #[test]
    fn test_product_page_from_bare_array() {
        let page = ProductPage::from_value(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, None);
    }
}
