//! Bundled fallback catalog
//!
//! Used when the catalog service cannot be reached. The dataset is embedded
//! at build time and goes through the same normalization boundary as remote
//! payloads.

use serde_json::Value;
use shared::models::Product;

use crate::error::CatalogResult;
use crate::index::CategoryIndex;
use crate::normalize::{NormalizeContext, list_items, normalize_products};

const BUNDLED_PRODUCTS: &str = include_str!("../data/fallback_products.json");

/// Normalized fallback products
#[derive(Debug, Clone, Default)]
pub struct FallbackCatalog {
    products: Vec<Product>,
}

impl FallbackCatalog {
    /// Load the embedded dataset
    pub fn bundled(api_base: &str) -> CatalogResult<Self> {
        Self::from_json(BUNDLED_PRODUCTS, api_base)
    }

    /// Load a dataset from JSON (bare array or list envelope)
    ///
    /// Records carry their category labels inline, so no category index is
    /// consulted and no offers apply.
    pub fn from_json(json: &str, api_base: &str) -> CatalogResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let index = CategoryIndex::default();
        let ctx = NormalizeContext {
            index: &index,
            offers: &[],
            api_base,
            now_millis: 0,
        };
        let products = normalize_products(&list_items(value), &ctx);
        tracing::debug!(count = products.len(), "Loaded fallback catalog");
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
