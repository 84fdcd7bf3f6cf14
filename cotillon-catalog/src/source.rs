//! Remote catalog collaborator
//!
//! Payloads are returned raw; the controller runs them through the
//! normalization boundary.

use async_trait::async_trait;
use serde_json::Value;
use shared::page::ProductPage;
use shared::request::ProductListRequest;

use crate::error::CatalogResult;

/// Catalog service as seen by the engine
///
/// Implementations own timeouts and transport errors. Any `Err` makes the
/// controller fall back to the bundled dataset for that attempt; nothing is
/// retried.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Flat category list
    async fn list_categories(&self) -> CatalogResult<Vec<Value>>;

    /// One page of products for the request
    async fn list_products(&self, request: &ProductListRequest) -> CatalogResult<ProductPage>;

    /// Offers used for discount overlays
    async fn list_offers(&self) -> CatalogResult<Vec<Value>>;
}
