//! Shared types for the Cotillón storefront
//!
//! Canonical catalog records, the product list contract spoken with the
//! remote catalog service, and small serde/time helpers used by both the
//! catalog engine and the HTTP client.

pub mod models;
pub mod page;
pub mod request;
pub mod serde_helpers;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{CartItem, Category, CategoryId, Discount, Offer, Product};
pub use page::{PaginatedResponse, ProductPage};
pub use request::{ProductListRequest, SortKey};
