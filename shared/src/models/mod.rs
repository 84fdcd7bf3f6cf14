//! Data models
//!
//! Canonical records the storefront works with. Every payload received from
//! the remote catalog service is mapped into these types exactly once, at the
//! normalization boundary in `cotillon-catalog`; nothing downstream sees the
//! service's field-name variants.

pub mod cart;
pub mod category;
pub mod offer;
pub mod product;

// Re-exports
pub use cart::*;
pub use category::*;
pub use offer::*;
pub use product::*;
