//! Cotillón catalog engine
//!
//! Category tree and product filtering for the storefront listing.
//!
//! # Module layout
//!
//! ```text
//! cotillon-catalog/src/
//! ├── text.rs          # diacritic folding, slugs, label ordering
//! ├── merchandising.rs # manual ranks, size groups, variant merge rules
//! ├── index.rs         # category lookup, paths, descendant sets
//! ├── tree.rs          # ordered category forest
//! ├── normalize/       # raw payload -> canonical records
//! ├── pricing.rs       # offers and discounts
//! ├── variants.rs      # attribute options, variant stock, listing merges
//! ├── filter.rs        # facet filter and sort
//! ├── pagination.rs    # page reconciliation and page window
//! ├── query.rs         # filter state <-> URL query string
//! ├── fallback.rs      # bundled offline dataset
//! ├── source.rs        # catalog service trait
//! └── controller.rs    # fetch generations, fallback switching
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod index;
pub mod logger;
pub mod merchandising;
pub mod normalize;
pub mod pagination;
pub mod pricing;
pub mod query;
pub mod source;
pub mod text;
pub mod tree;
pub mod variants;

pub use config::CatalogConfig;
pub use controller::{CatalogController, Commit, FetchOutcome, FetchTicket, Listing};
pub use error::{CatalogError, CatalogResult};
pub use fallback::FallbackCatalog;
pub use filter::{FacetFilter, FilterChange, FilterOutcome, FilterState};
pub use index::{CategoryIndex, descendant_ids};
pub use logger::{init_logger, init_logger_with_file};
pub use merchandising::MerchandisingConfig;
pub use pagination::{LoadPhase, PageItem, PaginationReconciler, page_window};
pub use source::CatalogSource;
pub use tree::{CategoryTreeNode, build_forest};
