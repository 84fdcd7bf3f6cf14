//! Cotillón storefront client
//!
//! HTTP access to the catalog service and the locally persisted cart.

pub mod cart;
pub mod config;
pub mod error;
pub mod http;

pub use cart::{CartSlot, CartStorage, CartStore, JsonFileCartStorage, MemoryCartStorage};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
