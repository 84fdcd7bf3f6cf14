use std::path::Path;

use crate::error::{CatalogError, CatalogResult};
use crate::merchandising::MerchandisingConfig;

/// Catalog configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | CATALOG_API_BASE | http://localhost:8000 | Catalog service base URL |
/// | CATALOG_REQUEST_TIMEOUT_MS | 15000 | HTTP timeout (ms) |
/// | CATALOG_DEFAULT_PAGE_SIZE | 12 | Default page size |
/// | CATALOG_PAGE_SIZES | 12,24,48 | Page sizes a URL may request |
/// | CATALOG_MERCHANDISING_FILE | (unset) | JSON replacing the built-in merchandising table |
/// | CATALOG_LOG_LEVEL | info | Logger level |
///
/// # Example
///
/// ```ignore
/// CATALOG_API_BASE=https://api.example.com CATALOG_PAGE_SIZES=12,24 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Catalog service base URL, also the prefix for relative image paths
    pub api_base: String,
    /// Request timeout (ms)
    pub request_timeout_ms: u64,
    /// Page size used when the URL does not name an allowed one
    pub default_page_size: u32,
    /// Allowed page sizes
    pub page_sizes: Vec<u32>,
    /// Manual ordering and label heuristics
    pub merchandising: MerchandisingConfig,
    /// Logger level
    pub log_level: String,
}

impl CatalogConfig {
    /// Load from environment variables (a `.env` file is honoured)
    ///
    /// Unset or unparsable values fall back to defaults. A merchandising file
    /// that cannot be loaded is logged and the built-in table is used.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let default_page_size = std::env::var("CATALOG_DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|p| p.parse().ok())
            .filter(|p: &u32| *p > 0)
            .unwrap_or(12);

        let page_sizes = std::env::var("CATALOG_PAGE_SIZES")
            .ok()
            .map(|v| parse_page_sizes(&v))
            .filter(|sizes| !sizes.is_empty())
            .unwrap_or_else(|| vec![12, 24, 48]);

        let merchandising = match std::env::var("CATALOG_MERCHANDISING_FILE") {
            Ok(path) => load_merchandising(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path, error = %e, "Merchandising file rejected, using built-in table");
                MerchandisingConfig::default()
            }),
            Err(_) => MerchandisingConfig::default(),
        };

        Self {
            api_base: std::env::var("CATALOG_API_BASE")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            request_timeout_ms: std::env::var("CATALOG_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15_000),
            default_page_size,
            page_sizes,
            merchandising,
            log_level: std::env::var("CATALOG_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Set the catalog service base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the allowed page sizes and the default
    pub fn with_page_sizes(mut self, default_page_size: u32, page_sizes: Vec<u32>) -> Self {
        self.default_page_size = default_page_size;
        self.page_sizes = page_sizes;
        self
    }

    /// Replace the merchandising table
    pub fn with_merchandising(mut self, merchandising: MerchandisingConfig) -> Self {
        self.merchandising = merchandising;
        self
    }

    /// Map a requested page size onto an allowed one
    pub fn page_size_or_default(&self, requested: u32) -> u32 {
        if self.page_sizes.contains(&requested) {
            requested
        } else {
            self.default_page_size
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> CatalogResult<()> {
        if self.default_page_size == 0 {
            return Err(CatalogError::Config("default page size must be positive".into()));
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            return Err(CatalogError::Config(format!(
                "default page size {} is not among allowed sizes {:?}",
                self.default_page_size, self.page_sizes
            )));
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".into(),
            request_timeout_ms: 15_000,
            default_page_size: 12,
            page_sizes: vec![12, 24, 48],
            merchandising: MerchandisingConfig::default(),
            log_level: "info".into(),
        }
    }
}

fn parse_page_sizes(value: &str) -> Vec<u32> {
    value
        .split(',')
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .filter(|s| *s > 0)
        .collect()
}

/// Read a merchandising table from a JSON file
pub fn load_merchandising(path: impl AsRef<Path>) -> CatalogResult<MerchandisingConfig> {
    let json = std::fs::read_to_string(path)?;
    MerchandisingConfig::from_json(&json)
}
