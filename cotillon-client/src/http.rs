//! HTTP client for the catalog service

use async_trait::async_trait;
use cotillon_catalog::normalize::list_items;
use cotillon_catalog::{CatalogResult, CatalogSource};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::page::ProductPage;
use shared::request::ProductListRequest;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const CATEGORIES_PATH: &str = "api/products/categories/";
const PRODUCTS_PATH: &str = "api/products/";
const OFFERS_PATH: &str = "api/products/offers/";

/// HTTP client for making requests to the catalog service
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with URL query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path)).query(query);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Catalog API ==========

    /// Flat category list, unwrapped from any list envelope
    pub async fn list_categories(&self) -> ClientResult<Vec<Value>> {
        let body: Value = self.get(CATEGORIES_PATH).await?;
        Ok(list_items(body))
    }

    /// One page of raw products
    pub async fn list_products(&self, request: &ProductListRequest) -> ClientResult<ProductPage> {
        let body: Value = self.get_with_query(PRODUCTS_PATH, request).await?;
        let page = ProductPage::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("product page: {e}")))?;
        tracing::debug!(
            items = page.items.len(),
            total = ?page.total,
            page = request.page,
            "Products received"
        );
        Ok(page)
    }

    /// Offers, unwrapped from any list envelope
    pub async fn list_offers(&self) -> ClientResult<Vec<Value>> {
        let body: Value = self.get(OFFERS_PATH).await?;
        Ok(list_items(body))
    }
}

#[async_trait]
impl CatalogSource for HttpClient {
    async fn list_categories(&self) -> CatalogResult<Vec<Value>> {
        Ok(HttpClient::list_categories(self).await?)
    }

    async fn list_products(&self, request: &ProductListRequest) -> CatalogResult<ProductPage> {
        Ok(HttpClient::list_products(self, request).await?)
    }

    async fn list_offers(&self) -> CatalogResult<Vec<Value>> {
        Ok(HttpClient::list_offers(self).await?)
    }
}
