//! HTTP client for the stock/product service.
//!
//! Uses `reqwest` for HTTP. Caches products using `moka` (TTL from
//! configuration, 5 minutes by default). Stock is always fetched fresh since
//! it gates every cart mutation.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{ApiError, CatalogApi};
use crate::config::ApiConfig;

/// Maximum number of products kept in the cache.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Client for the stock/product service.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    products: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                products,
            }),
        })
    }

    /// GET `{base_url}/{path}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog service returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog service response"
            );
            ApiError::Parse(e.to_string())
        })
    }
}

impl CatalogApi for ApiClient {
    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn stock(&self, product_id: ProductId) -> Result<Stock, ApiError> {
        let stock: Stock = self.get_json(&format!("stock/{product_id}")).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }

    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("Product cache hit");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{product_id}")).await?;
        if product.id != product_id {
            return Err(ApiError::Parse(format!(
                "requested product {product_id}, received product {}",
                product.id
            )));
        }

        self.inner.products.insert(product_id, product.clone()).await;
        debug!("Fetched product");
        Ok(product)
    }
}
