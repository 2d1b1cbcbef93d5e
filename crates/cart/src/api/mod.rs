//! Stock and product catalog lookups.
//!
//! # Architecture
//!
//! - [`CatalogApi`] is the seam the cart store depends on
//! - [`ApiClient`] implements it over HTTP with `reqwest`
//! - Product lookups are cached in-memory via `moka`; stock lookups are not
//!
//! # Endpoints
//!
//! - `GET {base_url}/stock/{id}` - `{ "id": 1, "amount": 3 }`
//! - `GET {base_url}/products/{id}` - `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`

mod client;

use std::future::Future;
use std::sync::Arc;

pub use client::ApiClient;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the stock/product service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read-only access to stock levels and catalog data.
pub trait CatalogApi: Send + Sync {
    /// Available stock for a product.
    fn stock(&self, product_id: ProductId) -> impl Future<Output = Result<Stock, ApiError>> + Send;

    /// Catalog data for a product.
    fn product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;
}

impl<T: CatalogApi> CatalogApi for Arc<T> {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, ApiError> {
        (**self).stock(product_id).await
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        (**self).product(product_id).await
    }
}
