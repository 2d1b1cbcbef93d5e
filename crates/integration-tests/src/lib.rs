//! Integration tests for the Rocketshoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! Each test starts its own [`MockCatalog`]: an in-process `axum` server on
//! an ephemeral port serving `/stock/{id}` and `/products/{id}`, so the real
//! HTTP client, file storage and cart store run end to end without any
//! external service.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::CartConfig;
use serde_json::{Value, json};

/// Canned responses served by the mock catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    stock: HashMap<i32, Value>,
    products: HashMap<i32, Value>,
    failing: HashMap<i32, StatusCode>,
    stock_hits: AtomicUsize,
    product_hits: AtomicUsize,
}

impl Catalog {
    /// Register stock for a product.
    #[must_use]
    pub fn stock(mut self, id: i32, amount: u32) -> Self {
        self.stock.insert(id, json!({ "id": id, "amount": amount }));
        self
    }

    /// Register a raw stock body, for malformed-response tests.
    #[must_use]
    pub fn raw_stock(mut self, id: i32, body: Value) -> Self {
        self.stock.insert(id, body);
        self
    }

    /// Register catalog data for a product.
    #[must_use]
    pub fn product(mut self, id: i32, title: &str, price: f64) -> Self {
        self.products.insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://rocketseat-cdn.example/sneakers/{id}.jpg"),
            }),
        );
        self
    }

    /// Make every request for a product id fail with `status`.
    #[must_use]
    pub fn failing(mut self, id: i32, status: StatusCode) -> Self {
        self.failing.insert(id, status);
        self
    }
}

/// A running mock stock/product service.
pub struct MockCatalog {
    addr: SocketAddr,
    catalog: Arc<Catalog>,
}

impl MockCatalog {
    /// Bind to an ephemeral port and start serving `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&catalog));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock catalog");
        let addr = listener.local_addr().expect("mock catalog address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, catalog }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.catalog.stock_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.catalog.product_hits.load(Ordering::SeqCst)
    }

    /// Cart configuration pointing at this service and a fresh storage file.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    pub fn config(&self, storage_path: &std::path::Path, locale: &str) -> CartConfig {
        let vars: HashMap<&str, String> = HashMap::from([
            ("CART_API_BASE_URL", self.base_url()),
            ("CART_HTTP_TIMEOUT_SECS", "5".to_string()),
            ("CART_STORAGE_PATH", storage_path.display().to_string()),
            ("CART_LOCALE", locale.to_string()),
        ]);
        CartConfig::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
    }
}

/// A unique storage file path under the system temp directory.
#[must_use]
pub fn temp_storage_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("rocketshoes_it_{}", uuid::Uuid::new_v4()))
        .join("storage.json")
}

async fn stock(
    State(catalog): State<Arc<Catalog>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, StatusCode> {
    catalog.stock_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = catalog.failing.get(&id) {
        return Err(*status);
    }
    catalog
        .stock
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn product(
    State(catalog): State<Arc<Catalog>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, StatusCode> {
    catalog.product_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = catalog.failing.get(&id) {
        return Err(*status);
    }
    catalog
        .products
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
