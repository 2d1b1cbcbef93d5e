//! End-to-end tests for the cart store against a mock stock/product service.
//!
//! These tests drive the real HTTP client and file storage, verifying that
//! every successful mutation is written through to disk and survives a
//! reopen, and that rejected mutations leave the stored cart untouched.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use rocketshoes_cart::storage::{FileStorage, KeyValueStorage};
use rocketshoes_cart::{DefaultCartStore, NotificationKind, Severity, UpdateProductAmount};
use rocketshoes_core::{Cart, CurrencyCode, ProductId};
use rocketshoes_integration_tests::{Catalog, MockCatalog, temp_storage_path};
use rust_decimal::Decimal;
use serde_json::json;

const KEY: &str = "@RocketShoes:cart";

fn stored_cart(path: &std::path::Path) -> Option<Cart> {
    FileStorage::new(path)
        .get_item(KEY)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

fn cleanup(path: &std::path::Path) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

// =============================================================================
// add_product
// =============================================================================

#[tokio::test]
async fn test_add_new_product_fetches_catalog_and_persists() {
    let mock = MockCatalog::start(Catalog::default().stock(5, 10).product(5, "Shoe", 179.9)).await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    store.add_product(ProductId::new(5)).await;

    let cart = store.cart();
    assert_eq!(cart.len(), 1);
    let item = &cart.items()[0];
    assert_eq!(item.id, ProductId::new(5));
    assert_eq!(item.title, "Shoe");
    assert_eq!(item.amount, 1);
    assert_eq!(item.price, Decimal::new(1799, 1));
    assert_eq!(item.image_url, "https://rocketseat-cdn.example/sneakers/5.jpg");

    assert_eq!(stored_cart(&path), Some(cart));
    assert!(notifications.try_recv().is_err());

    cleanup(&path);
}

#[tokio::test]
async fn test_add_at_stock_limit_warns() {
    let mock = MockCatalog::start(Catalog::default().stock(1, 2).product(1, "Tênis", 139.9)).await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "pt-BR")).unwrap();

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;
    assert_eq!(store.cart().items()[0].amount, 2);
    let before = stored_cart(&path);

    store.add_product(ProductId::new(1)).await;

    assert_eq!(store.cart().items()[0].amount, 2);
    assert_eq!(stored_cart(&path), before);

    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.kind, NotificationKind::QuantityUnavailable);
    assert_eq!(notification.severity, Severity::Warning);
    assert_eq!(notification.message, "Quantidade solicitada fora de estoque");

    cleanup(&path);
}

#[tokio::test]
async fn test_add_reuses_cached_product() {
    let mock = MockCatalog::start(Catalog::default().stock(3, 5).product(3, "Runner", 99.0)).await;
    let path = temp_storage_path();
    let (store, _) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    store.add_product(ProductId::new(3)).await;
    store.remove_product(ProductId::new(3));
    store.add_product(ProductId::new(3)).await;

    assert_eq!(store.cart().items()[0].amount, 1);
    assert_eq!(mock.product_hits(), 1);
    assert_eq!(mock.stock_hits(), 2);

    cleanup(&path);
}

#[tokio::test]
async fn test_add_accepts_stock_without_id() {
    let mock = MockCatalog::start(
        Catalog::default()
            .raw_stock(6, json!({ "amount": 3 }))
            .product(6, "Court", 120.0),
    )
    .await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    store.add_product(ProductId::new(6)).await;
    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(6),
            amount: 3,
        })
        .await;

    assert_eq!(store.cart().items()[0].amount, 3);
    assert_eq!(stored_cart(&path), Some(store.cart()));
    assert!(notifications.try_recv().is_err());

    cleanup(&path);
}

#[tokio::test]
async fn test_add_with_negative_stock_warns() {
    let mock = MockCatalog::start(
        Catalog::default()
            .raw_stock(9, json!({ "amount": -1 }))
            .product(9, "Oversold", 60.0),
    )
    .await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    store.add_product(ProductId::new(9)).await;

    assert!(store.cart().is_empty());
    assert_eq!(
        notifications.try_recv().unwrap().kind,
        NotificationKind::QuantityUnavailable
    );
    assert_eq!(mock.product_hits(), 0);

    cleanup(&path);
}

#[tokio::test]
async fn test_add_malformed_stock_reports_add_failed() {
    let mock = MockCatalog::start(
        Catalog::default()
            .raw_stock(13, json!({ "id": 13, "amount": "plenty" }))
            .product(13, "Odd", 10.0),
    )
    .await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    store.add_product(ProductId::new(13)).await;

    assert!(store.cart().is_empty());
    assert_eq!(stored_cart(&path), None);
    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.kind, NotificationKind::AddFailed);
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(notification.message, "Failed to add product");

    cleanup(&path);
}

#[tokio::test]
async fn test_add_server_error_reports_add_failed() {
    let mock = MockCatalog::start(
        Catalog::default().failing(2, StatusCode::INTERNAL_SERVER_ERROR),
    )
    .await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    store.add_product(ProductId::new(2)).await;

    assert!(store.cart().is_empty());
    assert_eq!(
        notifications.try_recv().unwrap().kind,
        NotificationKind::AddFailed
    );

    cleanup(&path);
}

// =============================================================================
// remove_product / update_product_amount
// =============================================================================

#[tokio::test]
async fn test_remove_keeps_others_in_order() {
    let mock = MockCatalog::start(
        Catalog::default()
            .stock(1, 3)
            .stock(2, 3)
            .stock(3, 3)
            .product(1, "One", 10.0)
            .product(2, "Two", 20.0)
            .product(3, "Three", 30.0),
    )
    .await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    for id in [1, 2, 3] {
        store.add_product(ProductId::new(id)).await;
    }
    store.remove_product(ProductId::new(2));

    let ids: Vec<i32> = store.cart().items().iter().map(|i| i.id.as_i32()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(stored_cart(&path), Some(store.cart()));

    store.remove_product(ProductId::new(2));
    assert_eq!(
        notifications.try_recv().unwrap().kind,
        NotificationKind::RemoveFailed
    );
    assert_eq!(store.cart().len(), 2);

    cleanup(&path);
}

#[tokio::test]
async fn test_update_amount_checks_stock() {
    let mock = MockCatalog::start(Catalog::default().stock(4, 5).product(4, "Trail", 250.0)).await;
    let path = temp_storage_path();
    let (store, mut notifications) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();
    store.add_product(ProductId::new(4)).await;

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(4),
            amount: 5,
        })
        .await;
    assert_eq!(store.cart().items()[0].amount, 5);
    assert_eq!(stored_cart(&path), Some(store.cart()));

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(4),
            amount: 6,
        })
        .await;
    assert_eq!(store.cart().items()[0].amount, 5);
    assert_eq!(
        notifications.try_recv().unwrap().kind,
        NotificationKind::QuantityUnavailable
    );

    let hits = mock.stock_hits();
    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(4),
            amount: 0,
        })
        .await;
    assert_eq!(mock.stock_hits(), hits);
    assert!(notifications.try_recv().is_err());

    cleanup(&path);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_cart_survives_reopen() {
    let mock = MockCatalog::start(
        Catalog::default()
            .stock(7, 4)
            .stock(8, 4)
            .product(7, "Seven", 70.0)
            .product(8, "Eight", 80.5),
    )
    .await;
    let path = temp_storage_path();
    let config = mock.config(&path, "en");

    let (store, _) = DefaultCartStore::open(&config).unwrap();
    store.add_product(ProductId::new(8)).await;
    store.add_product(ProductId::new(7)).await;
    store.add_product(ProductId::new(8)).await;
    let expected = store.cart();
    drop(store);

    let (reopened, _) = DefaultCartStore::open(&config).unwrap();
    assert_eq!(reopened.cart(), expected);
    assert_eq!(reopened.cart().total_quantity(), 3);
    assert_eq!(reopened.cart().total(), Decimal::new(2310, 1));
    assert_eq!(
        reopened.cart().total_price(CurrencyCode::BRL).display(),
        "R$ 231.00"
    );

    cleanup(&path);
}

#[tokio::test]
async fn test_corrupt_storage_opens_empty() {
    let mock = MockCatalog::start(Catalog::default()).await;
    let path = temp_storage_path();
    FileStorage::new(&path).set_item(KEY, "[{\"id\":").unwrap();

    let (store, _) = DefaultCartStore::open(&mock.config(&path, "en")).unwrap();

    assert!(store.cart().is_empty());

    cleanup(&path);
}
