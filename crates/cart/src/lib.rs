//! Rocketshoes Cart - persisted shopping cart store.
//!
//! This crate provides the cart state container used by the storefront UI:
//! an ordered list of line items that is checked against the remote stock
//! service before every change and written through to durable storage after
//! every successful change.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and exposes add/remove/update plus
//!   snapshot and subscribe reads
//! - [`api::CatalogApi`] is the stock/product lookup seam, implemented over
//!   HTTP by [`api::ApiClient`]
//! - [`storage::KeyValueStorage`] is the persistence seam, implemented by
//!   [`storage::FileStorage`] and [`storage::MemoryStorage`]
//! - [`notify::Notifier`] carries user-facing messages to the UI layer
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, DefaultCartStore, UpdateProductAmount};
//! use rocketshoes_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let (store, mut notifications) = DefaultCartStore::open(&config)?;
//!
//! store.add_product(ProductId::new(1)).await;
//! store
//!     .update_product_amount(UpdateProductAmount {
//!         product_id: ProductId::new(1),
//!         amount: 3,
//!     })
//!     .await;
//!
//! while let Ok(notification) = notifications.try_recv() {
//!     show_toast(notification.severity, &notification.message);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use config::{ApiConfig, CartConfig, ConfigError};
pub use error::CartError;
pub use notify::{Locale, Notification, NotificationKind, Notifier, Severity};
pub use store::{CartStore, DefaultCartStore, StoreSettings, UpdateProductAmount};
