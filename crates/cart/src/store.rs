//! The cart store.
//!
//! [`CartStore`] owns the current cart and is the only way to change it.
//! Each mutating operation follows the same shape:
//!
//! 1. take a snapshot of the current cart
//! 2. check the requested amount against live stock
//! 3. build a new cart value from the snapshot (never mutating it)
//! 4. persist the new cart, then publish it to readers
//!
//! Failures at any step leave both storage and in-memory state untouched and
//! are reported through the [`Notifier`]. Operations do not lock against each
//! other; when two run concurrently the last one to commit wins.

use std::sync::Arc;

use rocketshoes_core::{Cart, CurrencyCode, LineItem, ProductId, Stock};
use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError, CatalogApi};
use crate::config::{CartConfig, DEFAULT_STORAGE_KEY};
use crate::error::{CartError, add_breadcrumb};
use crate::notify::{ChannelNotifier, Locale, Notification, NotificationKind, Notifier};
use crate::storage::{FileStorage, KeyValueStorage};

/// Request to set a product's amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// New amount. Values of zero or below are ignored.
    pub amount: i64,
}

/// Store settings that are not collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Storage key the cart is persisted under
    pub storage_key: String,
    /// Language for notifications
    pub locale: Locale,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            locale: Locale::default(),
        }
    }
}

impl From<&CartConfig> for StoreSettings {
    fn from(config: &CartConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            locale: config.locale,
        }
    }
}

/// Cart store wired to HTTP, file storage and a notification channel.
pub type DefaultCartStore = CartStore<ApiClient, FileStorage, ChannelNotifier>;

/// Owned cart state with stock-checked mutations.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same cart.
pub struct CartStore<A, S, N> {
    inner: Arc<CartStoreInner<A, S, N>>,
}

struct CartStoreInner<A, S, N> {
    api: A,
    storage: S,
    notifier: N,
    settings: StoreSettings,
    state: watch::Sender<Cart>,
}

impl<A, S, N> Clone for CartStore<A, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DefaultCartStore {
    /// Build a store from configuration.
    ///
    /// Returns the store and the receiver the UI layer reads notifications
    /// from.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built.
    pub fn open(
        config: &CartConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notification>), ApiError> {
        let api = ApiClient::new(&config.api)?;
        let storage = FileStorage::new(&config.storage_path);
        let (notifier, notifications) = ChannelNotifier::new();

        tracing::info!(
            base_url = %config.api.base_url,
            storage = %config.storage_path.display(),
            locale = config.locale.tag(),
            "Opening cart store"
        );

        let store = Self::new(api, storage, notifier, StoreSettings::from(config));
        Ok((store, notifications))
    }
}

impl<A, S, N> CartStore<A, S, N>
where
    A: CatalogApi,
    S: KeyValueStorage,
    N: Notifier,
{
    /// Create a store, loading the cart persisted under the settings' key.
    ///
    /// A missing entry loads as an empty cart. An entry that cannot be read,
    /// parsed, or that breaks the line item invariants also loads as an empty
    /// cart and is reported as a warning.
    pub fn new(api: A, storage: S, notifier: N, settings: StoreSettings) -> Self {
        let cart = load_cart(&storage, &settings.storage_key);
        debug!(items = cart.len(), "Cart loaded");

        let (state, _) = watch::channel(cart);

        Self {
            inner: Arc::new(CartStoreInner {
                api,
                storage,
                notifier,
                settings,
                state,
            }),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.state.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart is fetched from the catalog and appended
    /// with an amount of 1.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        match self.try_add_product(product_id).await {
            Ok(()) => {
                let id = product_id.to_string();
                add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));
            }
            Err(err) => self.report(&err, NotificationKind::AddFailed),
        }
    }

    /// Remove a product's line item.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) {
        match self.try_remove_product(product_id) {
            Ok(()) => {
                let id = product_id.to_string();
                add_breadcrumb("cart", "Removed product", Some(&[("product_id", id.as_str())]));
            }
            Err(err) => self.report(&err, NotificationKind::RemoveFailed),
        }
    }

    /// Set a product's amount.
    ///
    /// Amounts of zero or below are ignored without notification.
    #[instrument(skip_all, fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        if request.amount <= 0 {
            debug!("Ignoring non-positive amount");
            return;
        }

        match self.try_update_product_amount(request).await {
            Ok(()) => {
                let id = request.product_id.to_string();
                let amount = request.amount.to_string();
                add_breadcrumb(
                    "cart",
                    "Updated product amount",
                    Some(&[("product_id", id.as_str()), ("amount", amount.as_str())]),
                );
            }
            Err(err) => self.report(&err, NotificationKind::UpdateFailed),
        }
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let cart = self.cart();
        let stock = self.inner.api.stock(product_id).await?;

        let requested = i64::from(cart.amount_of(product_id)) + 1;
        let amount = ensure_in_stock(product_id, requested, &stock)?;

        let updated = match cart.position(product_id) {
            Some(index) => cart
                .with_amount(index, amount)
                .ok_or(CartError::NotFound(product_id))?,
            None => {
                let product = self.inner.api.product(product_id).await?;
                cart.with_line(LineItem::from_product(product))
            }
        };

        self.publish(updated)
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let cart = self.cart();
        let updated = cart
            .position(product_id)
            .and_then(|index| cart.without(index))
            .ok_or(CartError::NotFound(product_id))?;

        self.publish(updated)
    }

    async fn try_update_product_amount(
        &self,
        request: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = request;
        let stock = self.inner.api.stock(product_id).await?;

        let amount = ensure_in_stock(product_id, amount, &stock)?;

        let cart = self.cart();
        let updated = cart
            .position(product_id)
            .and_then(|index| cart.with_amount(index, amount))
            .ok_or(CartError::NotFound(product_id))?;

        self.publish(updated)
    }

    /// Persist `cart` and make it the current state.
    ///
    /// Storage is written first; the in-memory state only changes once the
    /// write has succeeded.
    fn publish(&self, cart: Cart) -> Result<(), CartError> {
        let serialized = serde_json::to_string(&cart)?;
        self.inner
            .storage
            .set_item(&self.inner.settings.storage_key, &serialized)?;

        debug!(
            items = cart.len(),
            quantity = cart.total_quantity(),
            total = %cart.total_price(CurrencyCode::default()),
            "Cart published"
        );
        self.inner.state.send_replace(cart);
        Ok(())
    }

    /// Log an operation failure and notify the user.
    fn report(&self, err: &CartError, failure: NotificationKind) {
        if err.is_transient() {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                error = %err,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        } else {
            warn!(error = %err, "Cart operation rejected");
        }

        let kind = err.notification_kind(failure);
        self.inner
            .notifier
            .notify(Notification::new(kind, self.inner.settings.locale));
    }
}

/// Check `requested` against available stock, returning it as a line amount.
fn ensure_in_stock(product_id: ProductId, requested: i64, stock: &Stock) -> Result<u32, CartError> {
    let exceeded = || CartError::StockExceeded {
        product_id,
        requested,
        available: stock.amount,
    };

    if requested > stock.amount {
        return Err(exceeded());
    }
    u32::try_from(requested).map_err(|_| exceeded())
}

/// Read the persisted cart, falling back to empty on any problem.
fn load_cart<S: KeyValueStorage>(storage: &S, key: &str) -> Cart {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            warn!(error = %e, sentry_event_id = %event_id, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    let cart = match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            warn!(error = %e, sentry_event_id = %event_id, "Stored cart is not valid JSON, starting empty");
            return Cart::new();
        }
    };

    if let Err(e) = cart.validate() {
        let event_id = sentry::capture_error(&e);
        warn!(error = %e, sentry_event_id = %event_id, "Stored cart is inconsistent, starting empty");
        return Cart::new();
    }

    cart
}
