//! Cart error handling with Sentry integration.
//!
//! Every cart operation is written internally as a function returning
//! `Result<_, CartError>`. The store maps the error to a user-facing
//! notification at its public boundary; transient failures are additionally
//! captured to Sentry.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::api::ApiError;
use crate::notify::NotificationKind;
use crate::storage::StorageError;

/// Why a cart operation did not change the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested amount is more than the stock service has available.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotFound(ProductId),

    /// Stock/product service operation failed.
    #[error("Catalog error: {0}")]
    Api(#[from] ApiError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Whether this error comes from a lower layer rather than a rejected
    /// request.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Storage(_))
    }

    /// Notification to emit for this error, given the operation's generic
    /// failure kind.
    #[must_use]
    pub const fn notification_kind(&self, failure: NotificationKind) -> NotificationKind {
        match self {
            Self::StockExceeded { .. } => NotificationKind::QuantityUnavailable,
            Self::NotFound(_) | Self::Api(_) | Self::Storage(_) => failure,
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(StorageError::Serialization(err))
    }
}

/// Add a breadcrumb for cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// changes leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
