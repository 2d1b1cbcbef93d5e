//! The cart and its line items.
//!
//! A [`Cart`] is an ordered sequence of [`LineItem`]s, one per distinct
//! product, in the order products were first added. It serializes as a bare
//! JSON array so the persisted form is just the list of line items.
//!
//! Carts are values: every transformation (`with_amount`, `with_line`,
//! `without`) returns a new cart and leaves the receiver untouched.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CurrencyCode, Price, Product, ProductId};

/// A persisted cart that breaks a line item invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    /// Two line items share the same product id.
    #[error("duplicate line item for product {0}")]
    DuplicateProduct(ProductId),

    /// A line item has an amount of zero.
    #[error("line item for product {0} has zero amount")]
    ZeroAmount(ProductId),
}

/// One product plus its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    /// Product image URL.
    #[serde(rename = "image")]
    pub image_url: String,
    /// Requested quantity, always at least 1.
    pub amount: u32,
}

impl LineItem {
    /// Build a new line item for a catalog product with an amount of 1.
    #[must_use]
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image_url: product.image_url,
            amount: 1,
        }
    }

    /// Copy of this line item with a different amount.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Price multiplied by amount.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }

    /// Unit price in `currency`, for display.
    #[must_use]
    pub const fn unit_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.price, currency)
    }

    /// Subtotal in `currency`, for display.
    #[must_use]
    pub fn subtotal_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.subtotal(), currency)
    }
}

/// Ordered collection of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, checking id uniqueness and amounts.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError` if two items share a product id or any
    /// item has an amount of zero.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartInvariantError> {
        let cart = Self { items };
        cart.validate()?;
        Ok(cart)
    }

    /// Check the line item invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning in cart order.
    pub fn validate(&self) -> Result<(), CartInvariantError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.amount == 0 {
                return Err(CartInvariantError::ZeroAmount(item.id));
            }
            if !seen.insert(item.id) {
                return Err(CartInvariantError::DuplicateProduct(item.id));
            }
        }
        Ok(())
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the line item for a product.
    #[must_use]
    pub fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id == product_id)
    }

    /// Line item for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == product_id)
    }

    /// Current amount for a product, or 0 when absent.
    #[must_use]
    pub fn amount_of(&self, product_id: ProductId) -> u32 {
        self.get(product_id).map_or(0, |item| item.amount)
    }

    /// Copy of this cart with the line at `index` replaced by a copy carrying
    /// `amount`. Returns `None` if `index` is out of bounds.
    #[must_use]
    pub fn with_amount(&self, index: usize, amount: u32) -> Option<Self> {
        let replacement = self.items.get(index)?.with_amount(amount);
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i == index {
                    replacement.clone()
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// Copy of this cart with `item` appended.
    #[must_use]
    pub fn with_line(&self, item: LineItem) -> Self {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(item);
        Self { items }
    }

    /// Copy of this cart without the line at `index`. Returns `None` if
    /// `index` is out of bounds.
    #[must_use]
    pub fn without(&self, index: usize) -> Option<Self> {
        if index >= self.items.len() {
            return None;
        }
        let items = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item.clone())
            .collect();
        Some(Self { items })
    }

    /// Sum of all line item amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line item subtotals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Cart total in `currency`, for display.
    #[must_use]
    pub fn total_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.total(), currency)
    }
}
