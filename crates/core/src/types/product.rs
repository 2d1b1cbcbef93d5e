//! Records returned by the product service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Catalog data for a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    /// Product image URL.
    #[serde(rename = "image")]
    pub image_url: String,
}

/// Available quantity for a product.
///
/// The stock service may omit `id`. A negative `amount` means nothing is
/// available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_numeric_price() {
        let json = r#"{"id":1,"title":"Tênis de Caminhada","price":179.9,"image":"https://cdn.example/1.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(1799, 1));
        assert_eq!(product.image_url, "https://cdn.example/1.jpg");
    }

    #[test]
    fn test_stock_without_id() {
        let stock: Stock = serde_json::from_str(r#"{"amount":3}"#).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(stock.id, None);
        assert_eq!(stock.amount, 3);
    }

    #[test]
    fn test_stock_with_id_and_negative_amount() {
        let stock: Stock =
            serde_json::from_str(r#"{"id":1,"amount":-3}"#).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(stock.id, Some(ProductId::new(1)));
        assert_eq!(stock.amount, -3);
    }

    #[test]
    fn test_stock_rejects_non_numeric_amount() {
        let result: Result<Stock, _> = serde_json::from_str(r#"{"amount":"plenty"}"#);
        assert!(result.is_err());
    }
}
