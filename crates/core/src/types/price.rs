//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as bare JSON numbers. They are held as
//! [`Decimal`] so cart totals never accumulate floating-point drift, and are
//! paired with a [`CurrencyCode`] only when formatted for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "R$ 179.90", "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let separator = match self.currency_code {
            CurrencyCode::BRL => " ",
            CurrencyCode::USD | CurrencyCode::EUR | CurrencyCode::GBP => "",
        };
        format!(
            "{}{separator}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol used as a display prefix.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}
