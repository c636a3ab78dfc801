//! # Money Types
//!
//! Amounts in the smallest currency unit (paise). Orders are INR only and
//! the provider only ever sees integer minor units.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Order currency (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    INR,
}

impl Currency {
    /// Returns the ISO 4217 currency code as the provider expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
        }
    }

    /// Display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
        }
    }

    /// Number of decimal places of the minor unit
    pub fn decimal_places(&self) -> u8 {
        2
    }

    /// Convert a major-unit amount to the smallest currency unit.
    ///
    /// Rounds half away from zero on the `f64` product, so `10.005` becomes
    /// `1000` (the product is `1000.4999...`) and `10.999` becomes `1100`.
    /// Non-finite, non-positive or sub-unit amounts are rejected.
    pub fn to_smallest_unit(&self, amount: f64) -> PaymentResult<i64> {
        if !amount.is_finite() {
            return Err(PaymentError::InvalidAmount {
                message: "amount must be a finite number".to_string(),
            });
        }
        if amount <= 0.0 {
            return Err(PaymentError::InvalidAmount {
                message: format!("amount must be positive, got {}", amount),
            });
        }

        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        let minor = (amount * multiplier).round();

        // 2^63 is exactly representable; anything at or above it overflows i64
        if minor >= i64::MAX as f64 {
            return Err(PaymentError::InvalidAmount {
                message: format!("amount {} is too large", amount),
            });
        }
        if minor < 1.0 {
            return Err(PaymentError::InvalidAmount {
                message: format!("amount {} is below the smallest unit", amount),
            });
        }

        Ok(minor as i64)
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (paise for INR)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from a major-unit amount
    pub fn new(amount: f64, currency: Currency) -> PaymentResult<Self> {
        Ok(Self {
            amount: currency.to_smallest_unit(amount)?,
            currency,
        })
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Format for display (e.g., "₹500.00")
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.as_decimal())
    }
}
