//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (ProductId) │   │  id (UUID)      │   │  product_id     │       │
//! │  │  name           │   │  total_cents    │   │  quantity       │       │
//! │  │  price_cents    │   │  lines ─────────┼──►│  unit_price     │       │
//! │  │  current_stock  │   │  created_at     │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::validate_product_id;

// =============================================================================
// Product Id
// =============================================================================

/// Positive integer identifying a product.
///
/// ## Invariant
/// The wrapped value is always `> 0`; [`ProductId::new`] is the only way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(try_from = "i64", into = "i64")]
pub struct ProductId(i64);

impl ProductId {
    /// Creates a product id, rejecting zero and negative values.
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        validate_product_id(raw)?;
        Ok(ProductId(raw))
    }

    /// Returns the raw integer value.
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ProductId {
    type Error = ValidationError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        ProductId::new(raw)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale, as held by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,

    /// Display name shown on receipts.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units currently available for sale. Never negative.
    pub current_stock: i64,

    /// Inactive products are invisible to checkout (zero stock, zero price).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if `quantity` units can be sold right now.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && quantity > 0 && self.current_stock >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One cart entry as it was sold.
///
/// Unit price is frozen at checkout time so later price changes never alter
/// a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// `unit_price_cents × quantity`.
    pub line_total_cents: i64,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// The durable record of a completed checkout.
///
/// Created once per successful checkout and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// UUID v4.
    pub id: String,

    /// Sum of all line totals, in cents.
    pub total_cents: i64,

    /// Lines in ascending product id order.
    pub lines: Vec<SaleLine>,

    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total number of units across all lines, `None` if it overflows i64.
    pub fn total_quantity(&self) -> Option<i64> {
        self.lines
            .iter()
            .try_fold(0i64, |units, line| units.checked_add(line.quantity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_rejects_non_positive() {
        assert!(ProductId::new(1).is_ok());
        assert!(ProductId::new(0).is_err());
        assert!(ProductId::new(-5).is_err());
        assert_eq!(ProductId::new(101).unwrap().get(), 101);
    }

    #[test]
    fn test_product_id_serde_validates() {
        let id: ProductId = serde_json::from_str("202").unwrap();
        assert_eq!(id.get(), 202);
        assert!(serde_json::from_str::<ProductId>("0").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "202");
    }

    #[test]
    fn test_product_can_sell() {
        let now = Utc::now();
        let mut product = Product {
            id: ProductId::new(101).unwrap(),
            name: "Cola 330ml".to_string(),
            price_cents: 5000,
            current_stock: 3,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
        assert!(!product.can_sell(0));
        assert_eq!(product.price(), Money::from_cents(5000));

        product.is_active = false;
        assert!(!product.can_sell(1));
    }

    #[test]
    fn test_sale_totals() {
        let sale = Sale {
            id: "sale-1".to_string(),
            total_cents: 12000,
            lines: vec![
                SaleLine {
                    product_id: ProductId::new(101).unwrap(),
                    quantity: 2,
                    unit_price_cents: 5000,
                    line_total_cents: 10000,
                },
                SaleLine {
                    product_id: ProductId::new(202).unwrap(),
                    quantity: 1,
                    unit_price_cents: 2000,
                    line_total_cents: 2000,
                },
            ],
            created_at: Utc::now(),
        };

        assert_eq!(sale.total(), Money::from_major_minor(120, 0));
        assert_eq!(sale.total_quantity(), Some(3));
        assert_eq!(sale.lines[0].line_total(), Money::from_cents(10000));
        assert_eq!(sale.lines[1].unit_price(), Money::from_cents(2000));
    }

    #[test]
    fn test_sale_total_quantity_overflow() {
        let line = |id: i64, quantity: i64| SaleLine {
            product_id: ProductId::new(id).unwrap(),
            quantity,
            unit_price_cents: 0,
            line_total_cents: 0,
        };
        let mut sale = Sale {
            id: "sale-big".to_string(),
            total_cents: 0,
            lines: vec![line(1, i64::MAX), line(2, 1)],
            created_at: Utc::now(),
        };
        assert_eq!(sale.total_quantity(), None);

        sale.lines.clear();
        assert_eq!(sale.total_quantity(), Some(0));
    }
}
