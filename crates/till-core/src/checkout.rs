//! # Checkout Engine
//!
//! Turns a [`Cart`] into a committed [`Sale`], or changes nothing at all.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout(cart)                                  │
//! │                                                                         │
//! │  1. Input check (no store access)                                      │
//! │     └── any quantity <= 0?     → InvalidQuantity                        │
//! │                                                                         │
//! │  2. store.begin(product ids)   → exclusive access to those products    │
//! │                                                                         │
//! │  3. Validation phase (reads only)                                      │
//! │     └── for each line: stock >= qty?  else InsufficientStock            │
//! │                                                                         │
//! │  4. Commit phase (staged in the transaction)                           │
//! │     ├── for each line: price × qty, units, decrease_stock               │
//! │     └── save_sale(sale)        else Persistence                         │
//! │                                                                         │
//! │  5. tx.commit()                                                         │
//! │                                                                         │
//! │  Any failure after step 2 → tx.rollback(): stock and sale log are      │
//! │  exactly as they were before the call.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The validation phase finishes for every line before the first write is
//! staged, so a rejected cart never touches inventory, even transiently.
//!
//! An empty cart is a valid checkout: it records a sale with no lines and a
//! zero total.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::store::{CheckoutStore, CheckoutTx, InventoryStore, SaleRecorder};
use crate::types::{Sale, SaleLine};
use crate::validation::validate_quantity;

/// Executes checkouts against a [`CheckoutStore`].
///
/// The engine keeps no state between calls. Share it behind an `Arc` to run
/// checkouts concurrently: mutual exclusion comes from the store.
#[derive(Debug, Clone)]
pub struct CheckoutEngine<S> {
    store: S,
}

impl<S: CheckoutStore> CheckoutEngine<S> {
    /// Creates an engine over `store`.
    pub fn new(store: S) -> Self {
        CheckoutEngine { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks out `cart` and returns the grand total.
    ///
    /// ## Example
    /// ```text
    /// Stock: 101 → 10 @ $50.00, 202 → 5 @ $20.00
    /// Cart:  {101: 2, 202: 1}
    ///      │
    ///      ▼
    /// Ok($120.00), stock now 101 → 8, 202 → 4, one sale recorded
    /// ```
    pub async fn checkout(&self, cart: &Cart) -> CheckoutResult<Money> {
        self.checkout_sale(cart).await.map(|sale| sale.total())
    }

    /// Checks out `cart` and returns the recorded sale.
    pub async fn checkout_sale(&self, cart: &Cart) -> CheckoutResult<Sale> {
        check_input(cart)?;

        let products = cart.product_ids();
        debug!(lines = products.len(), "Starting checkout");

        let mut tx = self
            .store
            .begin(&products)
            .await
            .map_err(CheckoutError::Store)?;

        let staged = match validate_stock(tx.as_mut(), cart).await {
            Ok(()) => apply(tx.as_mut(), cart).await,
            Err(err) => Err(err),
        };

        match staged {
            Ok(sale) => match tx.commit().await {
                Ok(()) => {
                    info!(
                        sale_id = %sale.id,
                        total = %sale.total(),
                        lines = sale.lines.len(),
                        "Checkout completed"
                    );
                    Ok(sale)
                }
                Err(err) => {
                    warn!(sale_id = %sale.id, error = %err, "Checkout commit failed");
                    Err(CheckoutError::Persistence(err))
                }
            },
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Checkout rollback failed");
                }
                warn!(error = %err, kind = ?err.kind(), "Checkout rejected");
                Err(err)
            }
        }
    }
}

// =============================================================================
// Phases
// =============================================================================

fn check_input(cart: &Cart) -> CheckoutResult<()> {
    for (product_id, quantity) in cart.iter() {
        validate_quantity(quantity)
            .map_err(|_| CheckoutError::InvalidQuantity { product_id, quantity })?;
    }

    Ok(())
}

/// Reads only. Stops at the first line (ascending id) that cannot be met.
async fn validate_stock(tx: &mut dyn CheckoutTx, cart: &Cart) -> CheckoutResult<()> {
    for (product_id, requested) in cart.iter() {
        let available = tx
            .get_stock(product_id)
            .await
            .map_err(CheckoutError::Store)?;

        if available < requested {
            return Err(CheckoutError::InsufficientStock {
                product_id,
                available,
                requested,
            });
        }
    }

    Ok(())
}

async fn apply(tx: &mut dyn CheckoutTx, cart: &Cart) -> CheckoutResult<Sale> {
    let mut total = Money::zero();
    let mut units: i64 = 0;
    let mut lines = Vec::with_capacity(cart.len());

    for (product_id, quantity) in cart.iter() {
        let unit_price = tx
            .get_price(product_id)
            .await
            .map_err(CheckoutError::Store)?;

        let line_total = unit_price
            .checked_mul_quantity(quantity)
            .ok_or(CheckoutError::AmountOverflow { product_id })?;
        total = total
            .checked_add(line_total)
            .ok_or(CheckoutError::AmountOverflow { product_id })?;
        units = units
            .checked_add(quantity)
            .ok_or(CheckoutError::QuantityOverflow { product_id })?;

        tx.decrease_stock(product_id, quantity)
            .await
            .map_err(CheckoutError::Store)?;

        lines.push(SaleLine {
            product_id,
            quantity,
            unit_price_cents: unit_price.cents(),
            line_total_cents: line_total.cents(),
        });
    }

    debug!(units, "Staged stock decrements");

    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        total_cents: total.cents(),
        lines,
        created_at: Utc::now(),
    };

    tx.save_sale(&sale)
        .await
        .map_err(CheckoutError::Persistence)?;

    Ok(sale)
}

// =============================================================================
// Unit Tests
// =============================================================================
