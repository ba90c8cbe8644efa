//! # Cart
//!
//! The caller-supplied set of (product, quantity) pairs for one checkout.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller Action                 Cart Change                              │
//! │  ─────────────                 ───────────                              │
//! │  set(101, 2)         ───────►  {101: 2}          (replace)              │
//! │  add(101, 1)         ───────►  {101: 3}          (accumulate)           │
//! │  remove(101)         ───────►  {}                                       │
//! │                                                                         │
//! │  The cart does NOT reject zero/negative quantities: the checkout       │
//! │  engine does, so an invalid cart fails as a whole.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries are kept ordered by product id. Iteration order is therefore
//! deterministic, and stores can lock products in ascending id order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Product id → requested quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: BTreeMap<ProductId, i64>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: BTreeMap::new(),
        }
    }

    /// Sets the quantity for a product, replacing any previous value.
    pub fn set(&mut self, product_id: ProductId, quantity: i64) {
        self.items.insert(product_id, quantity);
    }

    /// Adds to the quantity for a product (saturating).
    pub fn add(&mut self, product_id: ProductId, quantity: i64) {
        let entry = self.items.entry(product_id).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Removes a product. Returns the quantity it had, if any.
    pub fn remove(&mut self, product_id: ProductId) -> Option<i64> {
        self.items.remove(&product_id)
    }

    /// Requested quantity for a product, if present.
    pub fn quantity(&self, product_id: ProductId) -> Option<i64> {
        self.items.get(&product_id).copied()
    }

    /// Iterates `(product_id, quantity)` in ascending product id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Product ids in ascending order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.keys().copied().collect()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl FromIterator<(ProductId, i64)> for Cart {
    /// Later entries for the same product replace earlier ones.
    fn from_iter<I: IntoIterator<Item = (ProductId, i64)>>(iter: I) -> Self {
        Cart {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<(ProductId, i64)> for Cart {
    fn extend<I: IntoIterator<Item = (ProductId, i64)>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
