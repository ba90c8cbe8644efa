//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CheckoutError    - Why a checkout was rejected                    │
//! │  ├── StoreError       - Collaborator (inventory / recorder) failures   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures ──► StoreError     │
//! │                                                                         │
//! │  Flow: DbError → StoreError → CheckoutError → Caller                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quantities)
//! 3. Errors are enum variants, never String
//! 4. Every checkout failure maps to exactly one [`CheckoutErrorKind`]

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Checkout Error
// =============================================================================

/// Reasons a checkout is rejected.
///
/// No variant is ever returned after a partial mutation: the engine rolls the
/// store transaction back before surfacing any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A cart entry requests zero or a negative quantity.
    #[error("Invalid quantity {quantity} for product {product_id}: quantity must be positive")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// `price × quantity` (or the running total) does not fit in i64 cents.
    #[error("Amount overflow while pricing product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// The number of units across the cart does not fit in i64.
    #[error("Unit count overflow at product {product_id}")]
    QuantityOverflow { product_id: ProductId },

    /// Requested quantity exceeds what the store reports as available.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart {101: 2}
    ///      │
    ///      ▼
    /// Check stock: available=1
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 101, available: 1, requested: 2 }
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// Recording the sale (or committing it) failed. Stock changes were
    /// rolled back with it.
    #[error("Failed to record sale: {0}")]
    Persistence(StoreError),

    /// The inventory store failed while reading or staging stock changes.
    #[error("Inventory store failure: {0}")]
    Store(StoreError),
}

/// Coarse classification of [`CheckoutError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutErrorKind {
    /// Bad input, detected without consulting the store.
    InvalidArgument,
    /// Not enough stock for some product.
    StockConflict,
    /// The sale could not be durably recorded.
    PersistenceFailure,
    /// The inventory store itself failed.
    StoreFailure,
}

impl CheckoutError {
    /// Returns the error's classification.
    pub fn kind(&self) -> CheckoutErrorKind {
        match self {
            CheckoutError::InvalidQuantity { .. }
            | CheckoutError::AmountOverflow { .. }
            | CheckoutError::QuantityOverflow { .. } => CheckoutErrorKind::InvalidArgument,
            CheckoutError::InsufficientStock { .. } => CheckoutErrorKind::StockConflict,
            CheckoutError::Persistence(_) => CheckoutErrorKind::PersistenceFailure,
            CheckoutError::Store(_) => CheckoutErrorKind::StoreFailure,
        }
    }

    /// The product the failure is about, when there is one.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            CheckoutError::InvalidQuantity { product_id, .. }
            | CheckoutError::AmountOverflow { product_id }
            | CheckoutError::QuantityOverflow { product_id }
            | CheckoutError::InsufficientStock { product_id, .. } => Some(*product_id),
            CheckoutError::Store(StoreError::Rejected { product_id, .. })
            | CheckoutError::Persistence(StoreError::Rejected { product_id, .. }) => {
                Some(*product_id)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store cannot be reached (pool closed, connection lost).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write for a specific product.
    #[error("Store rejected write for product {product_id}: {reason}")]
    Rejected { product_id: ProductId, reason: String },

    /// Any other backend failure.
    #[error("Store operation failed: {0}")]
    Backend(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. unparsable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for checkout results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Convenience type alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: i64) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    #[test]
    fn test_error_messages() {
        let err = CheckoutError::InsufficientStock {
            product_id: pid(101),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 101: available 1, requested 2"
        );

        let err = CheckoutError::InvalidQuantity {
            product_id: pid(7),
            quantity: 0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid quantity 0 for product 7: quantity must be positive"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            CheckoutError::QuantityOverflow { product_id: pid(2) }.kind(),
            CheckoutErrorKind::InvalidArgument
        );
        assert_eq!(
            CheckoutError::InsufficientStock {
                product_id: pid(1),
                available: 0,
                requested: 1
            }
            .kind(),
            CheckoutErrorKind::StockConflict
        );
        assert_eq!(
            CheckoutError::Persistence(StoreError::Backend("disk full".into())).kind(),
            CheckoutErrorKind::PersistenceFailure
        );
        assert_eq!(
            CheckoutError::Store(StoreError::Unavailable("closed".into())).kind(),
            CheckoutErrorKind::StoreFailure
        );
    }

    #[test]
    fn test_product_id_context() {
        let err = CheckoutError::InvalidQuantity {
            product_id: pid(202),
            quantity: -3,
        };
        assert_eq!(err.product_id(), Some(pid(202)));

        let err = CheckoutError::Store(StoreError::Rejected {
            product_id: pid(9),
            reason: "stock would go negative".into(),
        });
        assert_eq!(err.product_id(), Some(pid(9)));

        let err = CheckoutError::Persistence(StoreError::Backend("disk I/O error".into()));
        assert_eq!(err.product_id(), None);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }
}
