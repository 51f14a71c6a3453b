//! # Error Types
//!
//! Domain-specific error types for khatha-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  khatha-core errors (this file)                                        │
//! │  ├── CoreError        - Cart and checkout rule violations              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  khatha-client errors (separate crate)                                 │
//! │  └── ClientError      - Network / backend failures                     │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── CommandError     - What the cashier sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CommandError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error here is raised before any network call and is recoverable:
//! the cart and checkout state are left untouched.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and checkout rule violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Submission attempted with an empty cart.
    #[error("Cart has no items")]
    EmptyCart,

    /// Product has no stock left.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan barcode ──► stock <= 0 ──► OutOfStock { name: "Amul Milk" }
    ///                                   │
    ///                                   ▼
    ///                      "Amul Milk is out of stock"
    /// ```
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Line not present in the cart.
    #[error("Product {0} not in cart")]
    ProductNotInCart(i64),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// The bill needs a customer before it can be saved.
    ///
    /// KHATHA bills always do; in quick-invoice mode every bill does.
    #[error("Select or create a customer first ({reason})")]
    CustomerRequired { reason: String },

    /// A submit is already in flight for this checkout.
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// UPI selected but the retailer has no UPI id.
    #[error("UPI id is not configured for this shop")]
    UpiNotConfigured,

    /// The checkout cannot take this action in its current state.
    #[error("Cannot {action} while checkout is {state}")]
    InvalidTransition { state: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True when the caller should prompt for a customer and retry.
    pub fn needs_customer(&self) -> bool {
        matches!(self, CoreError::CustomerRequired { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
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

    /// Invalid format (e.g., phone number, email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart has no items");

        let err = CoreError::OutOfStock {
            name: "Amul Milk".to_string(),
        };
        assert_eq!(err.to_string(), "Amul Milk is out of stock");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "name must be at most 100 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_needs_customer() {
        let err = CoreError::CustomerRequired {
            reason: "KHATHA".to_string(),
        };
        assert!(err.needs_customer());
        assert!(!CoreError::EmptyCart.needs_customer());
    }
}
