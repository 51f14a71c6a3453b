//! # Validation Module
//!
//! Input validation and forgiving form-input parsing for Khatha Wallet.
//!
//! ## Two Kinds of Input
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Numeric form fields (quantity, paid, redeem)                          │
//! │  ├── parse_quantity / parse_amount                                     │
//! │  └── NEVER fail: garbage or negative input becomes 0                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Entity fields (customer name, phone, ledger amount)                   │
//! │  ├── validate_* functions                                              │
//! │  └── Fail with ValidationError before any request is sent              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Backend                                                               │
//! │  └── Stock, due balances, OTP (authoritative)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khatha_core::validation::{parse_amount, parse_quantity};
//! use khatha_core::Money;
//!
//! assert_eq!(parse_quantity("3"), 3);
//! assert_eq!(parse_quantity("-2"), 0);
//! assert_eq!(parse_amount("abc"), Money::zero());
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Forgiving Numeric Parsers
// =============================================================================

/// Parses a quantity field. Non-numeric, negative or fractional junk
/// collapses to 0; values above [`MAX_ITEM_QUANTITY`] saturate.
pub fn parse_quantity(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return n.clamp(0, i64::from(MAX_ITEM_QUANTITY)) as u32;
    }
    // "2.0" style input from number fields
    match Decimal::from_str(raw) {
        Ok(d) if d > Decimal::ZERO => {
            let whole = d.trunc();
            if whole > Decimal::from(MAX_ITEM_QUANTITY) {
                MAX_ITEM_QUANTITY
            } else {
                whole.to_u32().unwrap_or(0)
            }
        }
        _ => 0,
    }
}

/// Parses a money field. Non-numeric or negative input becomes zero.
pub fn parse_amount(raw: &str) -> Money {
    raw.trim()
        .parse::<Money>()
        .map(Money::non_negative)
        .unwrap_or_default()
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer or supplier name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an Indian mobile number: 10 digits, optionally prefixed with
/// `+91` or `0`. Spaces and dashes are ignored.
///
/// Returns the bare 10-digit number.
///
/// ## Example
/// ```rust
/// use khatha_core::validation::validate_phone;
///
/// assert_eq!(validate_phone("+91 98765-43210").unwrap(), "9876543210");
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let digits: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let bare = digits
        .strip_prefix("+91")
        .or_else(|| digits.strip_prefix('0').filter(|rest| rest.len() == 10))
        .unwrap_or(&digits);

    if bare.len() != 10 || !bare.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be a 10-digit mobile number".to_string(),
        });
    }

    Ok(bare.to_string())
}

/// Light email shape check (`local@domain.tld`).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query. Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a ledger entry amount (manual GAVE / RECEIVED / SCHEME).
///
/// The amount is required and must be positive.
pub fn validate_entry_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a product price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a GST rate given in whole percent.
pub fn validate_gst_percent(pct: u32) -> ValidationResult<()> {
    if pct > 100 {
        return Err(ValidationError::OutOfRange {
            field: "gst_percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of distinct lines) before adding one more.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
