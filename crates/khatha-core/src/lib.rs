//! # khatha-core: Pure Business Logic for Khatha Wallet
//!
//! This crate holds every rule of the counter and the marketplace that can
//! be expressed without I/O: pricing, the cart, order splitting, the bill
//! items codec and the checkout state machine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Khatha Wallet Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal (khatha)                            │   │
//! │  │    cart add ──► bill save ──► orders place ──► ledger add      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 khatha-client (workflows, API)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ khatha-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────────┐        │   │
//! │  │   │  money  │ │ pricing │ │   cart    │ │ bill_items │        │   │
//! │  │   │  Money  │ │ totals  │ │ CartLine  │ │ BillItems  │        │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └────────────┘        │   │
//! │  │   ┌─────────────┐ ┌──────────┐ ┌────────┐ ┌───────────┐       │   │
//! │  │   │ order_split │ │ checkout │ │ ledger │ │ dashboard │       │   │
//! │  │   └─────────────┘ └──────────┘ └────────┘ └───────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Bill, Order, etc.)
//! - [`money`] - Exact decimal rupee amounts
//! - [`pricing`] - Subtotal → GST → redemption → total → due
//! - [`cart`] - Counter and marketplace cart
//! - [`order_split`] - One order per retailer
//! - [`bill_items`] - `items` field codec and receipt rows
//! - [`checkout`] - Counter sale state machine
//! - [`ledger`] - Manual entries, statements, savings scheme
//! - [`upi`] - UPI payment links
//! - [`dashboard`] - Shop overview
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use khatha_core::cart::CartLine;
//! use khatha_core::pricing::{calculate, PricingInput};
//! use khatha_core::{GstRate, Money};
//!
//! let lines = vec![CartLine {
//!     product_id: 1,
//!     name: "Toor Dal".into(),
//!     barcode: "8901".into(),
//!     unit_price: Money::from_paise(3847),
//!     quantity: 1,
//!     unit: "kg".into(),
//!     retailer_id: None,
//!     image_url: None,
//! }];
//!
//! let totals = calculate(&PricingInput::new(&lines, GstRate::from_percent(5)));
//! assert_eq!(totals.total, Money::from_rupees(40)); // 40.3935 floored
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill_items;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod error;
pub mod ledger;
pub mod money;
pub mod order_split;
pub mod pricing;
pub mod types;
pub mod upi;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// GST applied to counter bills, in whole percent.
pub const DEFAULT_GST_PERCENT: u32 = 5;

/// Stock at or below this shows as "only n left".
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos like 1000 for 10 at the counter.
pub const MAX_ITEM_QUANTITY: u32 = 999;
