//! # Order Split
//!
//! A marketplace cart can hold products from several shops. Checkout turns
//! it into one order per shop.
//!
//! ## Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart lines                              Order groups                   │
//! │                                                                         │
//! │  Milk   (shop 1)  ₹40   ──┐                                             │
//! │  Bread  (shop 1)  ₹10   ──┼──────────►  shop 1: [Milk, Bread]  ₹50      │
//! │  Eggs   (shop 2)  ₹25   ──┼──────────►  shop 2: [Eggs]         ₹25      │
//! │  Salt   (no shop)       ──┘  account?   fallback shop, or dropped       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Groups keep the order in which each shop first appears in the cart.
//! Submission lives in `khatha-client`; this module only builds payloads.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bill_items::{encode_json_items, ItemLine};
use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::OrderPaymentMode;

// =============================================================================
// Order Group
// =============================================================================

/// All lines bound for one retailer.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderGroup {
    pub retailer_id: i64,
    pub items: Vec<ItemLine>,
    pub total: Money,
}

impl OrderGroup {
    /// Payload for `POST /orders/create`.
    pub fn to_request(&self, customer_id: i64, payment_mode: OrderPaymentMode) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id,
            retailer_id: self.retailer_id,
            items: encode_json_items(&self.items),
            total_amount: self.total,
            payment_mode,
        }
    }
}

/// Body of `POST /orders/create`. `items` is a JSON string, not an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    pub retailer_id: i64,
    pub items: String,
    pub total_amount: Money,
    pub payment_mode: OrderPaymentMode,
}

// =============================================================================
// Split
// =============================================================================

/// Result of grouping a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub groups: Vec<OrderGroup>,
    /// Lines left out because no retailer could be resolved.
    pub dropped: usize,
}

/// Groups `lines` by retailer.
///
/// A line's retailer is its own `retailer_id`, else `fallback_retailer`
/// (the customer's selected shop). Lines with neither are dropped.
///
/// ## Errors
/// [`CoreError::EmptyCart`] when `lines` is empty.
pub fn split_by_retailer(lines: &[CartLine], fallback_retailer: Option<i64>) -> CoreResult<SplitResult> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut groups: Vec<OrderGroup> = Vec::new();
    let mut dropped = 0;

    for line in lines {
        let Some(retailer_id) = line.retailer_id.or(fallback_retailer) else {
            warn!(product_id = line.product_id, name = %line.name, "Dropping cart line with no retailer");
            dropped += 1;
            continue;
        };

        let item = ItemLine::from_cart_line(line);
        match groups.iter_mut().find(|g| g.retailer_id == retailer_id) {
            Some(group) => {
                group.total += item.line_total;
                group.items.push(item);
            }
            None => groups.push(OrderGroup {
                retailer_id,
                total: item.line_total,
                items: vec![item],
            }),
        }
    }

    Ok(SplitResult { groups, dropped })
}

// =============================================================================
// Unit Tests
// =============================================================================
