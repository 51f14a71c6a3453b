//! # Order-Splitting Submitter
//!
//! Places a customer's marketplace cart as one order per shop.
//!
//! ```text
//! cart ──split_by_retailer──► [group r1] [group r2] ...
//!                                 │          │
//!                          POST /orders/create (all at once)
//!                                 │          │
//!                                 └──join_all┘
//!                                      │
//!                 all ok ──► cart cleared, orders returned
//!                 any err ─► OrderSubmission { failed, total }, cart kept
//! ```
//!
//! Orders that did succeed are not withdrawn when a sibling fails.

use futures_util::future::join_all;
use tracing::{info, warn};

use khatha_core::cart::Cart;
use khatha_core::order_split::split_by_retailer;
use khatha_core::{CoreError, CustomerAccount, Order, OrderPaymentMode};

use crate::api::KhathaApi;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct PlacedOrders {
    pub orders: Vec<Order>,
    /// Cart lines left out for lack of a retailer.
    pub dropped: usize,
}

pub async fn place_orders(
    api: &KhathaApi,
    cart: &mut Cart,
    account: &CustomerAccount,
    payment_mode: OrderPaymentMode,
) -> ClientResult<PlacedOrders> {
    let split = split_by_retailer(cart.lines(), Some(account.retailer_id))?;
    // Every line lacked a shop: nothing is sent and the cart stays as it was.
    if split.groups.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let requests: Vec<_> = split
        .groups
        .iter()
        .map(|g| g.to_request(account.customer_id, payment_mode))
        .collect();
    let total = requests.len();
    info!(
        customer_id = account.customer_id,
        shops = total,
        mode = %payment_mode,
        "Placing orders"
    );

    let orders_api = api.orders();
    let results = join_all(requests.iter().map(|r| orders_api.create(r))).await;

    let mut orders = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(order) => orders.push(order),
            Err(e) => {
                warn!(retailer_id = request.retailer_id, error = %e, "Order failed");
                failures.push(e);
            }
        }
    }

    if let Some(first) = failures.first() {
        return Err(ClientError::OrderSubmission {
            failed: failures.len(),
            total,
            message: first.to_string(),
        });
    }

    cart.clear();
    Ok(PlacedOrders {
        orders,
        dropped: split.dropped,
    })
}
