//! # Counter Cart Commands
//!
//! Every edit restores the draft sale, applies one change through
//! [`CheckoutSession`] and writes the draft back.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐   cart add    ┌──────────┐   cart mode   ┌──────────┐    │
//! │  │  Empty   │──────────────►│ Building │──────────────►│ Payment  │    │
//! │  │          │               │          │               │ selected │    │
//! │  └──────────┘               └──────────┘               └────┬─────┘    │
//! │       ▲                     cart set / dec / remove         │          │
//! │       │                     cart customer / redeem      khatha bill    │
//! │       │                                                     │          │
//! │       └─────────────── saved (cart reset to CASH) ◄─────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use khatha_client::api::products::find_by_barcode;
use khatha_core::cart::CartLine;
use khatha_core::checkout::CheckoutSession;
use khatha_core::pricing::BillTotals;
use khatha_core::{Customer, PaymentMode};

use crate::cli::CartCommand;
use crate::commands::{retailer_api, Reply};
use crate::error::{CommandError, CommandResult};
use crate::state::AppState;
use crate::view;

/// Cart contents with totals, as shown after every edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub totals: BillTotals,
    pub payment_mode: PaymentMode,
    pub customer: Option<Customer>,
    pub quick_mode: bool,
}

impl From<&CheckoutSession> for CartView {
    fn from(checkout: &CheckoutSession) -> Self {
        CartView {
            lines: checkout.cart().lines().to_vec(),
            totals: checkout.totals(),
            payment_mode: checkout.payment_mode(),
            customer: checkout.customer().cloned(),
            quick_mode: checkout.is_quick_mode(),
        }
    }
}

pub fn render(cart: &CartView) -> String {
    if cart.lines.is_empty() {
        return "Cart is empty".to_string();
    }
    let rows: Vec<Vec<String>> = cart
        .lines
        .iter()
        .map(|l| {
            vec![
                l.product_id.to_string(),
                l.name.clone(),
                format!("{} {}", l.quantity, l.unit),
                l.unit_price.to_string(),
                l.line_total().to_string(),
            ]
        })
        .collect();

    let customer = match &cart.customer {
        Some(c) => format!(
            "{} ({}), {} points, due {}",
            c.name, c.phone, c.loyalty_points, c.due_amount
        ),
        None => "walk-in".to_string(),
    };

    format!(
        "{}\n\n{}\n\nCustomer: {}\nPayment:  {}",
        view::table(&["Id", "Item", "Qty", "Price", "Amount"], &rows),
        view::totals(&cart.totals),
        customer,
        cart.payment_mode
    )
}

/// The draft sale with the configured GST rate and invoice mode.
pub(crate) async fn load_checkout(state: &AppState) -> CheckoutSession {
    let config = &state.config.config;
    state
        .drafts
        .checkout(config.gst_rate(), config.billing.quick_mode)
        .await
}

pub async fn run(state: &AppState, cmd: CartCommand) -> CommandResult<Reply> {
    let mut checkout = load_checkout(state).await;

    match cmd {
        CartCommand::Show => {}
        CartCommand::Add { barcode, id } => {
            let (api, _) = retailer_api(state).await?;
            let products = api.products().list().await?;
            let product = match (barcode.as_deref(), id) {
                (_, Some(id)) => products
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| CommandError::not_found("Product", id))?,
                (Some(code), None) => find_by_barcode(&products, code)
                    .ok_or_else(|| CommandError::not_found("Barcode", code.trim()))?,
                (None, None) => return Err(CommandError::validation("Give a barcode or --id")),
            };
            checkout.add_product(product)?;
            debug!(product_id = product.id, "Added to counter cart");
        }
        CartCommand::Dec { id } => checkout.decrement(id)?,
        CartCommand::Set { id, qty } => checkout.set_quantity(id, qty)?,
        CartCommand::Remove { id } => checkout.remove(id)?,
        CartCommand::Clear => {
            let config = &state.config.config;
            checkout = if config.billing.quick_mode {
                CheckoutSession::quick_invoice(config.gst_rate())
            } else {
                CheckoutSession::new(config.gst_rate())
            };
        }
        CartCommand::Customer { id, none } => {
            if none {
                checkout.detach_customer();
            } else if let Some(id) = id {
                let (api, _) = retailer_api(state).await?;
                let customer = api.customers().get(id).await?;
                checkout.attach_customer(customer);
            }
        }
        CartCommand::Redeem { points } => {
            if checkout.customer().is_none() {
                return Err(CommandError::validation("Attach a customer before redeeming points"));
            }
            checkout.set_redeem(points);
        }
        CartCommand::Paid { amount } => checkout.set_paid_amount(amount),
        CartCommand::Mode { mode } => checkout.select_payment_mode(mode),
    }

    state.drafts.save_checkout(&checkout).await?;
    let cart = CartView::from(&checkout);
    Reply::new(render(&cart), &cart)
}
