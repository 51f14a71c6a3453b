//! # Bill Command
//!
//! `khatha bill` saves the draft sale.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  draft ──► BillingWorkflow::submit                                     │
//! │               │                                                         │
//! │               ├── CustomerRequired ──► "Create a new customer now?"    │
//! │               │                         yes: name, phone ──► retry     │
//! │               │                                                         │
//! │               ├── NeedsUpiConfirmation ──► show upi:// link            │
//! │               │      "Payment received?"  yes ──► confirm_upi          │
//! │               │                           no  ──► cancel, cart kept    │
//! │               │                                                         │
//! │               └── Saved ──► receipt                                     │
//! │                                                                         │
//! │  The draft is written back on every path, so a failed bill can be      │
//! │  retried with `khatha bill` and nothing re-entered.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::info;

use khatha_client::workflow::{BillingWorkflow, SavedBill, SubmitOutcome};
use khatha_client::ClientError;
use khatha_core::bill_items::ReceiptRow;
use khatha_core::checkout::CheckoutSession;
use khatha_core::pricing::BillTotals;
use khatha_core::{CoreError, NewCustomer};

use crate::cli::BillArgs;
use crate::commands::cart::load_checkout;
use crate::commands::{retailer_api, Reply};
use crate::error::{CommandError, CommandResult, ErrorCode};
use crate::prompt::Prompt;
use crate::state::AppState;
use crate::view;

/// What `khatha bill` prints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillReceipt {
    pub bill_id: i64,
    pub bill_number: Option<String>,
    pub payment_mode: Option<String>,
    pub totals: BillTotals,
    pub rows: Vec<ReceiptRow>,
    pub upi_link: Option<String>,
}

impl BillReceipt {
    fn new(saved: &SavedBill, upi_link: Option<String>) -> Self {
        BillReceipt {
            bill_id: saved.bill.id,
            bill_number: saved.bill.bill_number.clone(),
            payment_mode: saved.bill.payment_mode.clone(),
            totals: saved.totals,
            rows: saved.receipt.clone(),
            upi_link,
        }
    }

    fn render(&self) -> String {
        let number = self.bill_number.clone().unwrap_or_else(|| self.bill_id.to_string());
        let mut out = format!(
            "Bill {} saved\n\n{}",
            number,
            view::receipt(&self.rows, self.totals.total)
        );
        if self.totals.due_amount.is_positive() {
            out.push_str(&format!(
                "\nPaid {}  Due {}",
                self.totals.paid_amount, self.totals.due_amount
            ));
        }
        if self.totals.loyalty_points_earned > 0 {
            out.push_str(&format!("\nPoints earned: {}", self.totals.loyalty_points_earned));
        }
        out
    }
}

pub async fn run(state: &AppState, args: BillArgs, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    let (api, _) = retailer_api(state).await?;
    let upi = state.session.snapshot().await.upi_payee();
    let workflow = BillingWorkflow::new(&api);
    let mut checkout = load_checkout(state).await;

    if let (Some(name), Some(phone)) = (args.new_customer_name, args.new_customer_phone) {
        let customer = NewCustomer {
            name,
            phone,
            email: None,
        };
        let created = workflow.create_customer(&mut checkout, &customer).await?;
        info!(customer_id = created.id, "Customer created at the counter");
        state.drafts.save_checkout(&checkout).await?;
    }

    let submitted = match workflow.submit(&mut checkout, upi.as_ref()).await {
        Err(ClientError::Core(CoreError::CustomerRequired { .. }))
            if prompt.confirm("This bill needs a customer. Create a new customer now?") =>
        {
            let customer = NewCustomer {
                name: prompt.ask("Customer name:"),
                phone: prompt.ask("Phone:"),
                email: None,
            };
            let created = workflow.create_customer(&mut checkout, &customer).await?;
            info!(customer_id = created.id, "Customer created at the counter");
            state.drafts.save_checkout(&checkout).await?;
            workflow.submit(&mut checkout, upi.as_ref()).await
        }
        other => other,
    };
    let outcome = keep_draft(state, &checkout, submitted).await?;

    let (saved, upi_link) = match outcome {
        SubmitOutcome::Saved(saved) => (*saved, None),
        SubmitOutcome::NeedsUpiConfirmation { link, amount } => {
            let received = args.upi_received
                || prompt.confirm(&format!(
                    "Ask the customer to pay {} by UPI:\n  {}\nPayment received?",
                    amount, link
                ));
            if !received {
                checkout.cancel_upi();
                state.drafts.save_checkout(&checkout).await?;
                return Err(CommandError::new(
                    ErrorCode::Cancelled,
                    "UPI payment not confirmed; the sale is still in the cart",
                ));
            }
            let confirmed = workflow.confirm_upi(&mut checkout).await;
            (keep_draft(state, &checkout, confirmed).await?, Some(link))
        }
    };

    state.drafts.save_checkout(&checkout).await?;
    let receipt = BillReceipt::new(&saved, upi_link);
    Reply::new(receipt.render(), &receipt)
}

/// Writes the draft back before an error leaves the command.
async fn keep_draft<T>(
    state: &AppState,
    checkout: &CheckoutSession,
    result: Result<T, ClientError>,
) -> CommandResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            state.drafts.save_checkout(checkout).await?;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khatha_core::Money;

    #[test]
    fn test_receipt_text_shows_due_for_credit_bills() {
        let receipt = BillReceipt {
            bill_id: 31,
            bill_number: Some("INV-31".into()),
            payment_mode: Some("KHATHA".into()),
            totals: BillTotals {
                total: Money::from_rupees(100),
                paid_amount: Money::from_rupees(40),
                due_amount: Money::from_rupees(60),
                ..BillTotals::default()
            },
            rows: vec![ReceiptRow {
                name: "Rice".into(),
                qty: 2,
                unit_price: Money::from_rupees(50),
                amount: Money::from_rupees(100),
            }],
            upi_link: None,
        };
        let text = receipt.render();
        assert!(text.starts_with("Bill INV-31 saved"));
        assert!(text.contains("Paid ₹40.00  Due ₹60.00"));
    }
}
