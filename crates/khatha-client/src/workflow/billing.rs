//! # Bill Submission Workflow
//!
//! Drives a [`CheckoutSession`] against the backend.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit(checkout, upi)                                                 │
//! │     │                                                                   │
//! │     ├── CoreError (empty cart, customer required, in progress) ──► Err │
//! │     │                                                                   │
//! │     ├── UPI ──► NeedsUpiConfirmation { link, amount }                  │
//! │     │              │                                                    │
//! │     │              └── confirm_upi(checkout) ──┐                        │
//! │     │                                          │                        │
//! │     └── CASH / KHATHA ─────────────────────────┤                        │
//! │                                                ▼                        │
//! │            POST /bills/{customerId}  or  POST /bills/paid              │
//! │                 │                          │                            │
//! │                 ▼ ok                       ▼ err                        │
//! │     checkout.complete(bill.id)      checkout.fail()  (cart kept)       │
//! │     reload products + customers     backend text returned verbatim     │
//! │     render receipt rows                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use khatha_core::bill_items::{BillItems, ReceiptRow};
use khatha_core::cart::CartLine;
use khatha_core::checkout::{CheckoutSession, SubmitPlan, SubmitStep, UpiPayee};
use khatha_core::pricing::BillTotals;
use khatha_core::{Bill, Customer, Money, NewCustomer, Product, ProductType};

use crate::api::KhathaApi;
use crate::error::ClientResult;

/// A saved counter bill.
#[derive(Debug, Clone)]
pub struct SavedBill {
    pub bill: Bill,
    pub totals: BillTotals,
    pub receipt: Vec<ReceiptRow>,
    /// Fresh lists after the sale; `None` if the reload failed.
    pub products: Option<Vec<Product>>,
    pub customers: Option<Vec<Customer>>,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Show the UPI link; call [`BillingWorkflow::confirm_upi`] once the
    /// money has arrived.
    NeedsUpiConfirmation { link: String, amount: Money },
    Saved(Box<SavedBill>),
}

pub struct BillingWorkflow<'a> {
    api: &'a KhathaApi,
}

impl<'a> BillingWorkflow<'a> {
    pub fn new(api: &'a KhathaApi) -> Self {
        BillingWorkflow { api }
    }

    pub async fn submit(&self, checkout: &mut CheckoutSession, upi: Option<&UpiPayee>) -> ClientResult<SubmitOutcome> {
        match checkout.begin_submit(upi)? {
            SubmitStep::ConfirmUpi { link, amount } => {
                info!(checkout = %checkout.id(), %amount, "UPI payment requested");
                Ok(SubmitOutcome::NeedsUpiConfirmation { link, amount })
            }
            SubmitStep::Send(plan) => {
                let saved = self.send(checkout, plan).await?;
                Ok(SubmitOutcome::Saved(Box::new(saved)))
            }
        }
    }

    /// The cashier confirmed the UPI transfer.
    pub async fn confirm_upi(&self, checkout: &mut CheckoutSession) -> ClientResult<SavedBill> {
        let plan = checkout.confirm_upi_received()?;
        self.send(checkout, plan).await
    }

    /// Inline customer creation from the billing screen; the new customer
    /// is attached so a blocked KHATHA bill can go through.
    pub async fn create_customer(&self, checkout: &mut CheckoutSession, customer: &NewCustomer) -> ClientResult<Customer> {
        let created = self.api.customers().create(customer).await?;
        checkout.attach_customer(created.clone());
        Ok(created)
    }

    async fn send(&self, checkout: &mut CheckoutSession, plan: SubmitPlan) -> ClientResult<SavedBill> {
        let lines = checkout.cart().lines().to_vec();
        let bills = self.api.bills();

        let result = match plan.customer_id {
            Some(customer_id) => bills.create_for_customer(customer_id, &plan.request).await,
            None => bills.create_paid(&plan.request).await,
        };

        let bill = match result {
            Ok(bill) => bill,
            Err(e) => {
                warn!(checkout = %checkout.id(), error = %e, "Bill submission failed");
                checkout.fail();
                return Err(e);
            }
        };

        checkout.complete(bill.id);
        info!(
            bill_id = bill.id,
            total = %plan.totals.total,
            mode = %plan.request.payment_mode,
            "Bill saved"
        );

        let products = match self.api.products().list().await {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "Product reload after sale failed");
                None
            }
        };
        let customers = match self.api.customers().list().await {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(error = %e, "Customer reload after sale failed");
                None
            }
        };

        let items = bill.items.clone().unwrap_or_else(|| plan.request.items.clone());
        let fallback = catalog_from_lines(&lines);
        let catalog = products.as_deref().unwrap_or(fallback.as_slice());
        let receipt = BillItems::decode(Some(items.as_str())).receipt_rows(catalog, bill.amount);

        Ok(SavedBill {
            bill,
            totals: plan.totals,
            receipt,
            products,
            customers,
        })
    }
}

/// Products as they were in the cart, for rendering a receipt when the
/// catalogue could not be reloaded.
fn catalog_from_lines(lines: &[CartLine]) -> Vec<Product> {
    lines
        .iter()
        .map(|l| Product {
            id: l.product_id,
            name: l.name.clone(),
            barcode: l.barcode.clone(),
            price: l.unit_price,
            quantity: 0,
            product_type: ProductType::Unit,
            category: None,
            image_url: l.image_url.clone(),
            retailer_id: l.retailer_id,
        })
        .collect()
}
