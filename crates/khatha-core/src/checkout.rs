//! # Checkout State Machine
//!
//! One counter sale from first scan to saved bill.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐  select_payment_mode  ┌─────────────────────┐            │
//! │   │ Building │ ────────────────────► │ PaymentModeSelected │            │
//! │   └────┬─────┘                       └──────────┬──────────┘            │
//! │        │ begin_submit (CASH/KHATHA)             │ begin_submit (UPI)    │
//! │        │                                        ▼                       │
//! │        │                        ┌──────────────────────────────┐        │
//! │        │                        │   AwaitingUpiConfirmation    │        │
//! │        │                        │   upi://pay?pa=..&am=..      │        │
//! │        │                        └──────────────┬───────────────┘        │
//! │        │                                       │ confirm_upi_received   │
//! │        ▼                                       ▼                        │
//! │   ┌──────────────────── submitting = true ────────────────────┐        │
//! │   │   complete(bill) ──► Submitted (cart reset, mode CASH)     │        │
//! │   │   fail()         ──► PaymentModeSelected (cart kept)       │        │
//! │   └────────────────────────────────────────────────────────────┘        │
//! │                                                                         │
//! │   Rejected before any request:                                         │
//! │     empty cart          → EmptyCart                                    │
//! │     KHATHA, no customer → CustomerRequired                             │
//! │     quick mode, no cust → CustomerRequired                             │
//! │     already submitting  → SubmissionInProgress                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine is pure. `khatha-client::workflow::billing` performs the
//! request between `begin_submit` and `complete`/`fail`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{calculate, BillRequest, BillTotals, PricingInput};
use crate::types::{Customer, GstRate, PaymentMode, Product};
use crate::upi::payment_link;

// =============================================================================
// States & Steps
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutState {
    Building,
    PaymentModeSelected,
    AwaitingUpiConfirmation { link: String, amount: Money },
    Submitted { bill_id: i64 },
}

impl CheckoutState {
    fn name(&self) -> &'static str {
        match self {
            CheckoutState::Building => "building",
            CheckoutState::PaymentModeSelected => "payment mode selected",
            CheckoutState::AwaitingUpiConfirmation { .. } => "awaiting UPI confirmation",
            CheckoutState::Submitted { .. } => "submitted",
        }
    }
}

/// Where the shop receives UPI transfers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpiPayee {
    pub upi_id: String,
    pub payee_name: Option<String>,
}

/// What the caller must do next after `begin_submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStep {
    /// Show the link and wait for the cashier to confirm the transfer.
    ConfirmUpi { link: String, amount: Money },
    /// Send the bill.
    Send(SubmitPlan),
}

/// A bill ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitPlan {
    /// `Some` ⇒ `POST /bills/{id}`, `None` ⇒ `POST /bills/paid`.
    pub customer_id: Option<i64>,
    pub request: BillRequest,
    pub totals: BillTotals,
}

// =============================================================================
// Checkout Session
// =============================================================================

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    id: Uuid,
    cart: Cart,
    state: CheckoutState,
    payment_mode: PaymentMode,
    customer: Option<Customer>,
    requested_redeem: Money,
    custom_paid: Money,
    gst_rate: GstRate,
    quick_mode: bool,
    submitting: bool,
}

impl CheckoutSession {
    pub fn new(gst_rate: GstRate) -> Self {
        CheckoutSession {
            id: Uuid::new_v4(),
            cart: Cart::new(),
            state: CheckoutState::Building,
            payment_mode: PaymentMode::Cash,
            customer: None,
            requested_redeem: Money::zero(),
            custom_paid: Money::zero(),
            gst_rate,
            quick_mode: false,
            submitting: false,
        }
    }

    /// Quick-invoice mode: every bill needs a customer.
    pub fn quick_invoice(gst_rate: GstRate) -> Self {
        CheckoutSession {
            quick_mode: true,
            ..CheckoutSession::new(gst_rate)
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_quick_mode(&self) -> bool {
        self.quick_mode
    }

    /// Current totals. Pure; call as often as needed.
    pub fn totals(&self) -> BillTotals {
        calculate(&PricingInput {
            lines: self.cart.lines(),
            gst_rate: self.gst_rate,
            available_points: self.customer.as_ref().map(|c| c.loyalty_points),
            requested_redeem: self.requested_redeem,
            payment_mode: self.payment_mode,
            custom_paid: self.custom_paid,
        })
    }

    // -------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------

    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        self.start_new_sale_if_done();
        self.cart.add_product(product)?;
        self.invalidate_upi();
        Ok(())
    }

    pub fn decrement(&mut self, product_id: i64) -> CoreResult<()> {
        self.cart.decrement(product_id)?;
        self.invalidate_upi();
        Ok(())
    }

    pub fn set_quantity(&mut self, product_id: i64, quantity: u32) -> CoreResult<()> {
        self.cart.set_quantity(product_id, quantity)?;
        self.invalidate_upi();
        Ok(())
    }

    pub fn remove(&mut self, product_id: i64) -> CoreResult<()> {
        self.cart.remove(product_id)?;
        self.invalidate_upi();
        Ok(())
    }

    pub fn attach_customer(&mut self, customer: Customer) {
        debug!(checkout = %self.id, customer_id = customer.id, "Customer attached");
        self.customer = Some(customer);
        self.invalidate_upi();
    }

    pub fn detach_customer(&mut self) {
        self.customer = None;
        self.requested_redeem = Money::zero();
        self.invalidate_upi();
    }

    /// Points to redeem; clamped at calculation time.
    pub fn set_redeem(&mut self, points: Money) {
        self.requested_redeem = points;
        self.invalidate_upi();
    }

    /// Amount paid now on a KHATHA bill; clamped at calculation time.
    pub fn set_paid_amount(&mut self, paid: Money) {
        self.custom_paid = paid;
    }

    pub fn select_payment_mode(&mut self, mode: PaymentMode) {
        self.start_new_sale_if_done();
        self.payment_mode = mode;
        self.state = CheckoutState::PaymentModeSelected;
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Checks the bill can be sent and says what happens next.
    pub fn begin_submit(&mut self, upi: Option<&UpiPayee>) -> CoreResult<SubmitStep> {
        if self.submitting {
            return Err(CoreError::SubmissionInProgress);
        }
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if self.payment_mode == PaymentMode::Khatha && self.customer.is_none() {
            return Err(CoreError::CustomerRequired {
                reason: "credit bills need a customer".to_string(),
            });
        }
        if self.quick_mode && self.customer.is_none() {
            return Err(CoreError::CustomerRequired {
                reason: "invoices need a customer".to_string(),
            });
        }

        if self.payment_mode == PaymentMode::Upi {
            if let CheckoutState::AwaitingUpiConfirmation { link, amount } = &self.state {
                return Ok(SubmitStep::ConfirmUpi {
                    link: link.clone(),
                    amount: *amount,
                });
            }
            let payee = upi.ok_or(CoreError::UpiNotConfigured)?;
            let amount = self.totals().total;
            let link = payment_link(&payee.upi_id, payee.payee_name.as_deref(), amount)?;
            debug!(checkout = %self.id, %amount, "Waiting for UPI confirmation");
            self.state = CheckoutState::AwaitingUpiConfirmation {
                link: link.clone(),
                amount,
            };
            return Ok(SubmitStep::ConfirmUpi { link, amount });
        }

        Ok(SubmitStep::Send(self.lock_for_submit()))
    }

    /// The cashier saw the UPI transfer arrive.
    pub fn confirm_upi_received(&mut self) -> CoreResult<SubmitPlan> {
        if self.submitting {
            return Err(CoreError::SubmissionInProgress);
        }
        if !matches!(self.state, CheckoutState::AwaitingUpiConfirmation { .. }) {
            return Err(CoreError::InvalidTransition {
                state: self.state.name().to_string(),
                action: "confirm a UPI payment".to_string(),
            });
        }
        Ok(self.lock_for_submit())
    }

    /// Backs out of the UPI prompt without sending anything.
    pub fn cancel_upi(&mut self) {
        if matches!(self.state, CheckoutState::AwaitingUpiConfirmation { .. }) {
            self.state = CheckoutState::PaymentModeSelected;
        }
    }

    /// The bill was saved. Resets the sale for the next customer.
    pub fn complete(&mut self, bill_id: i64) {
        debug!(checkout = %self.id, bill_id, "Bill saved");
        self.submitting = false;
        self.cart.clear();
        self.customer = None;
        self.requested_redeem = Money::zero();
        self.custom_paid = Money::zero();
        self.payment_mode = PaymentMode::Cash;
        self.state = CheckoutState::Submitted { bill_id };
    }

    /// The request failed. Everything entered is kept for a retry.
    pub fn fail(&mut self) {
        debug!(checkout = %self.id, "Bill submission failed; cart kept");
        self.submitting = false;
        self.state = CheckoutState::PaymentModeSelected;
    }

    fn lock_for_submit(&mut self) -> SubmitPlan {
        self.submitting = true;
        let totals = self.totals();
        SubmitPlan {
            customer_id: self.customer.as_ref().map(|c| c.id),
            request: BillRequest::from_totals(self.cart.lines(), &totals, self.payment_mode),
            totals,
        }
    }

    fn invalidate_upi(&mut self) {
        if matches!(self.state, CheckoutState::AwaitingUpiConfirmation { .. }) {
            self.state = CheckoutState::PaymentModeSelected;
        }
    }

    fn start_new_sale_if_done(&mut self) {
        if matches!(self.state, CheckoutState::Submitted { .. }) {
            self.id = Uuid::new_v4();
            self.state = CheckoutState::Building;
        }
    }
}

// =============================================================================
// Draft (persisted between terminal invocations)
// =============================================================================

/// The part of a sale worth keeping on disk while it is being built.
///
/// UPI confirmation and the in-flight flag are deliberately absent: a
/// restored sale always starts from `Building`/`PaymentModeSelected`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub cart: Cart,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub requested_redeem: Money,
    #[serde(default)]
    pub custom_paid: Money,
    #[serde(default)]
    pub quick_mode: bool,
}

impl CheckoutSession {
    pub fn from_draft(draft: CheckoutDraft, gst_rate: GstRate) -> Self {
        let state = if draft.payment_mode == PaymentMode::Cash {
            CheckoutState::Building
        } else {
            CheckoutState::PaymentModeSelected
        };
        CheckoutSession {
            cart: draft.cart,
            state,
            payment_mode: draft.payment_mode,
            customer: draft.customer,
            requested_redeem: draft.requested_redeem,
            custom_paid: draft.custom_paid,
            quick_mode: draft.quick_mode,
            ..CheckoutSession::new(gst_rate)
        }
    }

    pub fn to_draft(&self) -> CheckoutDraft {
        CheckoutDraft {
            cart: self.cart.clone(),
            payment_mode: self.payment_mode,
            customer: self.customer.clone(),
            requested_redeem: self.requested_redeem,
            custom_paid: self.custom_paid,
            quick_mode: self.quick_mode,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BillType, ProductType};

    fn product(id: i64, rupees: i64) -> Product {
        Product {
            id,
            name: format!("P{}", id),
            barcode: format!("B{}", id),
            price: Money::from_rupees(rupees),
            quantity: 10,
            product_type: ProductType::Unit,
            category: None,
            image_url: None,
            retailer_id: None,
        }
    }

    fn customer(points: u32) -> Customer {
        Customer {
            id: 42,
            name: "Asha".into(),
            phone: "9876543210".into(),
            email: None,
            loyalty_points: points,
            due_amount: Money::zero(),
            scheme_monthly_amount: None,
            scheme_target_amount: None,
            scheme_collected_amount: None,
        }
    }

    fn payee() -> UpiPayee {
        UpiPayee {
            upi_id: "shop@upi".into(),
            payee_name: Some("Shop".into()),
        }
    }

    fn session_with_item() -> CheckoutSession {
        let mut s = CheckoutSession::new(GstRate::from_percent(5));
        s.add_product(&product(1, 100)).unwrap();
        s
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut s = CheckoutSession::new(GstRate::from_percent(5));
        assert_eq!(s.begin_submit(None), Err(CoreError::EmptyCart));
        assert!(!s.is_submitting());
    }

    #[test]
    fn test_cash_walk_in_goes_straight_to_send() {
        let mut s = session_with_item();
        let SubmitStep::Send(plan) = s.begin_submit(None).unwrap() else {
            panic!("expected send");
        };
        assert_eq!(plan.customer_id, None);
        assert_eq!(plan.request.bill_type, BillType::Sale);
        assert_eq!(plan.request.amount, Money::from_rupees(105));
        assert!(s.is_submitting());
    }

    #[test]
    fn test_second_submit_while_in_flight_is_rejected() {
        let mut s = session_with_item();
        s.begin_submit(None).unwrap();
        assert_eq!(s.begin_submit(None), Err(CoreError::SubmissionInProgress));
    }

    #[test]
    fn test_khatha_needs_customer() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Khatha);
        let err = s.begin_submit(None).unwrap_err();
        assert!(err.needs_customer());

        s.attach_customer(customer(0));
        s.set_paid_amount(Money::from_rupees(5));
        let SubmitStep::Send(plan) = s.begin_submit(None).unwrap() else {
            panic!("expected send");
        };
        assert_eq!(plan.customer_id, Some(42));
        assert_eq!(plan.request.bill_type, BillType::Gave);
        assert_eq!(plan.totals.due_amount, Money::from_rupees(100));
    }

    #[test]
    fn test_quick_mode_needs_customer_even_for_cash() {
        let mut s = CheckoutSession::quick_invoice(GstRate::from_percent(5));
        s.add_product(&product(1, 10)).unwrap();
        assert!(s.begin_submit(None).unwrap_err().needs_customer());
    }

    #[test]
    fn test_upi_waits_for_confirmation() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Upi);

        let step = s.begin_submit(Some(&payee())).unwrap();
        let SubmitStep::ConfirmUpi { link, amount } = step else {
            panic!("expected UPI prompt");
        };
        assert!(link.contains("am=105"));
        assert_eq!(amount, Money::from_rupees(105));
        assert!(!s.is_submitting());

        let plan = s.confirm_upi_received().unwrap();
        assert_eq!(plan.request.payment_mode, PaymentMode::Upi);
        assert!(s.is_submitting());
    }

    #[test]
    fn test_upi_without_payee() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Upi);
        assert_eq!(s.begin_submit(None), Err(CoreError::UpiNotConfigured));
    }

    #[test]
    fn test_cart_edit_invalidates_upi_prompt() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Upi);
        s.begin_submit(Some(&payee())).unwrap();

        s.add_product(&product(2, 50)).unwrap();
        assert_eq!(s.state(), &CheckoutState::PaymentModeSelected);
        assert!(s.confirm_upi_received().is_err());
    }

    #[test]
    fn test_confirm_without_prompt_is_invalid() {
        let mut s = session_with_item();
        assert!(matches!(
            s.confirm_upi_received(),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_failure_keeps_cart() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Khatha);
        s.attach_customer(customer(10));
        s.begin_submit(None).unwrap();

        s.fail();
        assert!(!s.is_submitting());
        assert_eq!(s.cart().item_count(), 1);
        assert_eq!(s.payment_mode(), PaymentMode::Khatha);
        assert!(s.customer().is_some());
    }

    #[test]
    fn test_complete_resets_sale() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Khatha);
        s.attach_customer(customer(10));
        s.set_redeem(Money::from_rupees(5));
        s.begin_submit(None).unwrap();
        let first_id = s.id();

        s.complete(77);
        assert_eq!(s.state(), &CheckoutState::Submitted { bill_id: 77 });
        assert!(s.cart().is_empty());
        assert!(s.customer().is_none());
        assert_eq!(s.payment_mode(), PaymentMode::Cash);
        assert_eq!(s.totals(), BillTotals::default());

        s.add_product(&product(3, 10)).unwrap();
        assert_eq!(s.state(), &CheckoutState::Building);
        assert_ne!(s.id(), first_id);
    }

    #[test]
    fn test_draft_restores_sale() {
        let mut s = session_with_item();
        s.select_payment_mode(PaymentMode::Khatha);
        s.attach_customer(customer(3));
        s.set_paid_amount(Money::from_rupees(20));

        let json = serde_json::to_string(&s.to_draft()).unwrap();
        let draft: CheckoutDraft = serde_json::from_str(&json).unwrap();
        let restored = CheckoutSession::from_draft(draft, GstRate::from_percent(5));

        assert_eq!(restored.totals(), s.totals());
        assert_eq!(restored.state(), &CheckoutState::PaymentModeSelected);
        assert!(!restored.is_submitting());
    }

    #[test]
    fn test_redeem_flows_into_request() {
        let mut s = session_with_item();
        s.attach_customer(customer(20));
        s.set_redeem(Money::from_rupees(50));
        let SubmitStep::Send(plan) = s.begin_submit(None).unwrap() else {
            panic!("expected send");
        };
        assert_eq!(plan.request.loyalty_points_used, Money::from_rupees(20));
        assert_eq!(plan.request.amount, Money::from_rupees(85));
    }
}
