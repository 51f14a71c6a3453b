//! # Pricing Calculator
//!
//! Pure derivation of every number the billing screen shows and submits.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Totals Pipeline                                 │
//! │                                                                         │
//! │  lines ──► subtotal = Σ price × qty                      38.47          │
//! │               │                                                         │
//! │               ▼                                                         │
//! │           gst = subtotal × 5 / 100                        1.9235        │
//! │               │                                                         │
//! │               ▼                                                         │
//! │           gross = subtotal + gst                         40.3935        │
//! │               │                                                         │
//! │               ├──► earned points = floor(gross / 100)     0             │
//! │               ▼                                                         │
//! │           redeem = clamp(requested, 0, min(points, gross))              │
//! │               │                                                         │
//! │               ▼                                                         │
//! │           total = floor(gross − redeem)                  40             │
//! │               │                                                         │
//! │               ▼                                                         │
//! │           KHATHA: paid = clamp(entered, 0, total)                       │
//! │           else:   paid = total                                          │
//! │               │                                                         │
//! │               ▼                                                         │
//! │           due = max(total − paid, 0)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recomputing is free of side effects: the same input always yields the
//! same [`BillTotals`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bill_items::encode_legacy_items;
use crate::cart::CartLine;
use crate::money::Money;
use crate::types::{BillType, GstRate, PaymentMode};

// =============================================================================
// Input
// =============================================================================

/// Everything the calculator reads.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub lines: &'a [CartLine],
    pub gst_rate: GstRate,
    /// Loyalty points of the selected customer; `None` for walk-ins.
    pub available_points: Option<u32>,
    /// Points the cashier asked to redeem (1 point = ₹1).
    pub requested_redeem: Money,
    pub payment_mode: PaymentMode,
    /// Amount the customer pays now; only read for KHATHA.
    pub custom_paid: Money,
}

impl<'a> PricingInput<'a> {
    /// Walk-in cash defaults over `lines`.
    pub fn new(lines: &'a [CartLine], gst_rate: GstRate) -> Self {
        PricingInput {
            lines,
            gst_rate,
            available_points: None,
            requested_redeem: Money::zero(),
            payment_mode: PaymentMode::Cash,
            custom_paid: Money::zero(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Derived bill numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub sub_total: Money,
    pub gst: Money,
    pub gross_total: Money,
    /// Points actually redeemed, after clamping.
    pub redeem: Money,
    /// Payable amount in whole rupees.
    pub total: Money,
    pub loyalty_points_earned: u32,
    pub paid_amount: Money,
    pub due_amount: Money,
}

/// Computes the bill totals.
///
/// Negative quantities cannot occur (`u32`); negative or oversized money
/// inputs are clamped, so every output is `>= 0`.
pub fn calculate(input: &PricingInput<'_>) -> BillTotals {
    let sub_total: Money = input.lines.iter().map(CartLine::line_total).sum();
    let gst = sub_total.calculate_gst(input.gst_rate);
    let gross_total = sub_total + gst;

    let available = Money::from_rupees(i64::from(input.available_points.unwrap_or(0)));
    let redeem = input
        .requested_redeem
        .clamp_between(Money::zero(), available.min(gross_total).non_negative());

    let total = (gross_total - redeem).floor().non_negative();
    let loyalty_points_earned = gross_total
        .divide(100)
        .map(|m| m.floor().whole_rupees().max(0))
        .map_or(0, |p| u32::try_from(p).unwrap_or(u32::MAX));

    let paid_amount = match input.payment_mode {
        PaymentMode::Khatha => input.custom_paid.clamp_between(Money::zero(), total),
        PaymentMode::Cash | PaymentMode::Upi => total,
    };
    let due_amount = (total - paid_amount).non_negative();

    BillTotals {
        sub_total,
        gst,
        gross_total,
        redeem,
        total,
        loyalty_points_earned,
        paid_amount,
        due_amount,
    }
}

// =============================================================================
// Bill Payload
// =============================================================================

/// Body of `POST /bills/{customerId}` and `POST /bills/paid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillRequest {
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub amount: Money,
    pub paid_amount: Money,
    pub payment_mode: PaymentMode,
    /// Legacy `barcode xQty` list.
    pub items: String,
    pub loyalty_points_used: Money,
}

impl BillRequest {
    /// Builds the counter-bill payload. KHATHA bills are recorded as GAVE,
    /// everything else as SALE.
    pub fn from_totals(lines: &[CartLine], totals: &BillTotals, mode: PaymentMode) -> Self {
        BillRequest {
            bill_type: match mode {
                PaymentMode::Khatha => BillType::Gave,
                PaymentMode::Cash | PaymentMode::Upi => BillType::Sale,
            },
            amount: totals.total,
            paid_amount: totals.paid_amount,
            payment_mode: mode,
            items: encode_legacy_items(lines),
            loyalty_points_used: totals.redeem,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(id: i64, paise: i64, qty: u32) -> CartLine {
        CartLine {
            product_id: id,
            name: format!("Item {}", id),
            barcode: format!("B{}", id),
            unit_price: Money::from_paise(paise),
            quantity: qty,
            unit: "pcs".to_string(),
            retailer_id: None,
            image_url: None,
        }
    }

    fn gst5() -> GstRate {
        GstRate::from_percent(5)
    }

    #[test]
    fn test_fractional_gst_is_floored_into_total() {
        let lines = vec![line(1, 3847, 1)];
        let totals = calculate(&PricingInput::new(&lines, gst5()));

        assert_eq!(totals.sub_total, Money::from_paise(3847));
        assert_eq!(totals.gst.amount(), Decimal::new(19235, 4));
        assert_eq!(totals.gross_total.amount(), Decimal::new(403935, 4));
        assert_eq!(totals.total, Money::from_rupees(40));
        assert_eq!(totals.paid_amount, Money::from_rupees(40));
        assert_eq!(totals.due_amount, Money::zero());
    }

    #[test]
    fn test_redemption_capped_by_gross_total() {
        // 95.24 + 5% = 100.002 gross
        let lines = vec![line(1, 9524, 1)];
        let mut input = PricingInput::new(&lines, gst5());
        input.available_points = Some(500);
        input.requested_redeem = Money::from_rupees(9999);

        let totals = calculate(&input);
        assert_eq!(totals.redeem, totals.gross_total);
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_redemption_capped_by_available_points() {
        let lines = vec![line(1, 100_000, 1)]; // ₹1000
        let mut input = PricingInput::new(&lines, gst5());
        input.available_points = Some(30);
        input.requested_redeem = Money::from_rupees(200);

        let totals = calculate(&input);
        assert_eq!(totals.redeem, Money::from_rupees(30));
        assert_eq!(totals.total, Money::from_rupees(1020));
        assert_eq!(totals.loyalty_points_earned, 10);
    }

    #[test]
    fn test_redeem_without_customer_is_zero() {
        let lines = vec![line(1, 10_000, 1)];
        let mut input = PricingInput::new(&lines, gst5());
        input.requested_redeem = Money::from_rupees(50);

        assert_eq!(calculate(&input).redeem, Money::zero());
    }

    #[test]
    fn test_negative_redeem_is_clamped() {
        let lines = vec![line(1, 10_000, 1)];
        let mut input = PricingInput::new(&lines, gst5());
        input.available_points = Some(100);
        input.requested_redeem = Money::from_rupees(-20);

        let totals = calculate(&input);
        assert_eq!(totals.redeem, Money::zero());
        assert_eq!(totals.total, Money::from_rupees(105));
    }

    #[test]
    fn test_khatha_paid_is_clamped_and_due_follows() {
        let lines = vec![line(1, 10_000, 1)]; // total 105
        let mut input = PricingInput::new(&lines, gst5());
        input.payment_mode = PaymentMode::Khatha;

        input.custom_paid = Money::from_rupees(40);
        let totals = calculate(&input);
        assert_eq!(totals.paid_amount, Money::from_rupees(40));
        assert_eq!(totals.due_amount, Money::from_rupees(65));

        input.custom_paid = Money::from_rupees(500);
        let totals = calculate(&input);
        assert_eq!(totals.paid_amount, Money::from_rupees(105));
        assert_eq!(totals.due_amount, Money::zero());

        input.custom_paid = Money::from_rupees(-3);
        let totals = calculate(&input);
        assert_eq!(totals.paid_amount, Money::zero());
        assert_eq!(totals.due_amount, Money::from_rupees(105));
    }

    #[test]
    fn test_cash_and_upi_ignore_entered_paid() {
        let lines = vec![line(1, 10_000, 1)];
        for mode in [PaymentMode::Cash, PaymentMode::Upi] {
            let mut input = PricingInput::new(&lines, gst5());
            input.payment_mode = mode;
            input.custom_paid = Money::from_rupees(3);

            let totals = calculate(&input);
            assert_eq!(totals.paid_amount, totals.total);
            assert_eq!(totals.due_amount, Money::zero());
        }
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let totals = calculate(&PricingInput::new(&[], gst5()));
        assert_eq!(totals, BillTotals::default());
    }

    #[test]
    fn test_recompute_is_stable() {
        let lines = vec![line(1, 3847, 2), line(2, 1999, 3)];
        let input = PricingInput::new(&lines, gst5());
        let snapshot = lines.clone();

        assert_eq!(calculate(&input), calculate(&input));
        assert_eq!(lines, snapshot);
    }

    #[test]
    fn test_bill_request_type_follows_mode() {
        let lines = vec![line(1, 1000, 2), line(2, 500, 1)];
        let mut input = PricingInput::new(&lines, gst5());
        input.payment_mode = PaymentMode::Khatha;
        input.custom_paid = Money::from_rupees(10);
        let totals = calculate(&input);

        let req = BillRequest::from_totals(&lines, &totals, PaymentMode::Khatha);
        assert_eq!(req.bill_type, BillType::Gave);
        assert_eq!(req.items, "B1 x2, B2 x1");
        assert_eq!(req.amount, Money::from_rupees(26));
        assert_eq!(req.paid_amount, Money::from_rupees(10));

        let cash = BillRequest::from_totals(&lines, &totals, PaymentMode::Cash);
        assert_eq!(cash.bill_type, BillType::Sale);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "GAVE");
        assert_eq!(json["paymentMode"], "KHATHA");
        assert!(json.get("loyaltyPointsUsed").is_some());
    }
}
