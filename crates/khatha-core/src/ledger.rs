//! # Customer Ledger
//!
//! Manual khatha entries, bill edits, statements and savings-scheme
//! progress.
//!
//! ## Entry Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kind       type       paid        paymentMode            items         │
//! │  ────────   ────────   ─────────   ────────────────────   ────────────  │
//! │  Gave       GAVE       0           KHATHA                 text or       │
//! │                                                           "Manual entry"│
//! │  Received   RECEIVED   amount      note or "PAYMENT"      note or       │
//! │                                                      "Payment received" │
//! │  Scheme     SCHEME     amount      note or                "Monthly      │
//! │                                    "SCHEME_DEPOSIT"    Savings Deposit" │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Bill, BillStatus, BillType, Customer, PaymentMode};
use crate::validation::validate_entry_amount;

/// Months in one savings scheme cycle.
pub const SCHEME_MONTHS: u32 = 12;

/// Monthly deposit when the customer has none set.
pub const DEFAULT_SCHEME_MONTHLY_RUPEES: i64 = 500;

/// Scheme target when the customer has none set.
pub const DEFAULT_SCHEME_TARGET_RUPEES: i64 = 6000;

// =============================================================================
// Manual Entries
// =============================================================================

/// A hand-written ledger line.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    /// Goods given on credit.
    Gave { amount: Money, items: Option<String> },
    /// Money received against the due.
    Received { amount: Money, note: Option<String> },
    /// Savings scheme deposit.
    Scheme { amount: Money, note: Option<String> },
}

/// Body of `POST /bills/{customerId}` for a manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryRequest {
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub amount: Money,
    pub paid_amount: Money,
    pub payment_mode: String,
    pub items: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_date: Option<NaiveDate>,
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

impl LedgerEntry {
    pub fn amount(&self) -> Money {
        match self {
            LedgerEntry::Gave { amount, .. }
            | LedgerEntry::Received { amount, .. }
            | LedgerEntry::Scheme { amount, .. } => *amount,
        }
    }

    /// Validates the amount and builds the request body.
    pub fn to_request(&self, bill_date: Option<NaiveDate>) -> CoreResult<LedgerEntryRequest> {
        let amount = self.amount();
        validate_entry_amount(amount)?;

        let request = match self {
            LedgerEntry::Gave { items, .. } => LedgerEntryRequest {
                bill_type: BillType::Gave,
                amount,
                paid_amount: Money::zero(),
                payment_mode: PaymentMode::Khatha.to_string(),
                items: non_blank(items).unwrap_or("Manual entry").to_string(),
                bill_date,
            },
            LedgerEntry::Received { note, .. } => LedgerEntryRequest {
                bill_type: BillType::Received,
                amount,
                paid_amount: amount,
                payment_mode: non_blank(note).unwrap_or("PAYMENT").to_string(),
                items: non_blank(note).unwrap_or("Payment received").to_string(),
                bill_date,
            },
            LedgerEntry::Scheme { note, .. } => LedgerEntryRequest {
                bill_type: BillType::Scheme,
                amount,
                paid_amount: amount,
                payment_mode: non_blank(note).unwrap_or("SCHEME_DEPOSIT").to_string(),
                items: "Monthly Savings Deposit".to_string(),
                bill_date,
            },
        };
        Ok(request)
    }
}

// =============================================================================
// Bill Edit
// =============================================================================

/// Body of `PUT /bills/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillUpdate {
    pub amount: Money,
    pub paid_amount: Money,
    pub status: BillStatus,
    pub payment_mode: PaymentMode,
    /// amount − paid, unclamped; the backend decides what a negative means.
    pub due_amount: Money,
    pub retailer_id: i64,
}

impl BillUpdate {
    pub fn new(
        amount: Money,
        paid_amount: Money,
        status: BillStatus,
        payment_mode: PaymentMode,
        retailer_id: i64,
    ) -> Self {
        BillUpdate {
            amount,
            paid_amount,
            status,
            payment_mode,
            due_amount: amount - paid_amount,
            retailer_id,
        }
    }

    /// Starts from a stored bill's current values.
    pub fn from_bill(bill: &Bill, retailer_id: i64) -> Self {
        BillUpdate::new(
            bill.amount,
            bill.paid_amount,
            bill.status.unwrap_or(BillStatus::Paid),
            bill.counter_payment_mode().unwrap_or_default(),
            retailer_id,
        )
    }
}

// =============================================================================
// Statement
// =============================================================================

/// Ledger list orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillSort {
    #[default]
    Newest,
    Oldest,
    AmountHighToLow,
}

impl std::str::FromStr for BillSort {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "new" => Ok(BillSort::Newest),
            "oldest" | "old" => Ok(BillSort::Oldest),
            "amount" | "high-low" => Ok(BillSort::AmountHighToLow),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: vec!["newest".into(), "oldest".into(), "amount".into()],
            }),
        }
    }
}

/// Sorts bills in place. Bills without a readable date sort last for
/// `Newest` and first for `Oldest`.
pub fn sort_bills(bills: &mut [Bill], sort: BillSort) {
    match sort {
        BillSort::Newest => bills.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
        BillSort::Oldest => bills.sort_by(|a, b| a.timestamp().cmp(&b.timestamp())),
        BillSort::AmountHighToLow => bills.sort_by(|a, b| b.amount.cmp(&a.amount)),
    }
}

/// Totals over one customer's bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub total_billed: Money,
    pub total_paid: Money,
    pub total_due: Money,
    pub redeemed_points: Money,
    pub entries: usize,
}

impl Statement {
    pub fn from_bills(bills: &[Bill]) -> Self {
        bills.iter().fold(Statement::default(), |mut s, b| {
            s.total_billed += b.amount;
            s.total_paid += b.paid_amount;
            s.total_due += b.due_amount;
            s.redeemed_points += b.loyalty_points_used.unwrap_or_default();
            s.entries += 1;
            s
        })
    }
}

// =============================================================================
// Scheme Progress
// =============================================================================

/// Savings scheme progress for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeProgress {
    pub monthly_amount: Money,
    pub target_amount: Money,
    pub collected_amount: Money,
    /// 0..=100
    pub percent: u32,
    pub months_paid: u32,
}

impl SchemeProgress {
    pub fn for_customer(customer: &Customer) -> Self {
        let monthly = customer
            .scheme_monthly_amount
            .filter(Money::is_positive)
            .unwrap_or_else(|| Money::from_rupees(DEFAULT_SCHEME_MONTHLY_RUPEES));
        let target = customer
            .scheme_target_amount
            .filter(Money::is_positive)
            .unwrap_or_else(|| Money::from_rupees(DEFAULT_SCHEME_TARGET_RUPEES));
        let collected = customer.scheme_collected_amount.unwrap_or_default().non_negative();

        let percent = ((collected * 100).amount() / target.amount())
            .floor()
            .to_u32()
            .unwrap_or(0)
            .min(100);
        let months_paid = (collected.amount() / monthly.amount())
            .floor()
            .to_u32()
            .unwrap_or(0);

        SchemeProgress {
            monthly_amount: monthly,
            target_amount: target,
            collected_amount: collected,
            percent,
            months_paid,
        }
    }

    /// One flag per month of the cycle: paid or not.
    pub fn months(&self) -> impl Iterator<Item = bool> + '_ {
        (0..SCHEME_MONTHS).map(|i| i < self.months_paid)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(id: i64, amount: i64, paid: i64, date: Option<&str>) -> Bill {
        Bill {
            id,
            bill_number: None,
            bill_type: BillType::Gave,
            amount: Money::from_rupees(amount),
            paid_amount: Money::from_rupees(paid),
            due_amount: Money::from_rupees(amount - paid),
            payment_mode: Some("KHATHA".into()),
            items: None,
            status: None,
            bill_date: date.map(str::to_string),
            created_at: None,
            image_url: None,
            loyalty_points_used: None,
            customer: None,
        }
    }

    fn customer(monthly: Option<i64>, target: Option<i64>, collected: Option<i64>) -> Customer {
        Customer {
            id: 1,
            name: "Asha".into(),
            phone: "9876543210".into(),
            email: None,
            loyalty_points: 0,
            due_amount: Money::zero(),
            scheme_monthly_amount: monthly.map(Money::from_rupees),
            scheme_target_amount: target.map(Money::from_rupees),
            scheme_collected_amount: collected.map(Money::from_rupees),
        }
    }

    #[test]
    fn test_gave_entry_defaults() {
        let req = LedgerEntry::Gave {
            amount: Money::from_rupees(250),
            items: None,
        }
        .to_request(None)
        .unwrap();
        assert_eq!(req.bill_type, BillType::Gave);
        assert_eq!(req.paid_amount, Money::zero());
        assert_eq!(req.payment_mode, "KHATHA");
        assert_eq!(req.items, "Manual entry");
    }

    #[test]
    fn test_received_entry_uses_note() {
        let req = LedgerEntry::Received {
            amount: Money::from_rupees(100),
            note: Some("GPay".into()),
        }
        .to_request(None)
        .unwrap();
        assert_eq!(req.paid_amount, Money::from_rupees(100));
        assert_eq!(req.payment_mode, "GPay");
        assert_eq!(req.items, "GPay");

        let req = LedgerEntry::Received {
            amount: Money::from_rupees(100),
            note: Some("  ".into()),
        }
        .to_request(None)
        .unwrap();
        assert_eq!(req.payment_mode, "PAYMENT");
        assert_eq!(req.items, "Payment received");
    }

    #[test]
    fn test_scheme_entry() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1);
        let req = LedgerEntry::Scheme {
            amount: Money::from_rupees(500),
            note: None,
        }
        .to_request(date)
        .unwrap();
        assert_eq!(req.payment_mode, "SCHEME_DEPOSIT");
        assert_eq!(req.items, "Monthly Savings Deposit");

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "SCHEME");
        assert_eq!(json["billDate"], "2024-05-01");
    }

    #[test]
    fn test_entry_amount_required() {
        let err = LedgerEntry::Gave {
            amount: Money::zero(),
            items: None,
        }
        .to_request(None);
        assert!(err.is_err());
    }

    #[test]
    fn test_bill_update_due() {
        let update = BillUpdate::new(
            Money::from_rupees(100),
            Money::from_rupees(30),
            BillStatus::Partial,
            PaymentMode::Khatha,
            4,
        );
        assert_eq!(update.due_amount, Money::from_rupees(70));
    }

    #[test]
    fn test_sort_bills() {
        let mut bills = vec![
            bill(1, 50, 0, Some("2024-01-02")),
            bill(2, 90, 0, Some("2024-03-01T09:00:00")),
            bill(3, 10, 0, Some("2024-02-01")),
        ];

        sort_bills(&mut bills, BillSort::Newest);
        assert_eq!(bills.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        sort_bills(&mut bills, BillSort::Oldest);
        assert_eq!(bills.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        sort_bills(&mut bills, BillSort::AmountHighToLow);
        assert_eq!(bills.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[test]
    fn test_statement_totals() {
        let bills = vec![bill(1, 100, 40, None), bill(2, 50, 50, None)];
        let s = Statement::from_bills(&bills);
        assert_eq!(s.total_billed, Money::from_rupees(150));
        assert_eq!(s.total_paid, Money::from_rupees(90));
        assert_eq!(s.total_due, Money::from_rupees(60));
        assert_eq!(s.entries, 2);
    }

    #[test]
    fn test_scheme_progress_defaults() {
        let p = SchemeProgress::for_customer(&customer(None, None, Some(1750)));
        assert_eq!(p.monthly_amount, Money::from_rupees(500));
        assert_eq!(p.target_amount, Money::from_rupees(6000));
        assert_eq!(p.months_paid, 3);
        assert_eq!(p.percent, 29);
        assert_eq!(p.months().filter(|paid| *paid).count(), 3);
        assert_eq!(p.months().count(), 12);
    }

    #[test]
    fn test_scheme_progress_capped() {
        let p = SchemeProgress::for_customer(&customer(Some(1000), Some(2000), Some(5000)));
        assert_eq!(p.percent, 100);
        assert_eq!(p.months_paid, 5);
    }
}
