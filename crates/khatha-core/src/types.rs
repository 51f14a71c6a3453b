//! # Domain Types
//!
//! Core domain types used throughout Khatha Wallet. These mirror the JSON the
//! Khatha backend sends and accepts (camelCase field names, upper-case enums).
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id, number     │   │  id             │       │
//! │  │  barcode        │   │  type, status   │   │  retailer_id    │       │
//! │  │  price, stock   │   │  amount, paid   │   │  items (JSON)   │       │
//! │  └─────────────────┘   │  items (codec)  │   │  status         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │  PaymentMode    │   │  OrderStatus    │       │
//! │  │  loyalty_points │   │  Cash           │   │  Pending        │       │
//! │  │  due_amount     │   │  Upi            │   │  Packed         │       │
//! │  │  scheme_*       │   │  Khatha         │   │  Delivered      │       │
//! │  └─────────────────┘   └─────────────────┘   │  Cancelled      │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every backend entity carries a numeric `id` assigned by the backend.
//! Bills additionally carry a human-readable `bill_number`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. 500 bps = 5% (the billing screen's GST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a rate from a whole percentage.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        GstRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::from_percent(crate::DEFAULT_GST_PERCENT)
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How the retailer collects payment for a counter bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    /// Cash at the counter.
    #[default]
    Cash,
    /// UPI transfer, confirmed by hand.
    Upi,
    /// Credit on the customer's khatha; leaves a due balance.
    Khatha,
}

impl PaymentMode {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Upi => "UPI",
            PaymentMode::Khatha => "KHATHA",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Ok(PaymentMode::Cash),
            "UPI" => Ok(PaymentMode::Upi),
            "KHATHA" | "CREDIT" => Ok(PaymentMode::Khatha),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "payment mode".to_string(),
                allowed: vec!["CASH".into(), "UPI".into(), "KHATHA".into()],
            }),
        }
    }
}

/// How a marketplace customer pays for an online order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPaymentMode {
    /// Cash on delivery.
    #[default]
    Cod,
    Upi,
    /// Added to the customer's khatha with that retailer.
    Khatha,
}

impl std::fmt::Display for OrderPaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OrderPaymentMode::Cod => "COD",
            OrderPaymentMode::Upi => "UPI",
            OrderPaymentMode::Khatha => "KHATHA",
        })
    }
}

impl std::str::FromStr for OrderPaymentMode {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COD" | "CASH" => Ok(OrderPaymentMode::Cod),
            "UPI" => Ok(OrderPaymentMode::Upi),
            "KHATHA" => Ok(OrderPaymentMode::Khatha),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "payment mode".to_string(),
                allowed: vec!["COD".into(), "UPI".into(), "KHATHA".into()],
            }),
        }
    }
}

// =============================================================================
// Bill Type & Status
// =============================================================================

/// Ledger entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillType {
    /// Counter sale paid in full (cash/UPI).
    Sale,
    /// Goods given on credit; increases the customer's due.
    Gave,
    /// Payment received against the due.
    Received,
    /// Monthly savings scheme deposit.
    Scheme,
}

/// Settlement state of a bill, computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Paid,
    Partial,
    Due,
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BillStatus::Paid => "PAID",
            BillStatus::Partial => "PARTIAL",
            BillStatus::Due => "DUE",
        })
    }
}

impl std::str::FromStr for BillStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAID" => Ok(BillStatus::Paid),
            "PARTIAL" => Ok(BillStatus::Partial),
            "DUE" => Ok(BillStatus::Due),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["PAID".into(), "PARTIAL".into(), "DUE".into()],
            }),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an online order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Packed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Returns the wire name (used as a query parameter).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Packed => "PACKED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Delivery is confirmed with the OTP the customer holds.
    pub fn requires_otp(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PACKED" => Ok(OrderStatus::Packed),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" | "CANCELED" => Ok(OrderStatus::Cancelled),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "order status".to_string(),
                allowed: vec![
                    "PENDING".into(),
                    "PACKED".into(),
                    "DELIVERED".into(),
                    "CANCELLED".into(),
                ],
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// How a product is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[default]
    Unit,
    Weight,
    Liquid,
}

impl ProductType {
    /// Unit label shown next to quantities.
    pub fn unit_label(&self) -> &'static str {
        match self {
            ProductType::Unit => "pcs",
            ProductType::Weight => "kg",
            ProductType::Liquid => "L",
        }
    }
}

/// A product in a retailer's catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub barcode: String,
    pub price: Money,
    /// Current stock level.
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Owning retailer, exposed on the public marketplace listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retailer_id: Option<i64>,
}

impl Product {
    /// Stock at or below zero.
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }

    /// Stock low enough to warn the cashier ("ONLY n LEFT").
    pub fn is_low_stock(&self) -> bool {
        self.quantity > 0 && self.quantity <= crate::LOW_STOCK_THRESHOLD
    }

    /// Case-insensitive name match or barcode substring match.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term.to_lowercase()) || self.barcode.contains(term)
    }
}

/// Product fields sent on create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub barcode: String,
    pub price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer on a retailer's khatha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub loyalty_points: u32,
    #[serde(default)]
    pub due_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_monthly_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_target_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_collected_amount: Option<Money>,
}

/// Fields sent when a retailer adds a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Scheme enrolment update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeUpdate {
    pub scheme_monthly_amount: Money,
    pub scheme_target_amount: Money,
}

/// One customer-side account: the same person is a separate customer record
/// at every shop they buy from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccount {
    pub customer_id: i64,
    pub retailer_id: i64,
    #[serde(default)]
    pub retailer_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Bill
// =============================================================================

/// A persisted ledger entry.
///
/// `items` is kept in its wire form here; decode it once with
/// [`crate::bill_items::BillItems::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: i64,
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub amount: Money,
    #[serde(default)]
    pub paid_amount: Money,
    #[serde(default)]
    pub due_amount: Money,
    /// CASH / UPI / KHATHA for counter bills; free text (e.g. "PAYMENT",
    /// "SCHEME_DEPOSIT") for manual ledger entries.
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub items: Option<String>,
    #[serde(default)]
    pub status: Option<BillStatus>,
    #[serde(default)]
    pub bill_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub loyalty_points_used: Option<Money>,
    /// Set by `GET /bills`; walk-in bills have none.
    #[serde(default)]
    pub customer: Option<BillCustomer>,
}

/// The customer embedded in a shop-wide bill listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillCustomer {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Bill {
    /// The counter payment mode, when this bill was rung up at the counter.
    pub fn counter_payment_mode(&self) -> Option<PaymentMode> {
        self.payment_mode.as_deref().and_then(|m| m.parse().ok())
    }

    /// Best-effort timestamp used for sorting (bill date, else creation).
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.bill_date
            .as_deref()
            .and_then(parse_backend_timestamp)
            .or_else(|| self.created_at.as_deref().and_then(parse_backend_timestamp))
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.name.as_deref())
    }
}

// =============================================================================
// Order
// =============================================================================

/// An online order placed by a marketplace customer with one retailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub retailer_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// JSON-encoded list of order lines.
    #[serde(default)]
    pub items: Option<String>,
    pub total_amount: Money,
    #[serde(default)]
    pub payment_mode: Option<OrderPaymentMode>,
    pub status: OrderStatus,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub retailer_name: Option<String>,
}

impl Order {
    /// Sum of quantities in the JSON item list; 0 when missing or unreadable.
    pub fn item_count(&self) -> u32 {
        match crate::bill_items::BillItems::decode(self.items.as_deref()) {
            crate::bill_items::BillItems::Json(lines) => lines.iter().map(|l| l.qty).sum(),
            _ => 0,
        }
    }

    /// Order date parsed for sorting.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.order_date.as_deref().and_then(parse_backend_timestamp)
    }
}

// =============================================================================
// Retailer
// =============================================================================

/// The shop owner's profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailerProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Amount the retailer owes this supplier.
    #[serde(default)]
    pub balance: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// BILL increases what the retailer owes; PAYMENT reduces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierTransactionType {
    Bill,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierTransaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub transaction_type: SupplierTransactionType,
    pub amount: Money,
    #[serde(default, alias = "description")]
    pub note: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
}

// =============================================================================
// Staff & Attendance
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub salary: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl std::str::FromStr for AttendanceStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "PRESENT" => Ok(AttendanceStatus::Present),
            "ABSENT" => Ok(AttendanceStatus::Absent),
            "HALF_DAY" => Ok(AttendanceStatus::HalfDay),
            "LEAVE" => Ok(AttendanceStatus::Leave),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "attendance status".to_string(),
                allowed: vec![
                    "PRESENT".into(),
                    "ABSENT".into(),
                    "HALF_DAY".into(),
                    "LEAVE".into(),
                ],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(default)]
    pub id: Option<i64>,
    pub staff_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

// =============================================================================
// Payments
// =============================================================================

/// A payment recorded against a customer's due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub id: Option<i64>,
    pub amount: Money,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Parses the date shapes the backend emits: `2024-05-01T10:20:30[.fff][Z]`
/// or a bare `2024-05-01` (taken as midnight).
pub fn parse_backend_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// =============================================================================
// Unit Tests
// =============================================================================
