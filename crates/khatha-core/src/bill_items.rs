//! # Bill Items Codec
//!
//! The `items` field of bills and orders has carried three shapes over time.
//! They are told apart exactly once, in [`BillItems::decode`], and everything
//! downstream works on the tagged value.
//!
//! ## Wire Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items string                              BillItems variant            │
//! │  ─────────────────────────────────────     ──────────────────────────   │
//! │  [{"name":"Milk","qty":2,"price":30}]  ──► Json(lines)    orders, new   │
//! │  "8901 x2, 8902 x1"                    ──► LegacyCsv      counter bills │
//! │  "Monthly Savings Deposit"             ──► Manual(text)   ledger entries│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Receipt Rendering
//! Legacy entries only carry a barcode, so name and price come from the
//! catalogue. A lone row with no price (a manual entry) takes its price from
//! the bill amount.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::Money;
use crate::types::Product;

/// Separator between a barcode and its quantity in legacy item strings.
const LEGACY_QTY_MARKER: &str = " x";

const LEGACY_ITEM_SEPARATOR: char = ',';

// =============================================================================
// Item Line (JSON shape)
// =============================================================================

/// One line of a JSON item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub name: String,
    pub qty: u32,
    pub price: Money,
    /// price × qty
    #[serde(rename = "total")]
    pub line_total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemLine {
    /// Builds an order line from a cart line.
    pub fn from_cart_line(line: &CartLine) -> Self {
        ItemLine {
            barcode: Some(line.barcode.clone()).filter(|b| !b.is_empty()),
            name: line.name.clone(),
            qty: line.quantity,
            price: line.unit_price,
            line_total: line.line_total(),
            image_url: line.image_url.clone(),
        }
    }

    /// Lenient read of one element: missing name falls back to barcode then
    /// "Item", missing or zero qty to 1, missing price to 0.
    fn from_value(value: &Value) -> ItemLine {
        let barcode = value
            .get("barcode")
            .and_then(value_as_string)
            .filter(|b| !b.is_empty());
        let name = value
            .get("name")
            .and_then(value_as_string)
            .filter(|n| !n.is_empty())
            .or_else(|| barcode.clone())
            .unwrap_or_else(|| "Item".to_string());
        let qty = value
            .get("qty")
            .and_then(value_as_u32)
            .filter(|q| *q > 0)
            .unwrap_or(1);
        let price = value.get("price").and_then(value_as_money).unwrap_or_default();
        let line_total = value
            .get("total")
            .and_then(value_as_money)
            .unwrap_or(price * qty);

        ItemLine {
            barcode,
            name,
            qty,
            price,
            line_total,
            image_url: value.get("imageUrl").and_then(value_as_string),
        }
    }
}

fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|q| u32::try_from(q).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_money(v: &Value) -> Option<Money> {
    match v {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Legacy Entry
// =============================================================================

/// One `barcode xQty` entry of a legacy item string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEntry {
    pub barcode: String,
    pub qty: u32,
}

impl LegacyEntry {
    /// Parses `"8901 x2"`. A missing or unreadable quantity means 1.
    fn parse(entry: &str) -> LegacyEntry {
        match entry.split_once(LEGACY_QTY_MARKER) {
            Some((barcode, qty)) => LegacyEntry {
                barcode: barcode.trim().to_string(),
                qty: qty.trim().parse().unwrap_or(1),
            },
            None => LegacyEntry {
                barcode: entry.trim().to_string(),
                qty: 1,
            },
        }
    }
}

// =============================================================================
// BillItems
// =============================================================================

/// Decoded `items` value.
#[derive(Debug, Clone, PartialEq)]
pub enum BillItems {
    Json(Vec<ItemLine>),
    LegacyCsv(Vec<LegacyEntry>),
    /// Free text with no quantity markers; empty when the bill has no items.
    Manual(String),
}

impl BillItems {
    /// Classifies and parses a raw `items` value.
    ///
    /// - a JSON array ⇒ `Json`
    /// - a comma-separated list, or a single entry containing ` x` ⇒ `LegacyCsv`
    /// - single free text ⇒ `Manual`
    pub fn decode(raw: Option<&str>) -> BillItems {
        let raw = raw.unwrap_or("").trim();
        if raw.is_empty() {
            return BillItems::Manual(String::new());
        }

        if raw.starts_with('[') {
            if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(raw) {
                return BillItems::Json(values.iter().map(ItemLine::from_value).collect());
            }
        }

        if raw.contains(LEGACY_ITEM_SEPARATOR) || raw.contains(LEGACY_QTY_MARKER) {
            let entries = raw
                .split(LEGACY_ITEM_SEPARATOR)
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(LegacyEntry::parse)
                .collect();
            return BillItems::LegacyCsv(entries);
        }

        BillItems::Manual(raw.to_string())
    }

    /// Re-encodes to the wire form of the same variant.
    pub fn encode(&self) -> String {
        match self {
            BillItems::Json(lines) => encode_json_items(lines),
            BillItems::LegacyCsv(entries) => entries
                .iter()
                .map(|e| format!("{}{}{}", e.barcode, LEGACY_QTY_MARKER, e.qty))
                .collect::<Vec<_>>()
                .join(", "),
            BillItems::Manual(text) => text.clone(),
        }
    }

    /// Rows for a printed receipt.
    pub fn receipt_rows(&self, catalog: &[Product], bill_amount: Money) -> Vec<ReceiptRow> {
        let by_barcode = index_catalog(catalog);

        let mut rows: Vec<ReceiptRow> = match self {
            BillItems::Json(lines) => lines
                .iter()
                .map(|l| ReceiptRow::new(l.name.clone(), l.qty, l.price))
                .collect(),
            BillItems::LegacyCsv(entries) => entries
                .iter()
                .map(|e| match by_barcode.get(e.barcode.as_str()) {
                    Some(p) => ReceiptRow::new(p.name.clone(), e.qty, p.price),
                    None => ReceiptRow::new(e.barcode.clone(), e.qty, Money::zero()),
                })
                .collect(),
            BillItems::Manual(text) if text.is_empty() => Vec::new(),
            BillItems::Manual(text) => match by_barcode.get(text.as_str()) {
                Some(p) => vec![ReceiptRow::new(p.name.clone(), 1, p.price)],
                None => vec![ReceiptRow::new(text.clone(), 1, Money::zero())],
            },
        };

        if let [only] = rows.as_mut_slice() {
            if only.unit_price.is_zero() && bill_amount.is_positive() {
                if let Some(unit) = bill_amount.divide(only.qty) {
                    only.unit_price = unit;
                    only.amount = unit * only.qty;
                }
            }
        }

        rows
    }

    /// One-line description for ledger lists: `"Amul Milk x2, Bread x1"`.
    pub fn summary(&self, catalog: &[Product]) -> String {
        let by_barcode = index_catalog(catalog);
        match self {
            BillItems::Json(lines) => lines
                .iter()
                .map(|l| format!("{}{}{}", l.name, LEGACY_QTY_MARKER, l.qty))
                .collect::<Vec<_>>()
                .join(", "),
            BillItems::LegacyCsv(entries) => entries
                .iter()
                .map(|e| {
                    let name = by_barcode
                        .get(e.barcode.as_str())
                        .map_or(e.barcode.as_str(), |p| p.name.as_str());
                    format!("{}{}{}", name, LEGACY_QTY_MARKER, e.qty)
                })
                .collect::<Vec<_>>()
                .join(", "),
            BillItems::Manual(text) => by_barcode
                .get(text.as_str())
                .map_or_else(|| text.clone(), |p| p.name.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BillItems::Json(lines) => lines.is_empty(),
            BillItems::LegacyCsv(entries) => entries.is_empty(),
            BillItems::Manual(text) => text.is_empty(),
        }
    }
}

fn index_catalog(catalog: &[Product]) -> HashMap<&str, &Product> {
    catalog
        .iter()
        .filter(|p| !p.barcode.is_empty())
        .map(|p| (p.barcode.as_str(), p))
        .collect()
}

// =============================================================================
// Encoders
// =============================================================================

/// `"8901 x2, 8902 x1"` for counter bills.
pub fn encode_legacy_items(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}{}{}", l.barcode, LEGACY_QTY_MARKER, l.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON array string for orders.
pub fn encode_json_items(lines: &[ItemLine]) -> String {
    // Serializing plain structs of strings and numbers cannot fail.
    serde_json::to_string(lines).unwrap_or_else(|_| "[]".to_string())
}

// =============================================================================
// Receipt Row
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRow {
    pub name: String,
    pub qty: u32,
    pub unit_price: Money,
    pub amount: Money,
}

impl ReceiptRow {
    fn new(name: String, qty: u32, unit_price: Money) -> Self {
        ReceiptRow {
            name,
            qty,
            unit_price,
            amount: unit_price * qty,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
