//! # Bill Commands
//!
//! Every bill of the shop, counter sales and khatha entries alike.
//!
//! ```text
//! khatha bills list [--search ramesh] [--export bills.csv]
//!
//!   GET /bills ──► newest first ──► search ──► table
//!                                       │
//!                                       └──► --export: same rows as CSV
//!                                            Date, Bill No, Customer, Items,
//!                                            Amount, Paid, Due, Mode, Status
//!
//! khatha bills show 88     receipt, items priced from the catalogue
//! khatha bills edit 88     correct amount / paid / status / mode
//! ```
//!
//! Only bills with a customer can be edited, and online orders (`ORD-`
//! numbers) only when they went on khatha.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use khatha_core::bill_items::BillItems;
use khatha_core::ledger::BillUpdate;
use khatha_core::{Bill, Money, PaymentMode, Product};

use crate::cli::BillsCommand;
use crate::commands::customers::catalog_for_summaries;
use crate::commands::{retailer_api, Reply};
use crate::error::{CommandError, CommandResult, ErrorCode};
use crate::state::AppState;
use crate::view;

/// Bill numbers the backend gives marketplace orders.
const ONLINE_ORDER_PREFIX: &str = "ORD-";

const WALK_IN: &str = "Walk-in";

pub async fn run(state: &AppState, cmd: BillsCommand) -> CommandResult<Reply> {
    let (api, retailer_id) = retailer_api(state).await?;

    match cmd {
        BillsCommand::List { search, export } => {
            let mut bills = api.bills().list().await?;
            newest_first(&mut bills);
            if let Some(term) = search.as_deref() {
                bills.retain(|b| matches_search(b, term));
            }
            let catalog = catalog_for_summaries(&api).await;

            let mut text = render_list(&bills, &catalog);
            if let Some(path) = export {
                write_export(&path, &bills, &catalog)?;
                info!(count = bills.len(), path = %path.display(), "Bills exported");
                text.push_str(&format!("\n\n{} bill(s) exported to {}", bills.len(), path.display()));
            }
            Reply::new(text, &bills)
        }
        BillsCommand::Show { id } => {
            let bill = find_bill(api.bills().list().await?, id)?;
            let catalog = catalog_for_summaries(&api).await;
            Reply::new(render_receipt(&bill, &catalog), &bill)
        }
        BillsCommand::Edit {
            id,
            amount,
            paid,
            status,
            mode,
        } => {
            let bill = find_bill(api.bills().list().await?, id)?;
            if !is_editable(&bill) {
                return Err(CommandError::new(
                    ErrorCode::InvalidState,
                    format!("Bill {} cannot be edited: walk-in bills and paid online orders are final", id),
                ));
            }

            let current = BillUpdate::from_bill(&bill, retailer_id);
            let update = BillUpdate::new(
                amount.unwrap_or(current.amount),
                paid.unwrap_or(current.paid_amount),
                status.unwrap_or(current.status),
                mode.unwrap_or(current.payment_mode),
                retailer_id,
            );
            api.bills().update(id, &update).await?;
            Reply::new(
                format!(
                    "Bill {} updated: {} paid of {}, due {}",
                    id, update.paid_amount, update.amount, update.due_amount
                ),
                &update,
            )
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Bills without a readable date go last.
fn newest_first(bills: &mut [Bill]) {
    bills.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

/// Case-insensitive match on bill number, customer name or status.
fn matches_search(bill: &Bill, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let status = bill.status.map(|s| s.to_string());
    let matched = [bill.bill_number.as_deref(), bill.customer_name(), status.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term));
    matched
}

fn find_bill(bills: Vec<Bill>, id: i64) -> CommandResult<Bill> {
    bills
        .into_iter()
        .find(|b| b.id == id)
        .ok_or_else(|| CommandError::not_found("Bill", id))
}

fn is_editable(bill: &Bill) -> bool {
    let online = bill
        .bill_number
        .as_deref()
        .is_some_and(|n| n.starts_with(ONLINE_ORDER_PREFIX));
    bill.customer.is_some() && (!online || bill.counter_payment_mode() == Some(PaymentMode::Khatha))
}

fn bill_date(bill: &Bill) -> String {
    match bill.timestamp() {
        Some(t) => t.format("%Y-%m-%d").to_string(),
        None => bill
            .bill_date
            .as_deref()
            .or(bill.created_at.as_deref())
            .map(|d| d.chars().take(10).collect())
            .unwrap_or_default(),
    }
}

fn status_label(bill: &Bill) -> String {
    bill.status.map(|s| s.to_string()).unwrap_or_default()
}

// =============================================================================
// CSV Export
// =============================================================================

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Bill No")]
    bill_number: &'a str,
    #[serde(rename = "Customer")]
    customer: &'a str,
    #[serde(rename = "Items")]
    items: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Paid")]
    paid: String,
    #[serde(rename = "Due")]
    due: String,
    #[serde(rename = "Mode")]
    mode: &'a str,
    #[serde(rename = "Status")]
    status: String,
}

impl<'a> ExportRow<'a> {
    fn new(bill: &'a Bill, catalog: &[Product]) -> Self {
        ExportRow {
            date: bill_date(bill),
            bill_number: bill.bill_number.as_deref().unwrap_or_default(),
            customer: bill.customer_name().unwrap_or(WALK_IN),
            items: BillItems::decode(bill.items.as_deref()).summary(catalog),
            amount: plain(bill.amount),
            paid: plain(bill.paid_amount),
            due: plain(bill.due_amount),
            mode: bill.payment_mode.as_deref().unwrap_or_default(),
            status: status_label(bill),
        }
    }
}

/// Spreadsheets want `450.00`, not `₹450.00`.
fn plain(money: Money) -> String {
    format!("{:.2}", money.amount())
}

fn export_csv<W: std::io::Write>(out: W, bills: &[Bill], catalog: &[Product]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for bill in bills {
        writer.serialize(ExportRow::new(bill, catalog))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_export(path: &Path, bills: &[Bill], catalog: &[Product]) -> CommandResult<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| CommandError::validation(format!("Cannot write {}: {}", path.display(), e)))?;
    export_csv(file, bills, catalog)?;
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn render_list(bills: &[Bill], catalog: &[Product]) -> String {
    let rows: Vec<Vec<String>> = bills
        .iter()
        .map(|b| {
            let mut number = view::opt(&b.bill_number);
            if number.starts_with(ONLINE_ORDER_PREFIX) {
                number.push_str(" (online)");
            }
            vec![
                b.id.to_string(),
                bill_date(b),
                number,
                b.customer_name().unwrap_or(WALK_IN).to_string(),
                truncate(&BillItems::decode(b.items.as_deref()).summary(catalog), 30),
                b.amount.to_string(),
                view::opt(&b.payment_mode),
                status_label(b),
            ]
        })
        .collect();
    view::table_or_empty(
        &["Id", "Date", "Bill No", "Customer", "Items", "Amount", "Mode", "Status"],
        &rows,
        "No bills found",
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn render_receipt(bill: &Bill, catalog: &[Product]) -> String {
    let rows = BillItems::decode(bill.items.as_deref()).receipt_rows(catalog, bill.amount);
    let mut out = vec![
        format!(
            "Bill {}  {}  {}",
            view::opt(&bill.bill_number),
            bill_date(bill),
            bill.customer_name().unwrap_or(WALK_IN)
        ),
        String::new(),
        view::receipt(&rows, bill.amount),
    ];
    if bill.due_amount.is_positive() {
        out.push(format!("Paid {}  Due {}", bill.paid_amount, bill.due_amount));
    }
    if let Some(mode) = &bill.payment_mode {
        out.push(format!("Paid by {}", mode));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use khatha_core::{BillCustomer, BillStatus, BillType, ProductType};

    fn bill(id: i64, number: &str, customer: Option<&str>, date: &str) -> Bill {
        Bill {
            id,
            bill_number: Some(number.to_string()),
            bill_type: BillType::Gave,
            amount: Money::from_rupees(500),
            paid_amount: Money::from_rupees(50),
            due_amount: Money::from_rupees(450),
            payment_mode: Some("KHATHA".into()),
            items: Some("R1 x2, Rent, March".into()),
            status: Some(BillStatus::Partial),
            bill_date: Some(date.to_string()),
            created_at: None,
            image_url: None,
            loyalty_points_used: None,
            customer: customer.map(|name| BillCustomer {
                id: Some(12),
                name: Some(name.to_string()),
            }),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![Product {
            id: 1,
            name: "Rice".into(),
            barcode: "R1".into(),
            price: Money::from_rupees(250),
            quantity: 10,
            product_type: ProductType::Unit,
            category: None,
            image_url: None,
            retailer_id: None,
        }]
    }

    #[test]
    fn test_newest_first_and_search() {
        let mut bills = vec![
            bill(1, "INV-1", Some("Ramesh"), "2024-05-01T10:00:00"),
            bill(2, "INV-2", None, "2024-06-01T10:00:00"),
            bill(3, "ORD-3", Some("Meena"), "2024-05-15T10:00:00"),
        ];
        newest_first(&mut bills);
        assert_eq!(bills.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        assert!(matches_search(&bills[2], "rAmEsH"));
        assert!(matches_search(&bills[1], "ord-"));
        assert!(matches_search(&bills[0], "partial"));
        assert!(!matches_search(&bills[0], "ramesh"));
        assert!(matches_search(&bills[0], "  "));
    }

    #[test]
    fn test_csv_export_columns_and_quoting() {
        let bills = vec![bill(1, "INV-1", Some("Ramesh"), "2024-05-01T10:00:00"), bill(2, "INV-2", None, "2024-06-01")];
        let mut out = Vec::new();
        export_csv(&mut out, &bills, &catalog()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Bill No,Customer,Items,Amount,Paid,Due,Mode,Status");
        assert_eq!(
            lines[1],
            "2024-05-01,INV-1,Ramesh,\"Rice x2, Rent x1, March x1\",500.00,50.00,450.00,KHATHA,PARTIAL"
        );
        assert!(lines[2].starts_with("2024-06-01,INV-2,Walk-in,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_walk_in_and_paid_online_bills_are_final() {
        assert!(is_editable(&bill(1, "INV-1", Some("Ramesh"), "2024-05-01")));
        assert!(!is_editable(&bill(2, "INV-2", None, "2024-05-01")));
        assert!(is_editable(&bill(3, "ORD-3", Some("Meena"), "2024-05-01")));

        let mut paid_online = bill(4, "ORD-4", Some("Meena"), "2024-05-01");
        paid_online.payment_mode = Some("UPI".into());
        assert!(!is_editable(&paid_online));
    }

    #[test]
    fn test_receipt_prices_legacy_items() {
        let text = render_receipt(&bill(1, "INV-1", Some("Ramesh"), "2024-05-01T10:00:00"), &catalog());
        assert!(text.starts_with("Bill INV-1  2024-05-01  Ramesh"));
        assert!(text.contains("Rice"));
        assert!(text.contains("Paid ₹50.00  Due ₹450.00"));
    }
}
