//! # Customer Commands
//!
//! Customer records and their khatha (credit ledger).
//!
//! ## Customer Page
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  khatha customers show 12 --sort amount                                │
//! │                                                                         │
//! │  Ramesh (9876543210)  points 120  due ₹450.00                          │
//! │  ─────────────────────────────────────────────────────────────         │
//! │  Id   Date        Type      Amount    Paid     Due     Items           │
//! │  88   2024-05-01  GAVE      ₹500.00   ₹50.00   ₹450.00 Rice x2         │
//! │  ─────────────────────────────────────────────────────────────         │
//! │  Billed ₹500.00  Paid ₹50.00  Due ₹450.00                             │
//! │  Scheme ₹1500.00 of ₹6000.00 (25%)  ■■■□□□□□□□□□                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{info, warn};

use khatha_client::workflow::{BillImage, CustomerLedger, LedgerWorkflow};
use khatha_client::KhathaApi;
use khatha_core::bill_items::BillItems;
use khatha_core::ledger::{BillUpdate, LedgerEntry, SchemeProgress, Statement};
use khatha_core::{Bill, Customer, NewCustomer, Payment, Product};

use crate::cli::{CustomersCommand, EntryArgs, EntryKind};
use crate::commands::{confirm_or_cancel, retailer_api, Reply};
use crate::error::{CommandError, CommandResult};
use crate::prompt::Prompt;
use crate::state::AppState;
use crate::view;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LedgerView<'a> {
    customer: &'a Customer,
    bills: &'a [Bill],
    statement: Statement,
    scheme: SchemeProgress,
}

pub async fn run(state: &AppState, cmd: CustomersCommand, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    let (api, retailer_id) = retailer_api(state).await?;

    match cmd {
        CustomersCommand::List { search } => {
            let mut customers = api.customers().list().await?;
            if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                let term = term.to_lowercase();
                customers.retain(|c| c.name.to_lowercase().contains(&term) || c.phone.contains(&term));
            }
            Reply::new(render_list(&customers), &customers)
        }
        CustomersCommand::Add { name, phone, email } => {
            let customer = api
                .customers()
                .create(&NewCustomer {
                    name: name.trim().to_string(),
                    phone: phone.trim().to_string(),
                    email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
                })
                .await?;
            Reply::new(format!("Customer {} added (id {})", customer.name, customer.id), &customer)
        }
        CustomersCommand::Show { id, sort } => {
            let ledger = LedgerWorkflow::new(&api).load(id, sort).await?;
            let catalog = catalog_for_summaries(&api).await;
            let data = LedgerView {
                customer: &ledger.customer,
                bills: &ledger.bills,
                statement: ledger.statement,
                scheme: ledger.scheme,
            };
            Reply::new(render_ledger(&ledger, &catalog), &data)
        }
        CustomersCommand::Delete { id, yes } => {
            confirm_or_cancel(prompt, yes, &format!("Delete customer {} and their khatha?", id))?;
            api.customers().delete(id).await?;
            Ok(Reply::message(format!("Customer {} deleted", id)))
        }
        CustomersCommand::Email { id, email } => {
            api.customers().update_email(id, email.trim()).await?;
            Ok(Reply::message(format!("Email updated for customer {}", id)))
        }
        CustomersCommand::Entry(args) => add_entry(&api, args).await,
        CustomersCommand::Scheme { id, monthly, target } => {
            let progress = LedgerWorkflow::new(&api).set_scheme(id, monthly, target).await?;
            Reply::new(render_scheme(&progress), &progress)
        }
        CustomersCommand::EditBill {
            bill,
            amount,
            paid,
            status,
            mode,
        } => {
            let update = BillUpdate::new(amount, paid, status, mode, retailer_id);
            LedgerWorkflow::new(&api).edit_bill(bill, &update).await?;
            Reply::new(
                format!("Bill {} updated: {} paid of {}, due {}", bill, paid, amount, update.due_amount),
                &update,
            )
        }
        CustomersCommand::Notify { id } => {
            let message = api.notifications().notify_customer(id).await?;
            Ok(Reply::message(if message.trim().is_empty() {
                format!("Customer {} notified", id)
            } else {
                message
            }))
        }
        CustomersCommand::Pay { id, amount, mode, note } => {
            let payment = api
                .payments()
                .record(
                    id,
                    &Payment {
                        id: None,
                        amount,
                        mode,
                        note,
                    },
                )
                .await?;
            Reply::new(format!("Payment of {} recorded for customer {}", payment.amount, id), &payment)
        }
        CustomersCommand::Payments => {
            let payments = api.payments().list().await?;
            let rows: Vec<Vec<String>> = payments
                .iter()
                .map(|p| {
                    vec![
                        p.id.map(|id| id.to_string()).unwrap_or_default(),
                        p.amount.to_string(),
                        view::opt(&p.mode),
                        view::opt(&p.note),
                    ]
                })
                .collect();
            Reply::new(
                view::table_or_empty(&["Id", "Amount", "Mode", "Note"], &rows, "No payments recorded"),
                &payments,
            )
        }
    }
}

async fn add_entry(api: &KhathaApi, args: EntryArgs) -> CommandResult<Reply> {
    let entry = match args.kind {
        EntryKind::Gave => LedgerEntry::Gave {
            amount: args.amount,
            items: args.note,
        },
        EntryKind::Received => LedgerEntry::Received {
            amount: args.amount,
            note: args.note,
        },
        EntryKind::Scheme => LedgerEntry::Scheme {
            amount: args.amount,
            note: args.note,
        },
    };

    let image = match args.image {
        Some(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| CommandError::validation(format!("Cannot read {}: {}", path.display(), e)))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bill.jpg".to_string());
            Some(BillImage::new(file_name, bytes))
        }
        None => None,
    };

    let saved = LedgerWorkflow::new(api)
        .add_entry(args.customer, &entry, args.date, image)
        .await?;
    info!(customer_id = args.customer, bill_id = saved.bill.id, "Ledger entry added");

    let mut text = format!(
        "{} entry of {} saved for customer {} (bill {})",
        bill_kind(&saved.bill),
        entry.amount(),
        args.customer,
        saved.bill.id
    );
    if let Some(err) = &saved.image_error {
        text.push_str(&format!("\nPhoto not uploaded: {}", err));
    }
    Reply::new(
        text,
        &serde_json::json!({ "bill": saved.bill, "imageError": saved.image_error }),
    )
}

/// Catalogue for naming legacy barcode items; bills still list without it.
pub(crate) async fn catalog_for_summaries(api: &KhathaApi) -> Vec<Product> {
    match api.products().list().await {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "Catalogue not loaded; items shown by barcode");
            Vec::new()
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn bill_kind(bill: &Bill) -> String {
    format!("{:?}", bill.bill_type).to_uppercase()
}

fn render_list(customers: &[Customer]) -> String {
    let rows: Vec<Vec<String>> = customers
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.phone.clone(),
                c.loyalty_points.to_string(),
                c.due_amount.to_string(),
            ]
        })
        .collect();
    view::table_or_empty(&["Id", "Name", "Phone", "Points", "Due"], &rows, "No customers yet")
}

fn render_scheme(progress: &SchemeProgress) -> String {
    let months: String = progress.months().map(|paid| if paid { '■' } else { '□' }).collect();
    format!(
        "Scheme {} of {} ({}%)  {}  {} month(s) paid at {}",
        progress.collected_amount,
        progress.target_amount,
        progress.percent,
        months,
        progress.months_paid,
        progress.monthly_amount
    )
}

fn render_ledger(ledger: &CustomerLedger, catalog: &[Product]) -> String {
    let c = &ledger.customer;
    let header = format!(
        "{} ({})  points {}  due {}",
        c.name, c.phone, c.loyalty_points, c.due_amount
    );

    let rows: Vec<Vec<String>> = ledger
        .bills
        .iter()
        .map(|b| {
            let date = b
                .bill_date
                .as_deref()
                .or(b.created_at.as_deref())
                .map(|d| d.chars().take(10).collect())
                .unwrap_or_default();
            vec![
                b.id.to_string(),
                date,
                bill_kind(b),
                b.amount.to_string(),
                b.paid_amount.to_string(),
                b.due_amount.to_string(),
                BillItems::decode(b.items.as_deref()).summary(catalog),
            ]
        })
        .collect();

    let s = &ledger.statement;
    format!(
        "{}\n\n{}\n\nBilled {}  Paid {}  Due {}  Redeemed {}\n{}",
        header,
        view::table_or_empty(
            &["Id", "Date", "Type", "Amount", "Paid", "Due", "Items"],
            &rows,
            "No bills yet"
        ),
        s.total_billed,
        s.total_paid,
        s.total_due,
        s.redeemed_points,
        render_scheme(&ledger.scheme)
    )
}
