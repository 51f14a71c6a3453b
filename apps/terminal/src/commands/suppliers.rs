//! # Supplier Commands
//!
//! Who the shop buys from and how much it owes them. A BILL raises the
//! balance, a PAYMENT lowers it.

use khatha_client::api::suppliers::SupplierTransactionRequest;
use khatha_core::{Supplier, SupplierDraft, SupplierTransaction, SupplierTransactionType};

use crate::cli::SuppliersCommand;
use crate::commands::{confirm_or_cancel, retailer_api, Reply};
use crate::error::CommandResult;
use crate::prompt::Prompt;
use crate::state::AppState;
use crate::view;

pub async fn run(state: &AppState, cmd: SuppliersCommand, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    let (api, _) = retailer_api(state).await?;

    match cmd {
        SuppliersCommand::List => {
            let suppliers = api.suppliers().list().await?;
            Reply::new(render_list(&suppliers), &suppliers)
        }
        SuppliersCommand::Add { name, phone } => {
            let supplier = api.suppliers().create(&draft(name, phone)).await?;
            Reply::new(format!("Supplier {} added (id {})", supplier.name, supplier.id), &supplier)
        }
        SuppliersCommand::Update { id, name, phone } => {
            let supplier = api.suppliers().update(id, &draft(name, phone)).await?;
            Reply::new(format!("Supplier {} updated", supplier.id), &supplier)
        }
        SuppliersCommand::Delete { id, yes } => {
            confirm_or_cancel(prompt, yes, &format!("Delete supplier {}?", id))?;
            api.suppliers().delete(id).await?;
            Ok(Reply::message(format!("Supplier {} deleted", id)))
        }
        SuppliersCommand::Txns { id } => {
            let txns = api.suppliers().transactions(id).await?;
            Reply::new(render_transactions(&txns), &txns)
        }
        SuppliersCommand::Transact { id, kind, amount, note } => {
            let request = SupplierTransactionRequest {
                transaction_type: kind.into(),
                amount,
                description: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            };
            api.suppliers().transact(id, &request).await?;
            Reply::new(
                format!("{} of {} recorded for supplier {}", kind_label(request.transaction_type), amount, id),
                &request,
            )
        }
    }
}

fn draft(name: String, phone: Option<String>) -> SupplierDraft {
    SupplierDraft {
        name: name.trim().to_string(),
        phone: phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    }
}

fn kind_label(kind: SupplierTransactionType) -> &'static str {
    match kind {
        SupplierTransactionType::Bill => "BILL",
        SupplierTransactionType::Payment => "PAYMENT",
    }
}

fn render_list(suppliers: &[Supplier]) -> String {
    let rows: Vec<Vec<String>> = suppliers
        .iter()
        .map(|s| vec![s.id.to_string(), s.name.clone(), view::opt(&s.phone), s.balance.to_string()])
        .collect();
    view::table_or_empty(&["Id", "Name", "Phone", "Balance"], &rows, "No suppliers yet")
}

fn render_transactions(txns: &[SupplierTransaction]) -> String {
    let rows: Vec<Vec<String>> = txns
        .iter()
        .map(|t| {
            vec![
                t.transaction_date
                    .as_deref()
                    .map(|d| d.chars().take(10).collect())
                    .unwrap_or_default(),
                kind_label(t.transaction_type).to_string(),
                t.amount.to_string(),
                view::opt(&t.note),
            ]
        })
        .collect();
    view::table_or_empty(&["Date", "Type", "Amount", "Note"], &rows, "No transactions yet")
}
