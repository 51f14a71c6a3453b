//! # Ledger Workflow
//!
//! The customer page: statement, manual entries with an optional bill
//! photo, bill edits, and the savings scheme.

use chrono::NaiveDate;
use tracing::{info, warn};

use khatha_core::ledger::{sort_bills, BillSort, BillUpdate, LedgerEntry, SchemeProgress, Statement};
use khatha_core::{Bill, Customer, Money, SchemeUpdate};

use crate::api::KhathaApi;
use crate::error::ClientResult;

/// A photo attached to a manual entry.
#[derive(Debug, Clone)]
pub struct BillImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl BillImage {
    /// Guesses the MIME type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let ext = file_name
            .rsplit('.')
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "pdf" => "application/pdf",
            _ => "image/jpeg",
        };
        BillImage {
            file_name,
            bytes,
            mime: mime.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedEntry {
    pub bill: Bill,
    /// Set when the entry saved but its photo did not.
    pub image_error: Option<String>,
}

/// Everything the customer page shows.
#[derive(Debug, Clone)]
pub struct CustomerLedger {
    pub customer: Customer,
    pub bills: Vec<Bill>,
    pub statement: Statement,
    pub scheme: SchemeProgress,
}

pub struct LedgerWorkflow<'a> {
    api: &'a KhathaApi,
}

impl<'a> LedgerWorkflow<'a> {
    pub fn new(api: &'a KhathaApi) -> Self {
        LedgerWorkflow { api }
    }

    pub async fn load(&self, customer_id: i64, sort: BillSort) -> ClientResult<CustomerLedger> {
        let customer = self.api.customers().get(customer_id).await?;
        let mut bills = self.api.bills().for_customer(customer_id).await?;
        sort_bills(&mut bills, sort);

        Ok(CustomerLedger {
            statement: Statement::from_bills(&bills),
            scheme: SchemeProgress::for_customer(&customer),
            customer,
            bills,
        })
    }

    /// Saves a manual entry, then uploads its photo if one was given.
    ///
    /// A failed upload does not undo the entry; it is reported on
    /// [`SavedEntry::image_error`].
    pub async fn add_entry(
        &self,
        customer_id: i64,
        entry: &LedgerEntry,
        date: Option<NaiveDate>,
        image: Option<BillImage>,
    ) -> ClientResult<SavedEntry> {
        let request = entry.to_request(date)?;
        let bill = self.api.bills().create_entry(customer_id, &request).await?;
        info!(
            customer_id,
            bill_id = bill.id,
            kind = ?request.bill_type,
            amount = %request.amount,
            "Ledger entry saved"
        );

        let image_error = match image {
            None => None,
            Some(img) => match self
                .api
                .bills()
                .upload_image(bill.id, &img.file_name, img.bytes, &img.mime)
                .await
            {
                Ok(()) => None,
                Err(e) => {
                    warn!(bill_id = bill.id, error = %e, "Bill image upload failed");
                    Some(e.to_string())
                }
            },
        };

        Ok(SavedEntry { bill, image_error })
    }

    pub async fn edit_bill(&self, bill_id: i64, update: &BillUpdate) -> ClientResult<()> {
        self.api.bills().update(bill_id, update).await
    }

    /// Enrols the customer in (or changes) the monthly savings scheme.
    pub async fn set_scheme(&self, customer_id: i64, monthly: Money, target: Money) -> ClientResult<SchemeProgress> {
        khatha_core::validation::validate_entry_amount(monthly)?;
        khatha_core::validation::validate_entry_amount(target)?;

        let customer = self
            .api
            .customers()
            .update_scheme(
                customer_id,
                &SchemeUpdate {
                    scheme_monthly_amount: monthly,
                    scheme_target_amount: target,
                },
            )
            .await?;
        Ok(SchemeProgress::for_customer(&customer))
    }
}
