//! # Bills API
//!
//! Counter bills, manual ledger entries, edits and bill photos. Every call
//! is retailer-scoped and carries `X-Retailer-Id`.

use serde::Serialize;
use tracing::info;

use khatha_core::ledger::{BillUpdate, LedgerEntryRequest};
use khatha_core::pricing::BillRequest;
use khatha_core::Bill;

use crate::error::ClientResult;
use crate::http::HttpClient;

pub struct BillsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> BillsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        BillsApi { http }
    }

    /// `GET /bills`: every bill of the shop.
    pub async fn list(&self) -> ClientResult<Vec<Bill>> {
        self.http.require_retailer()?;
        self.http.get("/bills", &[]).await
    }

    /// `GET /bills/{customerId}`.
    pub async fn for_customer(&self, customer_id: i64) -> ClientResult<Vec<Bill>> {
        self.http.require_retailer()?;
        self.http.get(&format!("/bills/{}", customer_id), &[]).await
    }

    /// `POST /bills/{customerId}`: credit bill for a known customer.
    pub async fn create_for_customer(&self, customer_id: i64, request: &BillRequest) -> ClientResult<Bill> {
        self.create(&format!("/bills/{}", customer_id), request).await
    }

    /// `POST /bills/paid`: walk-in bill, no customer.
    pub async fn create_paid(&self, request: &BillRequest) -> ClientResult<Bill> {
        self.create("/bills/paid", request).await
    }

    /// `POST /bills/{customerId}` with a hand-written ledger entry.
    pub async fn create_entry(&self, customer_id: i64, entry: &LedgerEntryRequest) -> ClientResult<Bill> {
        self.create(&format!("/bills/{}", customer_id), entry).await
    }

    async fn create<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<Bill> {
        self.http.require_retailer()?;
        let bill: Bill = self.http.post(path, &[], body).await?;
        info!(bill_id = bill.id, path, "Bill created");
        Ok(bill)
    }

    /// `PUT /bills/{id}`.
    pub async fn update(&self, bill_id: i64, update: &BillUpdate) -> ClientResult<()> {
        self.http.require_retailer()?;
        let builder = self
            .http
            .request(reqwest::Method::PUT, &format!("/bills/{}", bill_id))?
            .json(update);
        self.http.send_text(builder).await?;
        info!(bill_id, status = %update.status, "Bill updated");
        Ok(())
    }

    /// `POST /bills/{id}/image`, multipart field `file`.
    pub async fn upload_image(&self, bill_id: i64, file_name: &str, bytes: Vec<u8>, mime: &str) -> ClientResult<()> {
        self.http.require_retailer()?;
        self.http
            .upload(&format!("/bills/{}/image", bill_id), file_name, bytes, mime)
            .await?;
        info!(bill_id, file_name, "Bill image uploaded");
        Ok(())
    }
}
