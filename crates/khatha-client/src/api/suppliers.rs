//! # Suppliers API
//!
//! What the shop owes its wholesalers. A BILL transaction raises the
//! balance, a PAYMENT lowers it; the backend keeps the running balance.

use serde::Serialize;
use tracing::info;

use khatha_core::validation::{validate_entry_amount, validate_name};
use khatha_core::{Money, Supplier, SupplierDraft, SupplierTransaction, SupplierTransactionType};

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Body of `POST /suppliers/{id}/transact`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierTransactionRequest {
    #[serde(rename = "type")]
    pub transaction_type: SupplierTransactionType,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct SuppliersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> SuppliersApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        SuppliersApi { http }
    }

    pub async fn list(&self) -> ClientResult<Vec<Supplier>> {
        self.http.require_retailer()?;
        self.http.get("/suppliers", &[]).await
    }

    pub async fn create(&self, draft: &SupplierDraft) -> ClientResult<Supplier> {
        self.http.require_retailer()?;
        validate_name("name", &draft.name)?;
        let supplier: Supplier = self.http.post("/suppliers", &[], draft).await?;
        info!(supplier_id = supplier.id, "Supplier created");
        Ok(supplier)
    }

    pub async fn update(&self, supplier_id: i64, draft: &SupplierDraft) -> ClientResult<Supplier> {
        self.http.require_retailer()?;
        validate_name("name", &draft.name)?;
        self.http.put(&format!("/suppliers/{}", supplier_id), &[], draft).await
    }

    pub async fn delete(&self, supplier_id: i64) -> ClientResult<()> {
        self.http.require_retailer()?;
        self.http.delete(&format!("/suppliers/{}", supplier_id), &[]).await
    }

    pub async fn transactions(&self, supplier_id: i64) -> ClientResult<Vec<SupplierTransaction>> {
        self.http.require_retailer()?;
        self.http
            .get(&format!("/suppliers/{}/transactions", supplier_id), &[])
            .await
    }

    pub async fn transact(&self, supplier_id: i64, request: &SupplierTransactionRequest) -> ClientResult<()> {
        self.http.require_retailer()?;
        validate_entry_amount(request.amount)?;

        let builder = self
            .http
            .request(reqwest::Method::POST, &format!("/suppliers/{}/transact", supplier_id))?
            .json(request);
        self.http.send_text(builder).await?;
        info!(supplier_id, kind = ?request.transaction_type, amount = %request.amount, "Supplier transaction recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_wire_shape() {
        let req = SupplierTransactionRequest {
            transaction_type: SupplierTransactionType::Payment,
            amount: Money::from_rupees(250),
            description: Some("Cheque 1142".into()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "PAYMENT");
        assert_eq!(json["amount"], 250.0);
        assert_eq!(json["description"], "Cheque 1142");
    }
}
