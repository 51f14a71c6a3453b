//! # Payments API
//!
//! Payments recorded against a customer's due outside the bill flow.

use tracing::info;

use khatha_core::validation::validate_entry_amount;
use khatha_core::Payment;

use crate::error::ClientResult;
use crate::http::HttpClient;

pub struct PaymentsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> PaymentsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        PaymentsApi { http }
    }

    /// `POST /payments/{customerId}`.
    pub async fn record(&self, customer_id: i64, payment: &Payment) -> ClientResult<Payment> {
        validate_entry_amount(payment.amount)?;
        let saved: Payment = self
            .http
            .post(&format!("/payments/{}", customer_id), &[], payment)
            .await?;
        info!(customer_id, amount = %payment.amount, "Payment recorded");
        Ok(saved)
    }

    /// `GET /payments`.
    pub async fn list(&self) -> ClientResult<Vec<Payment>> {
        self.http.get("/payments", &[]).await
    }
}
