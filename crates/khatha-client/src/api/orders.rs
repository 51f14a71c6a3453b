//! # Orders API
//!
//! Marketplace orders: creation (one per shop), listing, and status
//! changes. A DELIVERED update needs the customer's delivery OTP.

use tracing::info;

use khatha_core::order_split::CreateOrderRequest;
use khatha_core::{CoreError, Order, OrderStatus, ValidationError};

use crate::error::ClientResult;
use crate::http::HttpClient;

pub struct OrdersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> OrdersApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        OrdersApi { http }
    }

    /// `POST /orders/create`.
    pub async fn create(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        let order: Order = self.http.post("/orders/create", &[], request).await?;
        info!(
            order_id = order.id,
            retailer_id = request.retailer_id,
            total = %request.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// `GET /orders/retailer/{id}`.
    pub async fn for_retailer(&self, retailer_id: i64) -> ClientResult<Vec<Order>> {
        self.http.get(&format!("/orders/retailer/{}", retailer_id), &[]).await
    }

    /// `GET /orders/customer/{id}`.
    pub async fn for_customer(&self, customer_id: i64) -> ClientResult<Vec<Order>> {
        self.http.get(&format!("/orders/customer/{}", customer_id), &[]).await
    }

    /// `PUT /orders/{id}/status?status=&otp=`.
    pub async fn update_status(&self, order_id: i64, status: OrderStatus, otp: Option<&str>) -> ClientResult<()> {
        let otp = otp.map(str::trim).filter(|o| !o.is_empty());
        if status.requires_otp() && otp.is_none() {
            return Err(CoreError::from(ValidationError::Required {
                field: "delivery OTP".into(),
            })
            .into());
        }

        let mut query = vec![("status", status.as_str().to_string())];
        if let Some(otp) = otp {
            query.push(("otp", otp.to_string()));
        }

        let builder = self
            .http
            .request(reqwest::Method::PUT, &format!("/orders/{}/status", order_id))?
            .query(&query);
        self.http.send_text(builder).await?;
        info!(order_id, status = status.as_str(), "Order status updated");
        Ok(())
    }

    /// Customer-side cancel. Only PENDING orders can be cancelled.
    pub async fn cancel(&self, order: &Order) -> ClientResult<()> {
        if order.status != OrderStatus::Pending {
            return Err(CoreError::InvalidTransition {
                state: order.status.as_str().to_lowercase(),
                action: "cancel order".into(),
            }
            .into());
        }
        self.update_status(order.id, OrderStatus::Cancelled, None).await
    }
}
