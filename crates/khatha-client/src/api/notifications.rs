//! # Notifications API

use tracing::info;

use crate::error::ClientResult;
use crate::http::HttpClient;

pub struct NotificationsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> NotificationsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        NotificationsApi { http }
    }

    /// `POST /notifications/{customerId}` with no body: tells the customer
    /// their loyalty balance and due. Delivery is the backend's job.
    pub async fn notify_customer(&self, customer_id: i64) -> ClientResult<String> {
        self.http.require_retailer()?;
        let builder = self
            .http
            .request(reqwest::Method::POST, &format!("/notifications/{}", customer_id))?;
        let message = self.http.send_text(builder).await?;
        info!(customer_id, "Customer notified");
        Ok(message)
    }
}
