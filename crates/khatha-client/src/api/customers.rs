//! # Customers API

use tracing::info;

use khatha_core::validation::{validate_email, validate_name, validate_phone};
use khatha_core::{Customer, NewCustomer, SchemeUpdate};

use crate::error::ClientResult;
use crate::http::HttpClient;

pub struct CustomersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> CustomersApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        CustomersApi { http }
    }

    /// `GET /customers` for the current shop.
    pub async fn list(&self) -> ClientResult<Vec<Customer>> {
        self.http.require_retailer()?;
        self.http.get("/customers", &[]).await
    }

    /// `GET /customers/{id}`.
    pub async fn get(&self, customer_id: i64) -> ClientResult<Customer> {
        self.http.get(&format!("/customers/{}", customer_id), &[]).await
    }

    /// `POST /customers`. Name and phone are checked first; the phone is
    /// sent as its bare ten digits.
    pub async fn create(&self, customer: &NewCustomer) -> ClientResult<Customer> {
        self.http.require_retailer()?;
        validate_name("name", &customer.name)?;
        let phone = validate_phone(&customer.phone)?;
        let email = match customer.email.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => {
                validate_email(e)?;
                Some(e.to_string())
            }
            _ => None,
        };

        let body = NewCustomer {
            name: customer.name.trim().to_string(),
            phone,
            email,
        };
        let created: Customer = self.http.post("/customers", &[], &body).await?;
        info!(customer_id = created.id, "Customer created");
        Ok(created)
    }

    /// `PUT /customers/{id}/email?email=`.
    pub async fn update_email(&self, customer_id: i64, email: &str) -> ClientResult<()> {
        validate_email(email)?;
        let builder = self
            .http
            .request(reqwest::Method::PUT, &format!("/customers/{}/email", customer_id))?
            .query(&[("email", email.trim())]);
        self.http.send_text(builder).await.map(|_| ())
    }

    /// `PUT /customers/{id}/scheme`.
    pub async fn update_scheme(&self, customer_id: i64, scheme: &SchemeUpdate) -> ClientResult<Customer> {
        self.http
            .put(&format!("/customers/{}/scheme", customer_id), &[], scheme)
            .await
    }

    /// `DELETE /customers/{id}`.
    pub async fn delete(&self, customer_id: i64) -> ClientResult<()> {
        self.http.require_retailer()?;
        self.http.delete(&format!("/customers/{}", customer_id), &[]).await?;
        info!(customer_id, "Customer deleted");
        Ok(())
    }
}
