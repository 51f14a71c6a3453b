//! # Auth API
//!
//! OTP login for retailers and customers, signup, and the public shop list.
//! The backend issues and checks OTPs; this module only carries them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use khatha_core::validation::{validate_email, validate_name, validate_phone};
use khatha_core::{CustomerAccount, RetailerProfile};

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
struct OtpVerification<'a> {
    email: &'a str,
    otp: &'a str,
}

/// Reply to `POST /auth/verify-otp`. The backend has sent the retailer id
/// as `retailerId`, as `id`, and nested under `data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailerLogin {
    #[serde(default)]
    retailer_id: Option<i64>,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    data: Option<Box<RetailerLogin>>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    retailer_name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl RetailerLogin {
    pub fn retailer_id(&self) -> Option<i64> {
        self.retailer_id
            .or(self.id)
            .or_else(|| self.data.as_ref().and_then(|d| d.retailer_id()))
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.retailer_name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailerSignup {
    pub email: String,
    pub name: String,
    pub phone: String,
}

/// Reply to `POST /customer-auth/verify-otp`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CustomerOtpOutcome {
    /// Known customer: one account per shop.
    Accounts(Vec<CustomerAccount>),
    /// Verified email with no account yet; register at a shop next.
    NewUser(NewUserMarker),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserMarker {
    #[serde(default)]
    pub is_new_user: bool,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /customer-auth/register`. `retailerId` travels as a string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistration {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub retailer_id: String,
}

impl CustomerRegistration {
    pub fn new(email: &str, name: Option<&str>, phone: Option<&str>, retailer_id: i64) -> Self {
        CustomerRegistration {
            email: email.trim().to_string(),
            name: name.filter(|n| !n.trim().is_empty()).unwrap_or("Customer").to_string(),
            phone: phone.filter(|p| !p.trim().is_empty()).unwrap_or("0000000000").to_string(),
            retailer_id: retailer_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PhoneLogin<'a> {
    phone: &'a str,
}

// =============================================================================
// Auth API
// =============================================================================

pub struct AuthApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        AuthApi { http }
    }

    /// `POST /auth/send-otp?email=`. Returns the server's message.
    pub async fn send_otp(&self, email: &str) -> ClientResult<String> {
        validate_email(email)?;
        let builder = self
            .http
            .request(reqwest::Method::POST, "/auth/send-otp")?
            .query(&[("email", email)]);
        self.http.send_text(builder).await
    }

    /// `POST /auth/verify-otp`.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> ClientResult<RetailerLogin> {
        let login: RetailerLogin = self
            .http
            .post("/auth/verify-otp", &[], &OtpVerification { email, otp: otp.trim() })
            .await?;

        match login.retailer_id() {
            Some(id) => {
                info!(retailer_id = id, "Retailer OTP verified");
                Ok(login)
            }
            None => Err(ClientError::AuthFailed("Invalid OTP".into())),
        }
    }

    /// `POST /auth/signup`.
    pub async fn signup(&self, signup: &RetailerSignup) -> ClientResult<()> {
        validate_email(&signup.email)?;
        validate_name("name", &signup.name)?;
        let builder = self
            .http
            .request(reqwest::Method::POST, "/auth/signup")?
            .json(signup);
        self.http.send_text(builder).await.map(|_| ())
    }

    /// `POST /customer-auth/send-otp?email=`.
    pub async fn send_customer_otp(&self, email: &str) -> ClientResult<String> {
        validate_email(email)?;
        let builder = self
            .http
            .request(reqwest::Method::POST, "/customer-auth/send-otp")?
            .query(&[("email", email)]);
        self.http.send_text(builder).await
    }

    /// `POST /customer-auth/verify-otp`.
    pub async fn verify_customer_otp(&self, email: &str, otp: &str) -> ClientResult<CustomerOtpOutcome> {
        let outcome = self
            .http
            .post("/customer-auth/verify-otp", &[], &OtpVerification { email, otp: otp.trim() })
            .await?;
        debug!(?outcome, "Customer OTP verified");
        Ok(outcome)
    }

    /// `POST /customer-auth/register`. Returns the new account list.
    pub async fn register_customer(&self, registration: &CustomerRegistration) -> ClientResult<Vec<CustomerAccount>> {
        validate_email(&registration.email)?;
        self.http.post("/customer-auth/register", &[], registration).await
    }

    /// `POST /customer-auth/login` by phone number.
    pub async fn customer_login(&self, phone: &str) -> ClientResult<Vec<CustomerAccount>> {
        let phone = validate_phone(phone)?;
        let accounts: Vec<CustomerAccount> = self
            .http
            .post("/customer-auth/login", &[], &PhoneLogin { phone: &phone })
            .await?;
        if accounts.is_empty() {
            return Err(ClientError::AuthFailed("No shop accounts for this phone number".into()));
        }
        Ok(accounts)
    }

    /// `GET /customer-auth/public/retailers`.
    pub async fn public_retailers(&self) -> ClientResult<Vec<RetailerProfile>> {
        self.http.get("/customer-auth/public/retailers", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retailer_id_shapes() {
        let a: RetailerLogin = serde_json::from_str(r#"{"success":true,"retailerId":3}"#).unwrap();
        assert_eq!(a.retailer_id(), Some(3));

        let b: RetailerLogin = serde_json::from_str(r#"{"id":4,"name":"Sharma"}"#).unwrap();
        assert_eq!(b.retailer_id(), Some(4));
        assert_eq!(b.display_name(), Some("Sharma"));

        let c: RetailerLogin = serde_json::from_str(r#"{"data":{"retailerId":5}}"#).unwrap();
        assert_eq!(c.retailer_id(), Some(5));

        let d: RetailerLogin = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(d.retailer_id(), None);
    }

    #[test]
    fn test_customer_otp_outcome() {
        let known: CustomerOtpOutcome =
            serde_json::from_str(r#"[{"customerId":1,"retailerId":2,"retailerName":"A"}]"#).unwrap();
        assert!(matches!(known, CustomerOtpOutcome::Accounts(ref a) if a.len() == 1));

        let new: CustomerOtpOutcome =
            serde_json::from_str(r#"{"isNewUser":true,"email":"a@b.in"}"#).unwrap();
        assert!(matches!(new, CustomerOtpOutcome::NewUser(ref m) if m.is_new_user));
    }

    #[test]
    fn test_registration_fallbacks() {
        let r = CustomerRegistration::new(" a@b.in ", None, Some(""), 9);
        assert_eq!(r.email, "a@b.in");
        assert_eq!(r.name, "Customer");
        assert_eq!(r.phone, "0000000000");
        assert_eq!(serde_json::to_value(&r).unwrap()["retailerId"], "9");
    }
}
