//! Login flows and the public marketplace listing.

mod common;

use serde_json::json;

use common::{product_json, FakeBackend};
use khatha_client::api::auth::{CustomerOtpOutcome, CustomerRegistration};
use khatha_client::ClientError;

#[tokio::test]
async fn test_retailer_otp_accepts_nested_id() {
    let backend = FakeBackend::start().await;
    backend.respond_json(
        "POST",
        "/auth/verify-otp",
        200,
        json!({ "data": { "retailerId": 12 }, "token": "jwt", "email": "ravi@shop.in" }),
    );
    let api = backend.api(None);

    let login = api.auth().verify_otp("ravi@shop.in", " 123456 ").await.unwrap();
    assert_eq!(login.retailer_id(), Some(12));
    assert_eq!(login.token.as_deref(), Some("jwt"));

    let body = backend.requests_to("POST", "/auth/verify-otp")[0].json();
    assert_eq!(body["otp"], "123456");
}

#[tokio::test]
async fn test_retailer_otp_without_id_is_invalid() {
    let backend = FakeBackend::start().await;
    backend.respond_json("POST", "/auth/verify-otp", 200, json!({ "message": "nope" }));
    let api = backend.api(None);

    let err = api.auth().verify_otp("ravi@shop.in", "000000").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthFailed(ref m) if m == "Invalid OTP"));
}

#[tokio::test]
async fn test_send_otp_validates_email_first() {
    let backend = FakeBackend::start().await;
    let api = backend.api(None);

    assert!(api.auth().send_otp("not-an-email").await.unwrap_err().is_validation());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_customer_otp_new_user_then_register() {
    let backend = FakeBackend::start().await;
    backend.respond_json("POST", "/customer-auth/verify-otp", 200, json!({ "isNewUser": true }));
    backend.respond_json(
        "POST",
        "/customer-auth/register",
        200,
        json!([{ "customerId": 80, "retailerId": 3, "retailerName": "Green Grocers" }]),
    );
    let api = backend.api(None);

    let outcome = api.auth().verify_customer_otp("meena@mail.in", "4444").await.unwrap();
    assert!(matches!(outcome, CustomerOtpOutcome::NewUser(ref m) if m.is_new_user));

    let registration = CustomerRegistration::new("meena@mail.in", None, None, 3);
    let accounts = api.auth().register_customer(&registration).await.unwrap();
    assert_eq!(accounts[0].customer_id, 80);

    let body = backend.requests_to("POST", "/customer-auth/register")[0].json();
    assert_eq!(body["name"], "Customer");
    assert_eq!(body["phone"], "0000000000");
    assert_eq!(body["retailerId"], "3");
}

#[tokio::test]
async fn test_customer_otp_existing_accounts() {
    let backend = FakeBackend::start().await;
    backend.respond_json(
        "POST",
        "/customer-auth/verify-otp",
        200,
        json!([
            { "customerId": 80, "retailerId": 3 },
            { "customerId": 81, "retailerId": 4 }
        ]),
    );
    let api = backend.api(None);

    match api.auth().verify_customer_otp("meena@mail.in", "4444").await.unwrap() {
        CustomerOtpOutcome::Accounts(accounts) => assert_eq!(accounts.len(), 2),
        other => panic!("expected accounts, got {:?}", other),
    }
}

#[tokio::test]
async fn test_phone_login_with_no_accounts_fails() {
    let backend = FakeBackend::start().await;
    backend.respond_json("POST", "/customer-auth/login", 200, json!([]));
    let api = backend.api(None);

    let err = api.auth().customer_login("98765 43210").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthFailed(_)));
    assert_eq!(backend.requests_to("POST", "/customer-auth/login")[0].json()["phone"], "9876543210");
}

#[tokio::test]
async fn test_public_catalog_collapses_shared_listings() {
    let backend = FakeBackend::start().await;
    let mut misc = product_json(1, "Salt", "890100", 20.0, 5);
    misc["category"] = json!("MISCELLANEOUS");
    let mut grocery = product_json(2, "Salt 1kg", "890100", 22.0, 5);
    grocery["category"] = json!("GROCERY");
    let other = product_json(3, "Sugar", "", 45.0, 5);
    backend.respond_json("GET", "/products/public/all", 200, json!([misc, grocery, other]));
    let api = backend.api(None);

    let catalog = api.products().public_catalog(Some((12.9, 77.6))).await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].id, 2);
    assert_eq!(catalog[1].name, "Sugar");

    let query = backend.requests_to("GET", "/products/public/all")[0].query.clone().unwrap();
    assert!(query.contains("lat=12.9"));
    assert!(query.contains("lng=77.6"));
}

#[tokio::test]
async fn test_upc_lookup_not_found() {
    let backend = FakeBackend::start().await;
    backend.respond_json(
        "GET",
        "/products/upc/lookup",
        200,
        json!({ "status": "NOT_FOUND", "message": "No product for barcode" }),
    );
    let api = backend.api(Some(7));

    let lookup = api.products().lookup_upc(" 0000 ").await.unwrap();
    assert!(!lookup.is_found());
    assert_eq!(
        backend.requests_to("GET", "/products/upc/lookup")[0].query.as_deref(),
        Some("barcode=0000")
    );
}
