//! Counter billing against a fake backend.

mod common;

use serde_json::json;

use common::{bill_json, customer_json, product_json, FakeBackend};
use khatha_client::workflow::billing::{BillingWorkflow, SubmitOutcome};
use khatha_client::ClientError;
use khatha_core::checkout::{CheckoutSession, CheckoutState, UpiPayee};
use khatha_core::{CoreError, Customer, GstRate, PaymentMode, Product};

fn product(id: i64, barcode: &str, rupees: f64, stock: i64) -> Product {
    serde_json::from_value(product_json(id, &format!("Item {}", id), barcode, rupees, stock)).unwrap()
}

fn customer(id: i64, points: u32) -> Customer {
    serde_json::from_value(customer_json(id, "Asha", points, 0.0)).unwrap()
}

fn stock_backend(backend: &FakeBackend) {
    backend.respond_json("GET", "/products", 200, json!([product_json(1, "Biscuit", "B1", 40.0, 9)]));
    backend.respond_json("GET", "/customers", 200, json!([customer_json(5, "Asha", 10, 0.0)]));
}

#[tokio::test]
async fn test_walk_in_cash_bill_posts_to_paid_and_resets() {
    let backend = FakeBackend::start().await;
    stock_backend(&backend);
    backend.respond_json("POST", "/bills/paid", 200, bill_json(101, "SALE", 42.0, 42.0, "B1 x1"));
    let api = backend.api(Some(7));

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();
    checkout.select_payment_mode(PaymentMode::Cash);

    let outcome = BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap();
    let saved = match outcome {
        SubmitOutcome::Saved(saved) => saved,
        other => panic!("expected a saved bill, got {:?}", other),
    };

    assert_eq!(saved.bill.id, 101);
    assert_eq!(saved.receipt.len(), 1);
    assert_eq!(saved.receipt[0].name, "Biscuit");
    assert!(saved.products.is_some());
    assert!(saved.customers.is_some());

    let sent = backend.requests_to("POST", "/bills/paid");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].retailer_header.as_deref(), Some("7"));
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer test-token"));
    let body = sent[0].json();
    assert_eq!(body["type"], "SALE");
    assert_eq!(body["paymentMode"], "CASH");
    assert_eq!(body["amount"].as_f64(), Some(42.0));
    assert_eq!(body["items"], "B1 x1");

    assert!(checkout.cart().is_empty());
    assert_eq!(checkout.state(), &CheckoutState::Submitted { bill_id: 101 });
}

#[tokio::test]
async fn test_khatha_bill_goes_to_customer_as_gave() {
    let backend = FakeBackend::start().await;
    stock_backend(&backend);
    backend.respond_json("POST", "/bills/5", 200, bill_json(102, "GAVE", 42.0, 10.0, "B1 x1"));
    let api = backend.api(Some(7));

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();
    checkout.select_payment_mode(PaymentMode::Khatha);
    checkout.attach_customer(customer(5, 0));
    checkout.set_paid_amount("10".parse().unwrap());

    BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap();

    let body = backend.requests_to("POST", "/bills/5")[0].json();
    assert_eq!(body["type"], "GAVE");
    assert_eq!(body["paymentMode"], "KHATHA");
    assert_eq!(body["paidAmount"].as_f64(), Some(10.0));
    assert!(backend.requests_to("POST", "/bills/paid").is_empty());
}

#[tokio::test]
async fn test_khatha_without_customer_sends_nothing() {
    let backend = FakeBackend::start().await;
    let api = backend.api(Some(7));

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();
    checkout.select_payment_mode(PaymentMode::Khatha);

    let err = BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(CoreError::CustomerRequired { .. })));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_backend_rejection_keeps_cart_and_message() {
    let backend = FakeBackend::start().await;
    backend.respond("POST", "/bills/paid", 400, "Insufficient stock for Biscuit");
    let api = backend.api(Some(7));

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();
    checkout.select_payment_mode(PaymentMode::Cash);

    let err = BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Insufficient stock for Biscuit");
    assert_eq!(err.status(), Some(400));

    assert_eq!(checkout.cart().quantity_of(1), 1);
    assert_eq!(checkout.state(), &CheckoutState::PaymentModeSelected);
    assert!(!checkout.is_submitting());
    // No reload after a failed sale.
    assert!(backend.requests_to("GET", "/products").is_empty());
}

#[tokio::test]
async fn test_upi_bill_waits_for_confirmation() {
    let backend = FakeBackend::start().await;
    stock_backend(&backend);
    backend.respond_json("POST", "/bills/paid", 200, bill_json(103, "SALE", 42.0, 42.0, "B1 x1"));
    let api = backend.api(Some(7));
    let workflow = BillingWorkflow::new(&api);

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();
    checkout.select_payment_mode(PaymentMode::Upi);

    let payee = UpiPayee {
        upi_id: "shop@upi".into(),
        payee_name: Some("Ravi Stores".into()),
    };
    let outcome = workflow.submit(&mut checkout, Some(&payee)).await.unwrap();
    match outcome {
        SubmitOutcome::NeedsUpiConfirmation { link, .. } => {
            assert!(link.starts_with("upi://pay?"));
            assert!(link.contains("am=42"));
        }
        other => panic!("expected a UPI prompt, got {:?}", other),
    }
    assert!(backend.requests().is_empty());

    let saved = workflow.confirm_upi(&mut checkout).await.unwrap();
    assert_eq!(saved.bill.id, 103);
    assert_eq!(backend.requests_to("POST", "/bills/paid")[0].json()["paymentMode"], "UPI");
}

#[tokio::test]
async fn test_upi_without_payee_is_refused() {
    let backend = FakeBackend::start().await;
    let api = backend.api(Some(7));

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();
    checkout.select_payment_mode(PaymentMode::Upi);

    let err = BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(CoreError::UpiNotConfigured)));
}

#[tokio::test]
async fn test_failed_reload_still_renders_receipt_from_cart() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/products", 500, "boom");
    backend.respond_json("GET", "/customers", 200, json!([]));
    backend.respond_json("POST", "/bills/paid", 200, bill_json(104, "SALE", 42.0, 42.0, "B1 x1"));
    let api = backend.api(Some(7));

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();

    let outcome = BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap();
    let SubmitOutcome::Saved(saved) = outcome else {
        panic!("expected a saved bill");
    };
    assert!(saved.products.is_none());
    assert_eq!(saved.receipt[0].name, "Item 1");
}

#[tokio::test]
async fn test_no_retailer_refuses_before_sending() {
    let backend = FakeBackend::start().await;
    let api = backend.api(None);

    let mut checkout = CheckoutSession::new(GstRate::from_percent(5));
    checkout.add_product(&product(1, "B1", 40.0, 10)).unwrap();

    let err = BillingWorkflow::new(&api).submit(&mut checkout, None).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingRetailer));
    assert!(backend.requests().is_empty());
}
