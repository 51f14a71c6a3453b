//! Retry, headers and error mapping of the HTTP wrapper.

mod common;

use serde_json::json;

use common::{product_json, FakeBackend};
use khatha_client::ClientError;

#[tokio::test]
async fn test_get_is_not_retried_by_default() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/customers", 503, "busy");
    backend.respond_json("GET", "/customers", 200, json!([]));
    let api = backend.api(Some(7));

    let err = api.customers().list().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());
    assert_eq!(backend.requests_to("GET", "/customers").len(), 1);
}

#[tokio::test]
async fn test_get_retries_server_errors_when_enabled() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/customers", 503, "busy");
    backend.respond_json("GET", "/customers", 200, json!([]));

    let mut config = backend.config();
    config.retry.max_retries = 2;
    config.retry.initial_backoff_ms = 1;
    let api = backend.api_with(config, Some(7));

    let customers = api.customers().list().await.unwrap();
    assert!(customers.is_empty());
    assert_eq!(backend.requests_to("GET", "/customers").len(), 2);
}

#[tokio::test]
async fn test_client_errors_are_never_retried() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/customers/9", 404, "Customer not found");

    let mut config = backend.config();
    config.retry.max_retries = 3;
    config.retry.initial_backoff_ms = 1;
    let api = backend.api_with(config, Some(7));

    let err = api.customers().get(9).await.unwrap_err();
    assert_eq!(err.to_string(), "Customer not found");
    assert_eq!(backend.requests_to("GET", "/customers/9").len(), 1);
}

#[tokio::test]
async fn test_posts_are_not_retried() {
    let backend = FakeBackend::start().await;
    backend.respond("POST", "/suppliers", 503, "busy");

    let mut config = backend.config();
    config.retry.max_retries = 3;
    config.retry.initial_backoff_ms = 1;
    let api = backend.api_with(config, Some(7));

    let draft = khatha_core::SupplierDraft {
        name: "Wholesale Co".into(),
        phone: None,
    };
    api.suppliers().create(&draft).await.unwrap_err();
    assert_eq!(backend.requests_to("POST", "/suppliers").len(), 1);
}

#[tokio::test]
async fn test_product_list_is_scoped_to_retailer() {
    let backend = FakeBackend::start().await;
    backend.respond_json("GET", "/products", 200, json!([product_json(1, "Tea", "T1", 120.0, 4)]));
    let api = backend.api(Some(7));

    let products = api.products().list().await.unwrap();
    assert_eq!(products[0].name, "Tea");

    let sent = &backend.requests_to("GET", "/products")[0];
    assert_eq!(sent.query.as_deref(), Some("retailerId=7"));
    assert_eq!(sent.retailer_header.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_garbled_body_is_a_decode_error() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/customers", 200, "<html>oops</html>");
    let api = backend.api(Some(7));

    let err = api.customers().list().await.unwrap_err();
    assert!(matches!(err, ClientError::DecodeFailed(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_connection_error() {
    let backend = FakeBackend::start().await;
    let mut config = backend.config();
    config.api.base_url = "http://127.0.0.1:9/api".into();
    let api = khatha_client::KhathaApi::new(
        khatha_client::HttpClient::new(&config).unwrap().with_retailer(Some(7)),
    );

    let err = api.customers().list().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.status().is_none());
}
