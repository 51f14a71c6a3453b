//! In-process fake of the Khatha backend.
//!
//! Every request is recorded; replies are scripted per `(method, path)`.
//! A scripted queue plays its replies in order and repeats the last one.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;

use khatha_client::config::ClientConfig;
use khatha_client::{HttpClient, KhathaApi};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub retailer_header: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct Inner {
    replies: HashMap<(String, String), VecDeque<(u16, String)>>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<Inner>>;

pub struct FakeBackend {
    pub base_url: String,
    inner: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let inner: Shared = Arc::new(Mutex::new(Inner::default()));
        let app = Router::new().fallback(handle).with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeBackend {
            base_url: format!("http://{}/api", addr),
            inner,
        }
    }

    /// Queues a reply for `method path` (path without the `/api` prefix).
    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .replies
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.into()));
    }

    pub fn respond_json(&self, method: &str, path: &str, status: u16, body: Value) {
        self.respond(method, path, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.api.base_url = self.base_url.clone();
        config
    }

    /// API client logged in as `retailer`.
    pub fn api(&self, retailer: Option<i64>) -> KhathaApi {
        self.api_with(self.config(), retailer)
    }

    pub fn api_with(&self, config: ClientConfig, retailer: Option<i64>) -> KhathaApi {
        let http = HttpClient::new(&config)
            .unwrap()
            .with_base_url(self.base_url.clone())
            .with_auth_token(Some("test-token".into()))
            .with_retailer(retailer);
        KhathaApi::new(http)
    }
}

async fn handle(
    State(inner): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_string();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let mut inner = inner.lock().unwrap();
    inner.requests.push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        retailer_header: header("x-retailer-id"),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    let key = (method.to_string(), path);
    let reply = match inner.replies.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
    };

    match reply {
        Some((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body).into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("No route for {} {}", key.0, key.1)).into_response(),
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn product_json(id: i64, name: &str, barcode: &str, price: f64, stock: i64) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "barcode": barcode,
        "price": price,
        "quantity": stock,
        "productType": "UNIT",
        "retailerId": 7
    })
}

pub fn customer_json(id: i64, name: &str, points: u32, due: f64) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "phone": "9876543210",
        "loyaltyPoints": points,
        "dueAmount": due
    })
}

pub fn bill_json(id: i64, kind: &str, amount: f64, paid: f64, items: &str) -> Value {
    serde_json::json!({
        "id": id,
        "billNumber": format!("B-{}", id),
        "type": kind,
        "amount": amount,
        "paidAmount": paid,
        "dueAmount": amount - paid,
        "items": items,
        "status": if paid >= amount { "PAID" } else if paid > 0.0 { "PARTIAL" } else { "DUE" },
        "billDate": "2024-05-10T10:00:00"
    })
}
