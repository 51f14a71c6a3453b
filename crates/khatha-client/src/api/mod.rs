//! # Domain API Modules
//!
//! Thin, typed wrappers over the backend's REST resources. Each resource
//! borrows the shared [`HttpClient`]; none of them keep state.
//!
//! ```text
//! KhathaApi ─┬─ auth()           /auth/*, /customer-auth/*
//!            ├─ bills()          /bills/*
//!            ├─ customers()      /customers/*
//!            ├─ products()       /products/*
//!            ├─ orders()         /orders/*
//!            ├─ suppliers()      /suppliers/*
//!            ├─ staff()          /staff/*
//!            ├─ retailer()       /retailer/*
//!            ├─ payments()       /payments/*
//!            └─ notifications()  /notifications/*
//! ```

pub mod auth;
pub mod bills;
pub mod customers;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod retailer;
pub mod staff;
pub mod suppliers;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::session::Session;

pub use auth::AuthApi;
pub use bills::BillsApi;
pub use customers::CustomersApi;
pub use notifications::NotificationsApi;
pub use orders::OrdersApi;
pub use payments::PaymentsApi;
pub use products::ProductsApi;
pub use retailer::RetailerApi;
pub use staff::StaffApi;
pub use suppliers::SuppliersApi;

/// Entry point to every resource.
#[derive(Debug, Clone)]
pub struct KhathaApi {
    http: HttpClient,
}

impl KhathaApi {
    pub fn new(http: HttpClient) -> Self {
        KhathaApi { http }
    }

    /// Client scoped to the session's token and retailer.
    pub fn for_session(config: &ClientConfig, session: &Session) -> ClientResult<Self> {
        let http = HttpClient::new(config)?
            .with_auth_token(session.auth_token.clone())
            .with_retailer(session.retailer_scope());
        Ok(KhathaApi { http })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    pub fn bills(&self) -> BillsApi<'_> {
        BillsApi::new(&self.http)
    }

    pub fn customers(&self) -> CustomersApi<'_> {
        CustomersApi::new(&self.http)
    }

    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi::new(&self.http)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(&self.http)
    }

    pub fn suppliers(&self) -> SuppliersApi<'_> {
        SuppliersApi::new(&self.http)
    }

    pub fn staff(&self) -> StaffApi<'_> {
        StaffApi::new(&self.http)
    }

    pub fn retailer(&self) -> RetailerApi<'_> {
        RetailerApi::new(&self.http)
    }

    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(&self.http)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(&self.http)
    }
}
