//! # khatha-client: REST Client and Workflows for Khatha Wallet
//!
//! Everything that talks to the backend: one HTTP wrapper, one typed module
//! per resource, the session, configuration, and the multi-step submit
//! workflows.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ClientConfig ──┐                                                      │
//! │  (TOML + env)   │                                                      │
//! │                 ▼                                                      │
//! │  Session ──► KhathaApi::for_session ──► HttpClient ──► backend         │
//! │  (JSON file)        │                       ▲                          │
//! │                     ▼                       │                          │
//! │          workflow::{billing, orders,        │                          │
//! │                     ledger, dashboard} ─────┘                          │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │          khatha-core (pricing, cart, split, checkout)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Policy
//! - Local rule violations come back as [`ClientError::Core`] before any
//!   request is made.
//! - A non-2xx reply becomes [`ClientError::Backend`] with the server's text
//!   untouched.
//! - Only GETs are ever retried, and only when `retry.max_retries > 0`.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod workflow;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use api::KhathaApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use session::{AppMode, Session, SessionStore};
