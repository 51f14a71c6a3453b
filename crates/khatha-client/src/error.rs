//! # Client Error Types
//!
//! Error types for every call that leaves the process.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Backend{status, body}  │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  DecodeFailed           │ │
//! │  │  ConfigLoad/Save│  │  Request        │  │  OrderSubmission        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Session      │  │     Domain      │                              │
//! │  │                 │  │                 │                              │
//! │  │  NotLoggedIn    │  │  Core(CoreError)│                              │
//! │  │  MissingRetailer│  │                 │                              │
//! │  │  AuthFailed     │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A non-2xx response keeps the backend's body text untouched. The shop
//! owner sees exactly what the server said ("Insufficient stock for Sugar").

use khatha_core::CoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the backend.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Request could not be built or sent.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Non-2xx response. `body` is the server's text, verbatim.
    #[error("{body}")]
    Backend { status: u16, body: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    DecodeFailed(String),

    /// One or more per-retailer orders failed. Successful ones are not
    /// rolled back. `message` is the first failure's text.
    #[error("Failed to place order: {message} ({failed} of {total} shops failed)")]
    OrderSubmission {
        failed: usize,
        total: usize,
        message: String,
    },

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Not logged in. Run `khatha login` first.")]
    NotLoggedIn,

    /// The call is retailer-scoped but no retailer id is known.
    #[error("No retailer selected for this session")]
    MissingRetailer,

    /// OTP or login rejected.
    #[error("{0}")]
    AuthFailed(String),

    #[error("Session file error: {0}")]
    SessionIo(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// A rule in khatha-core rejected the action before any request.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<khatha_core::ValidationError> for ClientError {
    fn from(err: khatha_core::ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::DecodeFailed(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured duration
            ClientError::Timeout(0)
        } else if err.is_connect() {
            ClientError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            ClientError::DecodeFailed(err.to_string())
        } else {
            ClientError::RequestFailed(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl ClientError {
    /// Returns true if an idempotent request may be tried again.
    ///
    /// ## Retryable Errors
    /// - Connection failures
    /// - Timeouts
    /// - 5xx responses
    ///
    /// ## Non-Retryable Errors
    /// - 4xx responses (the server rejected the request itself)
    /// - Configuration and session errors
    /// - Domain rule violations
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ConnectionFailed(_) | ClientError::Timeout(_) => true,
            ClientError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the action was rejected locally, before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Core(_))
    }

    /// HTTP status of a backend rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khatha_core::ValidationError;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::ConnectionFailed("refused".into()).is_retryable());
        assert!(ClientError::Timeout(10).is_retryable());
        assert!(ClientError::Backend { status: 503, body: "down".into() }.is_retryable());

        assert!(!ClientError::Backend { status: 400, body: "bad".into() }.is_retryable());
        assert!(!ClientError::InvalidConfig("x".into()).is_retryable());
        assert!(!ClientError::Core(CoreError::EmptyCart).is_retryable());
    }

    #[test]
    fn test_backend_body_is_verbatim() {
        let err = ClientError::Backend {
            status: 400,
            body: "Insufficient stock for Sugar".into(),
        };
        assert_eq!(err.to_string(), "Insufficient stock for Sugar");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_categories() {
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(!ClientError::NotLoggedIn.is_config_error());

        let err: ClientError = ValidationError::Required { field: "amount".into() }.into();
        assert!(err.is_validation());
    }

    #[test]
    fn test_order_submission_display() {
        let err = ClientError::OrderSubmission {
            failed: 1,
            total: 3,
            message: "Shop closed".into(),
        };
        assert!(err.to_string().contains("Shop closed"));
        assert!(err.to_string().contains("1 of 3"));
    }
}
