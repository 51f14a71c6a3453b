//! # Command Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command fn ── Result<Reply, CommandError>                             │
//! │      │                                                                  │
//! │      ├── ValidationError ──► CoreError ──┐                             │
//! │      │                                   ▼                             │
//! │      ├── ClientError::Backend{400,..} ─► CommandError { code, message }│
//! │      │                                   │                             │
//! │      └── ClientError::ConnectionFailed ─┘                             │
//! │                                          ▼                             │
//! │                       main: "error[BACKEND_REJECTED]: Insufficient ..." │
//! │                             exit code per category                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend text is carried through untouched; only the code is added.

use serde::Serialize;

use khatha_client::ClientError;
use khatha_core::{CoreError, ValidationError};

/// Error returned from a terminal command.
///
/// With `--json` this is what gets printed:
/// ```json
/// { "code": "CUSTOMER_REQUIRED", "message": "Select or create a customer first (credit bills need a customer)" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed a local check.
    ValidationError,

    /// Cart rule (empty, too large, out of stock).
    CartError,

    /// A customer must be attached first.
    CustomerRequired,

    /// UPI chosen but the shop has no UPI id.
    UpiNotConfigured,

    /// Checkout cannot do that right now.
    InvalidState,

    /// The backend answered with an error.
    BackendRejected,

    /// The backend could not be reached.
    NetworkError,

    /// Some marketplace orders failed.
    OrderFailed,

    NotLoggedIn,

    AuthFailed,

    ConfigError,

    /// Cashier declined a prompt.
    Cancelled,

    Internal,
}

impl ErrorCode {
    /// Process exit status for this category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::CartError
            | ErrorCode::CustomerRequired
            | ErrorCode::UpiNotConfigured
            | ErrorCode::InvalidState => 2,
            ErrorCode::NotLoggedIn | ErrorCode::AuthFailed => 3,
            ErrorCode::BackendRejected | ErrorCode::OrderFailed => 4,
            ErrorCode::NetworkError => 5,
            ErrorCode::ConfigError => 6,
            ErrorCode::Cancelled => 130,
            ErrorCode::Internal => 1,
        }
    }
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CommandError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        CommandError::new(ErrorCode::ValidationError, format!("{} not found: {}", what, id))
    }

    pub fn cancelled() -> Self {
        CommandError::new(ErrorCode::Cancelled, "Cancelled")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::Internal, message)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::EmptyCart
            | CoreError::OutOfStock { .. }
            | CoreError::ProductNotInCart(_)
            | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::CustomerRequired { .. } => ErrorCode::CustomerRequired,
            CoreError::UpiNotConfigured => ErrorCode::UpiNotConfigured,
            CoreError::SubmissionInProgress | CoreError::InvalidTransition { .. } => ErrorCode::InvalidState,
        };
        let message = match err {
            // The wrapper prefix adds nothing at the counter.
            CoreError::Validation(inner) => inner.to_string(),
            other => other.to_string(),
        };
        CommandError::new(code, message)
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::validation(err.to_string())
    }
}

impl From<ClientError> for CommandError {
    fn from(err: ClientError) -> Self {
        let err = match err {
            ClientError::Core(core) => return CommandError::from(core),
            other => other,
        };
        let code = match &err {
            ClientError::Core(_) => ErrorCode::Internal,
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
            ClientError::ConnectionFailed(_) | ClientError::Timeout(_) => ErrorCode::NetworkError,
            ClientError::Backend { .. } => ErrorCode::BackendRejected,
            ClientError::OrderSubmission { .. } => ErrorCode::OrderFailed,
            ClientError::NotLoggedIn | ClientError::MissingRetailer => ErrorCode::NotLoggedIn,
            ClientError::AuthFailed(_) => ErrorCode::AuthFailed,
            ClientError::RequestFailed(_) | ClientError::DecodeFailed(_) | ClientError::SessionIo(_) => {
                tracing::error!(error = %err, "Command failed");
                ErrorCode::Internal
            }
        };
        CommandError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::internal(format!("Draft file is unreadable: {}", err))
    }
}

impl From<csv::Error> for CommandError {
    fn from(err: csv::Error) -> Self {
        CommandError::internal(format!("Export failed: {}", err))
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::internal(err.to_string())
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        write!(f, "[{}] {}", code, self.message)
    }
}

impl std::error::Error for CommandError {}
