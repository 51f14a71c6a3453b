//! # Session
//!
//! Who is logged in and for which shop. Everything that used to be
//! scattered across browser storage keys is one typed value here.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   (logged out) ──login_retailer──► Retailer { retailer_id, token }     │
//! │        │                                │                               │
//! │        │                          switch_mode                           │
//! │        │                                ▼                               │
//! │        └────login_customer───► Customer { accounts, selected }         │
//! │                                         │                               │
//! │                                   select_account(retailer)             │
//! │                                                                         │
//! │   logout ──► (logged out)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`SessionStore`] shares one session across tasks and persists it as
//! JSON between terminal invocations. Last writer wins.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use khatha_core::checkout::UpiPayee;
use khatha_core::{CustomerAccount, RetailerProfile};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Mode
// =============================================================================

/// Which side of the app the session is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    Retailer,
    Customer,
}

impl std::fmt::Display for AppMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppMode::Retailer => write!(f, "retailer"),
            AppMode::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for AppMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retailer" | "shop" => Ok(AppMode::Retailer),
            "customer" => Ok(AppMode::Customer),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown mode: '{}'. Valid options: retailer, customer",
                other
            ))),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub mode: AppMode,
    #[serde(default)]
    pub retailer_id: Option<i64>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub retailer_name: Option<String>,
    #[serde(default)]
    pub retailer_email: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub customer_accounts: Vec<CustomerAccount>,
    #[serde(default)]
    pub selected_account: Option<CustomerAccount>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        match self.mode {
            AppMode::Retailer => self.retailer_id.is_some(),
            AppMode::Customer => self.selected_account.is_some(),
        }
    }

    pub fn login_retailer(&mut self, retailer_id: i64, token: Option<String>, email: Option<String>) {
        info!(retailer_id, "Retailer logged in");
        self.mode = AppMode::Retailer;
        self.retailer_id = Some(retailer_id);
        self.auth_token = token;
        self.retailer_email = email;
    }

    /// Stores the shop details the counter needs (UPI id, payee name).
    pub fn apply_profile(&mut self, profile: &RetailerProfile) {
        self.retailer_name = profile.shop_name.clone().or_else(|| profile.name.clone());
        self.upi_id = profile.upi_id.clone();
        self.payee_name = profile.payee_name.clone();
        if self.retailer_email.is_none() {
            self.retailer_email = profile.email.clone();
        }
    }

    /// A customer is one record per shop; the first account is selected.
    pub fn login_customer(&mut self, accounts: Vec<CustomerAccount>, token: Option<String>) {
        info!(accounts = accounts.len(), "Customer logged in");
        self.mode = AppMode::Customer;
        self.selected_account = accounts.first().cloned();
        self.customer_accounts = accounts;
        if token.is_some() {
            self.auth_token = token;
        }
    }

    pub fn select_account(&mut self, retailer_id: i64) -> ClientResult<&CustomerAccount> {
        let account = self
            .customer_accounts
            .iter()
            .find(|a| a.retailer_id == retailer_id)
            .cloned()
            .ok_or_else(|| {
                ClientError::InvalidConfig(format!("No customer account at retailer {}", retailer_id))
            })?;
        debug!(retailer_id, customer_id = account.customer_id, "Selected customer account");
        Ok(self.selected_account.insert(account))
    }

    pub fn switch_mode(&mut self, mode: AppMode) {
        debug!(from = %self.mode, to = %mode, "Switching mode");
        self.mode = mode;
    }

    pub fn logout(&mut self) {
        *self = Session::default();
    }

    /// Retailer that scopes API calls: the shop itself in retailer mode,
    /// the selected account's shop in customer mode.
    pub fn retailer_scope(&self) -> Option<i64> {
        match self.mode {
            AppMode::Retailer => self.retailer_id,
            AppMode::Customer => self.selected_account.as_ref().map(|a| a.retailer_id),
        }
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.selected_account.as_ref().map(|a| a.customer_id)
    }

    pub fn require_retailer(&self) -> ClientResult<i64> {
        if !self.is_logged_in() {
            return Err(ClientError::NotLoggedIn);
        }
        self.retailer_scope().ok_or(ClientError::MissingRetailer)
    }

    pub fn require_customer(&self) -> ClientResult<&CustomerAccount> {
        self.selected_account.as_ref().ok_or(ClientError::NotLoggedIn)
    }

    /// UPI payee for the counter, if the shop has set a UPI id.
    pub fn upi_payee(&self) -> Option<UpiPayee> {
        self.upi_id
            .as_ref()
            .filter(|id| !id.trim().is_empty())
            .map(|id| UpiPayee {
                upi_id: id.clone(),
                payee_name: self.payee_name.clone(),
            })
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Shared, file-backed session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// In-memory only.
    pub fn new(session: Session) -> Self {
        SessionStore {
            inner: Arc::new(RwLock::new(session)),
            path: None,
        }
    }

    /// Loads the session file; a missing file is a logged-out session.
    pub async fn load(path: Option<PathBuf>) -> ClientResult<Self> {
        let session = match path {
            Some(ref p) if p.exists() => {
                debug!(path = ?p, "Loading session");
                let contents = tokio::fs::read_to_string(p)
                    .await
                    .map_err(|e| ClientError::SessionIo(e.to_string()))?;
                serde_json::from_str(&contents).map_err(|e| ClientError::SessionIo(e.to_string()))?
            }
            _ => Session::default(),
        };

        Ok(SessionStore {
            inner: Arc::new(RwLock::new(session)),
            path,
        })
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    /// Mutates the session and persists it.
    pub async fn update<F, R>(&self, f: F) -> ClientResult<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let (result, session) = {
            let mut guard = self.inner.write().await;
            let result = f(&mut guard);
            (result, guard.clone())
        };
        self.persist(&session).await?;
        Ok(result)
    }

    async fn persist(&self, session: &Session) -> ClientResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::SessionIo(e.to_string()))?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| ClientError::SessionIo(e.to_string()))?;
        debug!(?path, "Session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(customer_id: i64, retailer_id: i64) -> CustomerAccount {
        CustomerAccount {
            customer_id,
            retailer_id,
            retailer_name: Some(format!("Shop {}", retailer_id)),
            name: Some("Asha".into()),
        }
    }

    #[test]
    fn test_retailer_login_scopes_calls() {
        let mut s = Session::default();
        assert!(!s.is_logged_in());
        assert!(matches!(s.require_retailer(), Err(ClientError::NotLoggedIn)));

        s.login_retailer(12, Some("tok".into()), None);
        assert!(s.is_logged_in());
        assert_eq!(s.require_retailer().unwrap(), 12);
    }

    #[test]
    fn test_customer_login_selects_first_account() {
        let mut s = Session::default();
        s.login_customer(vec![account(3, 10), account(4, 20)], None);

        assert_eq!(s.mode, AppMode::Customer);
        assert_eq!(s.customer_id(), Some(3));
        assert_eq!(s.retailer_scope(), Some(10));

        s.select_account(20).unwrap();
        assert_eq!(s.customer_id(), Some(4));
        assert!(s.select_account(99).is_err());
    }

    #[test]
    fn test_upi_payee_needs_id() {
        let mut s = Session::default();
        assert!(s.upi_payee().is_none());

        s.upi_id = Some("  ".into());
        assert!(s.upi_payee().is_none());

        s.upi_id = Some("shop@upi".into());
        s.payee_name = Some("Sharma Stores".into());
        let payee = s.upi_payee().unwrap();
        assert_eq!(payee.upi_id, "shop@upi");
        assert_eq!(payee.payee_name.as_deref(), Some("Sharma Stores"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("customer".parse::<AppMode>().unwrap(), AppMode::Customer);
        assert_eq!("SHOP".parse::<AppMode>().unwrap(), AppMode::Retailer);
        assert!("admin".parse::<AppMode>().is_err());
    }

    #[tokio::test]
    async fn test_store_persists_updates() {
        let path = std::env::temp_dir()
            .join(format!("khatha-session-{}", std::process::id()))
            .join("session.json");

        let store = SessionStore::load(Some(path.clone())).await.unwrap();
        assert!(!store.snapshot().await.is_logged_in());

        store.update(|s| s.login_retailer(5, None, None)).await.unwrap();

        let reloaded = SessionStore::load(Some(path.clone())).await.unwrap();
        assert_eq!(reloaded.snapshot().await.retailer_id, Some(5));

        reloaded.update(Session::logout).await.unwrap();
        assert_eq!(SessionStore::load(Some(path.clone())).await.unwrap().snapshot().await, Session::default());

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }
}
