//! # Commands Module
//!
//! One module per command group. Every command takes the [`AppState`] it
//! needs plus its parsed arguments and returns a [`Reply`].
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (Reply, shared guards)
//! ├── auth.rs       ◄─── login, signup, customer login, mode, whoami
//! ├── cart.rs       ◄─── counter cart edits
//! ├── billing.rs    ◄─── save the counter sale (UPI prompt, new customer)
//! ├── bills.rs      ◄─── all bills: search, receipt, edit, CSV export
//! ├── customers.rs  ◄─── customers, khatha entries, scheme, payments
//! ├── products.rs   ◄─── catalogue CRUD, UPC lookup
//! ├── orders.rs     ◄─── orders received by the shop
//! ├── market.rs     ◄─── marketplace browse, cart, checkout, my orders
//! ├── suppliers.rs  ◄─── suppliers and their transactions
//! ├── staff.rs      ◄─── staff and attendance
//! ├── dashboard.rs  ◄─── shop overview
//! ├── profile.rs    ◄─── shop profile and UPI id
//! └── config.rs     ◄─── show / change settings
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  khatha cart add 8901234                                               │
//! │         │                                                               │
//! │         ▼  (clap)                                                       │
//! │  CartCommand::Add { barcode: Some("8901234"), id: None }               │
//! │         │                                                               │
//! │         ▼  (lib::run)                                                   │
//! │  commands::cart::run(&state, cmd) ──► Result<Reply, CommandError>      │
//! │         │                                                               │
//! │         ▼  (main)                                                       │
//! │  --json ? reply.data : reply.text                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod billing;
pub mod bills;
pub mod cart;
pub mod config;
pub mod customers;
pub mod dashboard;
pub mod market;
pub mod orders;
pub mod products;
pub mod profile;
pub mod staff;
pub mod suppliers;

use serde::Serialize;

use khatha_client::{AppMode, KhathaApi};

use crate::error::{CommandError, CommandResult, ErrorCode};
use crate::prompt::Prompt;
use crate::state::AppState;

/// What a command hands back for printing.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Human-readable output.
    pub text: String,
    /// The same result for `--json`.
    pub data: serde_json::Value,
}

impl Reply {
    pub fn new<T: Serialize>(text: impl Into<String>, data: &T) -> CommandResult<Self> {
        Ok(Reply {
            text: text.into(),
            data: serde_json::to_value(data)?,
        })
    }

    /// A bare message; `--json` prints `{ "message": ... }`.
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Reply {
            data: serde_json::json!({ "message": text }),
            text,
        }
    }

    pub fn render(&self, json: bool) -> String {
        if json {
            serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| self.data.to_string())
        } else {
            self.text.clone()
        }
    }
}

// =============================================================================
// Shared Guards
// =============================================================================

/// API client plus the shop id, for retailer-only commands.
pub(crate) async fn retailer_api(state: &AppState) -> CommandResult<(KhathaApi, i64)> {
    let session = state.session.snapshot().await;
    if session.mode != AppMode::Retailer {
        return Err(CommandError::new(
            ErrorCode::InvalidState,
            "This command is for shop owners. Run `khatha mode retailer` first.",
        ));
    }
    let retailer_id = session.require_retailer()?;
    Ok((state.api().await?, retailer_id))
}

/// Destructive commands ask first unless `--yes` was given.
pub(crate) fn confirm_or_cancel(prompt: &mut dyn Prompt, yes: bool, question: &str) -> CommandResult<()> {
    if yes || prompt.confirm(question) {
        Ok(())
    } else {
        Err(CommandError::cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use khatha_client::{ClientConfig, Session};

    #[test]
    fn test_message_reply_renders_both_ways() {
        let reply = Reply::message("Cart cleared");
        assert_eq!(reply.render(false), "Cart cleared");
        assert!(reply.render(true).contains("\"message\": \"Cart cleared\""));
    }

    #[tokio::test]
    async fn test_retailer_commands_need_retailer_mode() {
        let mut session = Session::default();
        session.switch_mode(AppMode::Customer);
        let state = AppState::in_memory(ClientConfig::default(), session);
        let err = retailer_api(&state).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        let state = AppState::in_memory(ClientConfig::default(), Session::default());
        let err = retailer_api(&state).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotLoggedIn);
    }

    #[test]
    fn test_declined_confirmation_cancels() {
        let mut prompt = ScriptedPrompt::new(["n"]);
        let err = confirm_or_cancel(&mut prompt, false, "Delete?").unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
        assert!(confirm_or_cancel(&mut prompt, true, "Delete?").is_ok());
    }
}
