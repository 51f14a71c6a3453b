//! # Session Commands
//!
//! Login, signup, mode switching and logout.
//!
//! ## Retailer Login
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  khatha login send-otp a@shop.in ──► POST /auth/send-otp?email=        │
//! │                                                                         │
//! │  khatha login verify a@shop.in 123456                                  │
//! │     │                                                                   │
//! │     ├── POST /auth/verify-otp ──► retailer id (+ token)               │
//! │     ├── session.login_retailer(...)        session.json written        │
//! │     └── GET /retailer/profile ──► UPI id, payee name (best effort)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Customers log in the same way under `khatha customer`; a new email
//! is registered with the shop given by `--shop`.

use serde::Serialize;
use tracing::{info, warn};

use khatha_client::api::auth::{CustomerOtpOutcome, CustomerRegistration, RetailerSignup};
use khatha_client::{AppMode, Session};
use khatha_core::CustomerAccount;

use crate::cli::{CustomerAuthCommand, LoginCommand};
use crate::commands::Reply;
use crate::error::{CommandError, CommandResult, ErrorCode};
use crate::state::AppState;
use crate::view;

/// What `whoami` and the login commands report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub mode: AppMode,
    pub logged_in: bool,
    pub retailer_id: Option<i64>,
    pub shop_name: Option<String>,
    pub email: Option<String>,
    pub upi_id: Option<String>,
    pub account: Option<CustomerAccount>,
    pub accounts: usize,
}

impl From<&Session> for WhoAmI {
    fn from(s: &Session) -> Self {
        WhoAmI {
            mode: s.mode,
            logged_in: s.is_logged_in(),
            retailer_id: s.retailer_id,
            shop_name: s.retailer_name.clone(),
            email: s.retailer_email.clone(),
            upi_id: s.upi_id.clone(),
            account: s.selected_account.clone(),
            accounts: s.customer_accounts.len(),
        }
    }
}

fn describe(who: &WhoAmI) -> String {
    if !who.logged_in {
        return format!("Not logged in ({} mode)", who.mode);
    }
    match who.mode {
        AppMode::Retailer => format!(
            "Shop {} (id {}){}",
            who.shop_name.as_deref().unwrap_or("(unnamed)"),
            who.retailer_id.unwrap_or_default(),
            match &who.upi_id {
                Some(upi) => format!(", UPI {}", upi),
                None => ", no UPI id set".to_string(),
            }
        ),
        AppMode::Customer => match &who.account {
            Some(a) => format!(
                "Customer {} at {} (customer id {}, {} shop account(s))",
                a.name.as_deref().unwrap_or("-"),
                a.retailer_name.as_deref().unwrap_or("shop"),
                a.customer_id,
                who.accounts
            ),
            None => "Customer mode, no shop account selected".to_string(),
        },
    }
}

async fn whoami_reply(state: &AppState) -> CommandResult<Reply> {
    let who = WhoAmI::from(&state.session.snapshot().await);
    Reply::new(describe(&who), &who)
}

// =============================================================================
// Retailer
// =============================================================================

pub async fn login(state: &AppState, cmd: LoginCommand) -> CommandResult<Reply> {
    let api = state.api().await?;
    match cmd {
        LoginCommand::SendOtp { email } => {
            let message = api.auth().send_otp(email.trim()).await?;
            Ok(Reply::message(if message.trim().is_empty() {
                format!("Code sent to {}", email.trim())
            } else {
                message
            }))
        }
        LoginCommand::Verify { email, otp } => {
            let login = api.auth().verify_otp(email.trim(), &otp).await?;
            let retailer_id = login
                .retailer_id()
                .ok_or_else(|| CommandError::new(ErrorCode::AuthFailed, "Invalid OTP"))?;
            let display_name = login.display_name().map(str::to_string);
            let email = login.email.clone().or(Some(email.trim().to_string()));

            state
                .session
                .update(|s| {
                    s.login_retailer(retailer_id, login.token.clone(), email);
                    if s.retailer_name.is_none() {
                        s.retailer_name = display_name;
                    }
                })
                .await?;
            state.drafts.clear().await?;

            refresh_profile(state).await;
            whoami_reply(state).await
        }
    }
}

/// Pulls the shop profile into the session. Login still succeeds without it;
/// the counter then just has no UPI id.
pub(crate) async fn refresh_profile(state: &AppState) {
    let profile = match state.api().await {
        Ok(api) => api.retailer().profile().await,
        Err(e) => {
            warn!(error = %e, "Could not build API client for profile");
            return;
        }
    };
    match profile {
        Ok(profile) => {
            if let Err(e) = state.session.update(|s| s.apply_profile(&profile)).await {
                warn!(error = %e, "Could not save shop profile to session");
            }
        }
        Err(e) => warn!(error = %e, "Shop profile not loaded"),
    }
}

pub async fn signup(state: &AppState, email: String, name: String, phone: String) -> CommandResult<Reply> {
    let api = state.api().await?;
    let signup = RetailerSignup {
        email: email.trim().to_string(),
        name: name.trim().to_string(),
        phone: phone.trim().to_string(),
    };
    api.auth().signup(&signup).await?;
    info!(email = %signup.email, "Shop registered");
    Ok(Reply::message(format!(
        "Shop registered. Run `khatha login send-otp {}` to log in.",
        signup.email
    )))
}

// =============================================================================
// Customer
// =============================================================================

pub async fn customer(state: &AppState, cmd: CustomerAuthCommand) -> CommandResult<Reply> {
    match cmd {
        CustomerAuthCommand::SendOtp { email } => {
            let api = state.api().await?;
            let message = api.auth().send_customer_otp(email.trim()).await?;
            Ok(Reply::message(if message.trim().is_empty() {
                format!("Code sent to {}", email.trim())
            } else {
                message
            }))
        }
        CustomerAuthCommand::Verify {
            email,
            otp,
            shop,
            name,
            phone,
        } => {
            let api = state.api().await?;
            let accounts = match api.auth().verify_customer_otp(email.trim(), &otp).await? {
                CustomerOtpOutcome::Accounts(accounts) => accounts,
                CustomerOtpOutcome::NewUser(_) => {
                    let shop = shop.ok_or_else(|| {
                        CommandError::validation(
                            "New customer: pass --shop <id> to register (see `khatha shop shops`)",
                        )
                    })?;
                    let registration =
                        CustomerRegistration::new(email.trim(), name.as_deref(), phone.as_deref(), shop);
                    api.auth().register_customer(&registration).await?
                }
            };
            finish_customer_login(state, accounts).await
        }
        CustomerAuthCommand::Login { phone } => {
            let api = state.api().await?;
            let accounts = api.auth().customer_login(&phone).await?;
            finish_customer_login(state, accounts).await
        }
        CustomerAuthCommand::Shops => {
            let session = state.session.snapshot().await;
            let selected = session.selected_account.as_ref().map(|a| a.retailer_id);
            let rows: Vec<Vec<String>> = session
                .customer_accounts
                .iter()
                .map(|a| {
                    vec![
                        if Some(a.retailer_id) == selected { "*".into() } else { String::new() },
                        a.retailer_id.to_string(),
                        a.retailer_name.clone().unwrap_or_default(),
                        a.customer_id.to_string(),
                    ]
                })
                .collect();
            Reply::new(
                view::table_or_empty(
                    &["", "Shop", "Name", "Customer id"],
                    &rows,
                    "No shop accounts. Run `khatha customer login --phone ...` first.",
                ),
                &session.customer_accounts,
            )
        }
        CustomerAuthCommand::Select { shop } => {
            let account = state
                .session
                .update(|s| s.select_account(shop).cloned())
                .await??;
            Reply::new(
                format!(
                    "Using your account at {}",
                    account.retailer_name.as_deref().unwrap_or("shop")
                ),
                &account,
            )
        }
    }
}

async fn finish_customer_login(state: &AppState, accounts: Vec<CustomerAccount>) -> CommandResult<Reply> {
    if accounts.is_empty() {
        return Err(CommandError::new(ErrorCode::AuthFailed, "No shop accounts for this customer"));
    }
    state.session.update(|s| s.login_customer(accounts, None)).await?;
    whoami_reply(state).await
}

// =============================================================================
// Mode / Logout
// =============================================================================

pub async fn switch_mode(state: &AppState, mode: AppMode) -> CommandResult<Reply> {
    state.session.update(|s| s.switch_mode(mode)).await?;
    whoami_reply(state).await
}

pub async fn logout(state: &AppState) -> CommandResult<Reply> {
    state.session.update(Session::logout).await?;
    state.drafts.clear().await?;
    Ok(Reply::message("Logged out"))
}

pub async fn whoami(state: &AppState) -> CommandResult<Reply> {
    whoami_reply(state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_retailer_without_upi() {
        let mut session = Session::default();
        session.login_retailer(7, None, None);
        session.retailer_name = Some("Sharma Kirana".into());
        let text = describe(&WhoAmI::from(&session));
        assert_eq!(text, "Shop Sharma Kirana (id 7), no UPI id set");
    }

    #[test]
    fn test_describe_logged_out() {
        let text = describe(&WhoAmI::from(&Session::default()));
        assert_eq!(text, "Not logged in (retailer mode)");
    }
}
