//! # State Module
//!
//! Everything a command needs besides its arguments.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │ ConfigState  │  │ SessionStore │  │   DraftStore     │              │
//! │  │              │  │              │  │                  │              │
//! │  │ base URL     │  │ retailer id  │  │ counter sale     │              │
//! │  │ GST, quick   │  │ token, UPI   │  │ marketplace cart │              │
//! │  │ retry        │  │ accounts     │  │                  │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │     config.toml      session.json        cart.json                     │
//! │                                                                         │
//! │  AppState::api() builds a KhathaApi from config + current session      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;

use std::path::PathBuf;

pub use cart::{DraftStore, Drafts};
pub use config::{ConfigChange, ConfigState, ConfigView};

use khatha_client::{ClientConfig, KhathaApi, Session, SessionStore};

use crate::error::CommandResult;

pub struct AppState {
    pub config: ConfigState,
    pub session: SessionStore,
    pub drafts: DraftStore,
}

impl AppState {
    /// Loads config, then the session and drafts from the paths it names.
    pub async fn load(config_path: Option<PathBuf>) -> CommandResult<Self> {
        let config = ConfigState::load(config_path)?;
        let session = SessionStore::load(config.config.session_path()).await?;
        let drafts = DraftStore::load(config.config.cart_path()).await?;
        Ok(AppState {
            config,
            session,
            drafts,
        })
    }

    /// Nothing touches disk. Used by tests.
    pub fn in_memory(config: ClientConfig, session: Session) -> Self {
        AppState {
            config: ConfigState::from_config(config),
            session: SessionStore::new(session),
            drafts: DraftStore::in_memory(),
        }
    }

    /// API client scoped to the current session.
    pub async fn api(&self) -> CommandResult<KhathaApi> {
        let session = self.session.snapshot().await;
        Ok(KhathaApi::for_session(&self.config.config, &session)?)
    }
}
