//! # Khatha Terminal Library
//!
//! Everything behind the `khatha` binary. `main.rs` only parses the command
//! line and prints; the dispatch lives here so tests can drive commands
//! against an in-memory [`AppState`].
//!
//! ## Module Organization
//! ```text
//! khatha_terminal/
//! ├── lib.rs          ◄─── You are here (tracing setup, dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (config + session + drafts)
//! │   ├── cart.rs     ◄─── Draft counter sale and marketplace cart
//! │   └── config.rs   ◄─── Loaded config, `config set` write-back
//! ├── commands/       ◄─── One module per command group
//! ├── prompt.rs       ◄─── Cashier prompts (stdin or scripted)
//! ├── view.rs         ◄─── Plain-text tables and receipts
//! └── error.rs        ◄─── CommandError with exit codes
//! ```
//!
//! ## One Invocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cli::parse ──► init_tracing ──► run(cli, prompt)                       │
//! │                                      │                                  │
//! │                     config command?  │                                  │
//! │                 ┌────────yes─────────┴────────no──────────┐             │
//! │                 ▼                                         ▼             │
//! │        ConfigState::load                          AppState::load        │
//! │        (session untouched)                        (config, session,     │
//! │                 │                                  cart drafts)         │
//! │                 └──────────────┬──────────────────────────┘             │
//! │                                ▼                                        │
//! │                     dispatch ──► Reply / CommandError                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod prompt;
pub mod state;
pub mod view;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use commands::Reply;
use error::CommandResult;
use prompt::Prompt;
use state::{AppState, ConfigState};

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so that `--json` output on stdout stays parseable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=khatha_client=trace` - Trace HTTP calls only
/// - Default: INFO, DEBUG for khatha crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,khatha=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads what the command needs from disk and runs it.
pub async fn run(cli: Cli, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    if let Command::Config(cmd) = cli.command {
        let mut config = ConfigState::load(cli.config)?;
        return commands::config::run(&mut config, cmd);
    }

    let mut state = AppState::load(cli.config).await?;
    dispatch(&mut state, cli.command, prompt).await
}

/// Routes one parsed command to its handler.
pub async fn dispatch(state: &mut AppState, command: Command, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    match command {
        // === Session ===
        Command::Login(cmd) => commands::auth::login(state, cmd).await,
        Command::Signup { email, name, phone } => commands::auth::signup(state, email, name, phone).await,
        Command::Customer(cmd) => commands::auth::customer(state, cmd).await,
        Command::Mode { mode } => commands::auth::switch_mode(state, mode).await,
        Command::Logout => commands::auth::logout(state).await,
        Command::Whoami => commands::auth::whoami(state).await,

        // === Counter ===
        Command::Cart(cmd) => commands::cart::run(state, cmd).await,
        Command::Bill(args) => commands::billing::run(state, args, prompt).await,

        // === Shop records ===
        Command::Bills(cmd) => commands::bills::run(state, cmd).await,
        Command::Customers(cmd) => commands::customers::run(state, cmd, prompt).await,
        Command::Products(cmd) => commands::products::run(state, cmd, prompt).await,
        Command::Orders(cmd) => commands::orders::run(state, cmd).await,

        // === Marketplace ===
        Command::Shop(cmd) => commands::market::run(state, cmd, prompt).await,

        // === Back office ===
        Command::Suppliers(cmd) => commands::suppliers::run(state, cmd, prompt).await,
        Command::Staff(cmd) => commands::staff::run(state, cmd, prompt).await,
        Command::Dashboard => commands::dashboard::run(state).await,

        // === Settings ===
        Command::Profile(cmd) => commands::profile::run(state, cmd).await,
        Command::Config(cmd) => commands::config::run(&mut state.config, cmd),
    }
}
