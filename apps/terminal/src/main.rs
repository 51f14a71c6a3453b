//! # Khatha Terminal Entry Point
//!
//! ```text
//! $ khatha cart add 8901234
//! $ khatha cart customer 12
//! $ khatha cart mode khatha
//! $ khatha bill
//! Bill INV-1042 saved
//! ...
//! ```
//!
//! The commands live in the library half (`khatha_terminal`); this file
//! parses arguments, prints the reply and turns errors into exit codes.

use std::io::Write;

use anyhow::Context;
use clap::Parser;

use khatha_terminal::cli::Cli;
use khatha_terminal::prompt::StdinPrompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    khatha_terminal::init_tracing();

    let json = cli.json;
    let mut prompt = StdinPrompt;

    match khatha_terminal::run(cli, &mut prompt).await {
        Ok(reply) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", reply.render(json)).context("failed to write output")?;
            Ok(())
        }
        Err(err) => {
            if json {
                let body = serde_json::to_string_pretty(&err).context("failed to encode error")?;
                writeln!(std::io::stdout().lock(), "{}", body).context("failed to write output")?;
            } else {
                writeln!(std::io::stderr().lock(), "error{}", err).context("failed to write error")?;
            }
            std::process::exit(err.code.exit_code());
        }
    }
}
