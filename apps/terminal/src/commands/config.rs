//! # Config Commands
//!
//! `config show` prints the effective settings (file plus `KHATHA_*`
//! overrides). `config set` validates one change and writes the file.

use std::str::FromStr;

use crate::cli::{ConfigCommand, ConfigKey};
use crate::commands::Reply;
use crate::error::{CommandError, CommandResult};
use crate::state::{ConfigChange, ConfigState, ConfigView};

pub fn run(config: &mut ConfigState, cmd: ConfigCommand) -> CommandResult<Reply> {
    match cmd {
        ConfigCommand::Show => {
            let view = config.view();
            Reply::new(render(&view), &view)
        }
        ConfigCommand::Set { key, value } => {
            let change = parse_change(key, &value)?;
            config.apply(change)?;
            let view = config.view();
            Reply::new(format!("Saved\n\n{}", render(&view)), &view)
        }
    }
}

fn parse_change(key: ConfigKey, value: &str) -> CommandResult<ConfigChange> {
    let value = value.trim();
    Ok(match key {
        ConfigKey::ApiUrl => ConfigChange::ApiUrl(value.to_string()),
        ConfigKey::Timeout => ConfigChange::TimeoutSecs(number(value, "timeout")?),
        ConfigKey::Gst => ConfigChange::GstPercent(number(value.trim_end_matches('%'), "GST percent")?),
        ConfigKey::QuickMode => ConfigChange::QuickMode(switch(value)?),
        ConfigKey::Retries => ConfigChange::MaxRetries(number(value, "retries")?),
    })
}

fn number<T: FromStr>(value: &str, what: &str) -> CommandResult<T> {
    value
        .parse()
        .map_err(|_| CommandError::validation(format!("{} must be a whole number, got '{}'", what, value)))
}

fn switch(value: &str) -> CommandResult<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CommandError::validation(format!("Expected on or off, got '{}'", value))),
    }
}

fn render(v: &ConfigView) -> String {
    let path = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not saved)".to_string())
    };
    [
        format!("api-url     {}", v.api_url),
        format!("timeout     {}s", v.timeout_secs),
        format!("gst         {}%", v.gst_percent),
        format!("quick-mode  {}", if v.quick_mode { "on" } else { "off" }),
        format!("retries     {}", v.max_retries),
        format!("session     {}", path(&v.session_file)),
        format!("cart        {}", path(&v.cart_file)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_change(ConfigKey::Gst, "12%").unwrap(), ConfigChange::GstPercent(12));
        assert_eq!(parse_change(ConfigKey::QuickMode, "ON").unwrap(), ConfigChange::QuickMode(true));
        assert_eq!(parse_change(ConfigKey::Timeout, " 45 ").unwrap(), ConfigChange::TimeoutSecs(45));

        let err = parse_change(ConfigKey::Retries, "three").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(parse_change(ConfigKey::QuickMode, "maybe").is_err());
    }

    #[test]
    fn test_show_in_memory_config() {
        let mut config = ConfigState::from_config(khatha_client::ClientConfig::default());
        let reply = run(&mut config, ConfigCommand::Show).unwrap();
        assert!(reply.text.contains("gst         5%"));
        assert_eq!(reply.data["gstPercent"], 5);
    }
}
