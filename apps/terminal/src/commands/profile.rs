//! # Profile Commands
//!
//! The shop's own details. The UPI id and payee name set here are what the
//! counter puts into payment links, so a successful `profile set` also
//! refreshes the stored session.

use khatha_core::RetailerProfile;

use crate::cli::ProfileCommand;
use crate::commands::{retailer_api, Reply};
use crate::error::{CommandError, CommandResult};
use crate::state::AppState;
use crate::view;

/// Fields `profile set` may change; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
struct ProfileEdits {
    shop_name: Option<String>,
    upi: Option<String>,
    payee: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

pub async fn run(state: &AppState, cmd: ProfileCommand) -> CommandResult<Reply> {
    let (api, _) = retailer_api(state).await?;

    match cmd {
        ProfileCommand::Show => {
            let profile = api.retailer().profile().await?;
            Reply::new(render(&profile), &profile)
        }
        ProfileCommand::Set {
            shop_name,
            upi,
            payee,
            phone,
            address,
        } => {
            let edits = ProfileEdits {
                shop_name,
                upi,
                payee,
                phone,
                address,
            };
            let mut profile = api.retailer().profile().await?;
            apply(&mut profile, edits)?;

            let updated = api.retailer().update_profile(&profile).await?;
            state.session.update(|s| s.apply_profile(&updated)).await?;
            Reply::new(format!("Profile saved\n\n{}", render(&updated)), &updated)
        }
    }
}

/// Blank values clear a field.
fn apply(profile: &mut RetailerProfile, edits: ProfileEdits) -> CommandResult<()> {
    fn set(field: &mut Option<String>, value: Option<String>) {
        if let Some(v) = value {
            let v = v.trim().to_string();
            *field = if v.is_empty() { None } else { Some(v) };
        }
    }

    if let Some(upi) = edits.upi.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        if !upi.contains('@') || upi.starts_with('@') || upi.ends_with('@') {
            return Err(CommandError::validation(format!(
                "'{}' is not a UPI id (expected name@bank)",
                upi
            )));
        }
    }

    set(&mut profile.shop_name, edits.shop_name);
    set(&mut profile.upi_id, edits.upi);
    set(&mut profile.payee_name, edits.payee);
    set(&mut profile.phone, edits.phone);
    set(&mut profile.address, edits.address);
    Ok(())
}

fn render(p: &RetailerProfile) -> String {
    [
        format!("Shop     {}", view::opt(&p.shop_name.clone().or_else(|| p.name.clone()))),
        format!("Email    {}", view::opt(&p.email)),
        format!("Phone    {}", view::opt(&p.phone)),
        format!("UPI      {}", view::opt(&p.upi_id)),
        format!("Payee    {}", view::opt(&p.payee_name)),
        format!("Address  {}", view::opt(&p.address)),
    ]
    .join("\n")
}
