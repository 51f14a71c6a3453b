//! # UPI Payment Intent
//!
//! Builds the `upi://pay` link shown (as text or QR) while the cashier waits
//! for a UPI transfer. Nothing is verified: the cashier confirms receipt by
//! hand.

use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Payee name used when the shop has not set one.
pub const DEFAULT_PAYEE_NAME: &str = "Merchant";

/// `upi://pay?pa=<vpa>&pn=<payee>&am=<amount>&cu=INR`
///
/// ## Errors
/// [`CoreError::UpiNotConfigured`] when `upi_id` is blank.
///
/// ```rust
/// use khatha_core::upi::payment_link;
/// use khatha_core::Money;
///
/// let link = payment_link("shop@upi", Some("Ravi Stores"), Money::from_rupees(40)).unwrap();
/// assert!(link.starts_with("upi://pay?pa=shop%40upi"));
/// assert!(link.ends_with("&am=40&cu=INR"));
/// ```
pub fn payment_link(upi_id: &str, payee_name: Option<&str>, amount: Money) -> CoreResult<String> {
    let upi_id = upi_id.trim();
    if upi_id.is_empty() {
        return Err(CoreError::UpiNotConfigured);
    }

    let payee = payee_name
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PAYEE_NAME);

    let mut link = Url::parse("upi://pay").map_err(|_| CoreError::UpiNotConfigured)?;
    link.query_pairs_mut()
        .append_pair("pa", upi_id)
        .append_pair("pn", payee)
        .append_pair("am", &amount.amount().normalize().to_string())
        .append_pair("cu", "INR");

    Ok(link.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(link: &str) -> Vec<(String, String)> {
        Url::parse(link)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_link_fields() {
        let link = payment_link("ravi@okbank", Some("Ravi General Store"), Money::from_rupees(105)).unwrap();
        assert!(link.starts_with("upi://pay?"));
        assert_eq!(
            query(&link),
            vec![
                ("pa".to_string(), "ravi@okbank".to_string()),
                ("pn".to_string(), "Ravi General Store".to_string()),
                ("am".to_string(), "105".to_string()),
                ("cu".to_string(), "INR".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_payee() {
        let link = payment_link("ravi@okbank", Some("  "), Money::from_rupees(1)).unwrap();
        assert!(query(&link).contains(&("pn".to_string(), "Merchant".to_string())));
    }

    #[test]
    fn test_missing_upi_id() {
        assert_eq!(
            payment_link("", None, Money::from_rupees(1)),
            Err(CoreError::UpiNotConfigured)
        );
    }
}
