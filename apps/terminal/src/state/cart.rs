//! # Cart Drafts
//!
//! The terminal exits after every command, so the sale being built has to
//! live on disk between `khatha cart add` and `khatha bill`.
//!
//! ```text
//! cart.json
//! {
//!   "counter":     { cart, paymentMode, customer, requestedRedeem, ... },
//!   "marketplace": { lines: [...] }
//! }
//! ```
//!
//! The counter draft restores into a [`CheckoutSession`]; the marketplace
//! cart is a plain [`Cart`] whose lines carry their own retailer.
//! A missing file reads as two empty carts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use khatha_core::cart::Cart;
use khatha_core::checkout::{CheckoutDraft, CheckoutSession};
use khatha_core::GstRate;

use crate::error::CommandResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drafts {
    #[serde(default)]
    pub counter: CheckoutDraft,
    #[serde(default)]
    pub marketplace: Cart,
}

/// File-backed drafts; in-memory when no path is set.
#[derive(Debug)]
pub struct DraftStore {
    path: Option<PathBuf>,
    drafts: tokio::sync::Mutex<Drafts>,
}

impl DraftStore {
    pub fn in_memory() -> Self {
        DraftStore {
            path: None,
            drafts: tokio::sync::Mutex::new(Drafts::default()),
        }
    }

    pub async fn load(path: Option<PathBuf>) -> CommandResult<Self> {
        let drafts = match path {
            Some(ref p) if p.exists() => {
                debug!(path = ?p, "Loading cart drafts");
                let contents = tokio::fs::read_to_string(p).await?;
                serde_json::from_str(&contents)?
            }
            _ => Drafts::default(),
        };
        Ok(DraftStore {
            path,
            drafts: tokio::sync::Mutex::new(drafts),
        })
    }

    /// The counter sale, restored with the current GST rate and mode.
    pub async fn checkout(&self, gst_rate: GstRate, quick_mode: bool) -> CheckoutSession {
        let mut draft = self.drafts.lock().await.counter.clone();
        draft.quick_mode = quick_mode;
        CheckoutSession::from_draft(draft, gst_rate)
    }

    pub async fn save_checkout(&self, checkout: &CheckoutSession) -> CommandResult<()> {
        let snapshot = {
            let mut drafts = self.drafts.lock().await;
            drafts.counter = checkout.to_draft();
            drafts.clone()
        };
        self.persist(&snapshot).await
    }

    pub async fn marketplace(&self) -> Cart {
        self.drafts.lock().await.marketplace.clone()
    }

    pub async fn save_marketplace(&self, cart: &Cart) -> CommandResult<()> {
        let snapshot = {
            let mut drafts = self.drafts.lock().await;
            drafts.marketplace = cart.clone();
            drafts.clone()
        };
        self.persist(&snapshot).await
    }

    /// Both carts emptied (on logout or mode switch).
    pub async fn clear(&self) -> CommandResult<()> {
        let snapshot = {
            let mut drafts = self.drafts.lock().await;
            *drafts = Drafts::default();
            drafts.clone()
        };
        self.persist(&snapshot).await
    }

    async fn persist(&self, drafts: &Drafts) -> CommandResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(drafts)?;
        tokio::fs::write(path, contents).await?;
        debug!(path = ?path, "Cart drafts saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khatha_core::{Money, PaymentMode, Product, ProductType};

    fn product(id: i64) -> Product {
        Product {
            id,
            name: format!("P{}", id),
            barcode: format!("B{}", id),
            price: Money::from_rupees(20),
            quantity: 4,
            product_type: ProductType::Unit,
            category: None,
            image_url: None,
            retailer_id: Some(3),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("khatha-drafts-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_counter_draft_survives_reload() {
        let path = temp_path("counter");
        let store = DraftStore::load(Some(path.clone())).await.unwrap();

        let mut checkout = store.checkout(GstRate::from_percent(5), false).await;
        checkout.add_product(&product(1)).unwrap();
        checkout.add_product(&product(1)).unwrap();
        checkout.select_payment_mode(PaymentMode::Khatha);
        store.save_checkout(&checkout).await.unwrap();

        let reloaded = DraftStore::load(Some(path.clone())).await.unwrap();
        let restored = reloaded.checkout(GstRate::from_percent(5), false).await;
        assert_eq!(restored.cart().quantity_of(1), 2);
        assert_eq!(restored.payment_mode(), PaymentMode::Khatha);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_marketplace_cart_is_separate() {
        let store = DraftStore::in_memory();
        let mut cart = store.marketplace().await;
        cart.add_product(&product(2)).unwrap();
        store.save_marketplace(&cart).await.unwrap();

        assert_eq!(store.marketplace().await.quantity_of(2), 1);
        assert!(store.checkout(GstRate::default(), false).await.cart().is_empty());

        store.clear().await.unwrap();
        assert!(store.marketplace().await.is_empty());
    }

    #[tokio::test]
    async fn test_quick_mode_follows_config() {
        let store = DraftStore::in_memory();
        assert!(store.checkout(GstRate::default(), true).await.is_quick_mode());
    }
}
