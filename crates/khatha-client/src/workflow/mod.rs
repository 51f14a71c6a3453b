//! # Workflows
//!
//! Multi-step user actions that combine khatha-core rules with API calls.

pub mod billing;
pub mod dashboard;
pub mod ledger;
pub mod orders;

pub use billing::{BillingWorkflow, SavedBill, SubmitOutcome};
pub use dashboard::load_dashboard;
pub use ledger::{BillImage, CustomerLedger, LedgerWorkflow, SavedEntry};
pub use orders::{place_orders, PlacedOrders};
