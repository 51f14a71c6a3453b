//! # Dashboard Loader
//!
//! Fetches the four lists the overview needs side by side and summarises
//! them.

use chrono::NaiveDate;
use futures_util::try_join;
use tracing::debug;

use khatha_core::dashboard::DashboardSummary;

use crate::api::KhathaApi;
use crate::error::ClientResult;

pub async fn load_dashboard(api: &KhathaApi, today: NaiveDate) -> ClientResult<DashboardSummary> {
    let retailer_id = api.http().require_retailer()?;

    let customers = api.customers();
    let products = api.products();
    let bills = api.bills();
    let orders = api.orders();

    let (customers, products, bills, orders) = try_join!(
        customers.list(),
        products.list(),
        bills.list(),
        orders.for_retailer(retailer_id),
    )?;
    debug!(
        customers = customers.len(),
        products = products.len(),
        bills = bills.len(),
        orders = orders.len(),
        "Dashboard data loaded"
    );

    Ok(DashboardSummary::build(today, &customers, &products, &bills, &orders))
}
