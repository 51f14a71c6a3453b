//! # Dashboard Command
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  To collect    ₹4500.00        Today's sales   ₹1200.00                 │
//! │  Pending orders 3                                                       │
//! │                                                                         │
//! │  Top dues        Ramesh ₹2500.00, Sita ₹900.00                          │
//! │  Low stock       Salt (1), Tea (3)                                      │
//! │  Next orders     #41 ₹250.00, #42 ₹80.00                                │
//! │                                                                         │
//! │  2024-04  ₹18000.00                                                     │
//! │  2024-05  ₹21000.00                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Local;

use khatha_client::workflow::load_dashboard;
use khatha_core::dashboard::DashboardSummary;

use crate::commands::{retailer_api, Reply};
use crate::error::CommandResult;
use crate::state::AppState;

pub async fn run(state: &AppState) -> CommandResult<Reply> {
    let (api, _) = retailer_api(state).await?;
    let summary = load_dashboard(&api, Local::now().date_naive()).await?;
    Reply::new(render(&summary), &summary)
}

fn or_none(items: Vec<String>) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn render(d: &DashboardSummary) -> String {
    let debtors = d
        .top_debtors
        .iter()
        .map(|c| format!("{} {}", c.name, c.due_amount))
        .collect();
    let stock = d
        .lowest_stock
        .iter()
        .map(|p| format!("{} ({})", p.name, p.quantity))
        .collect();
    let orders = d
        .next_pending_orders
        .iter()
        .map(|o| format!("#{} {}", o.id, o.total_amount))
        .collect();

    let mut out = vec![
        format!("To collect      {}", d.total_due),
        format!("Today's sales   {}", d.todays_sales),
        format!("Pending orders  {}", d.pending_orders),
        String::new(),
        format!("Top dues        {}", or_none(debtors)),
        format!("Low stock       {}", or_none(stock)),
        format!("Next orders     {}", or_none(orders)),
    ];
    if !d.monthly_billing.is_empty() {
        out.push(String::new());
        for m in &d.monthly_billing {
            out.push(format!("{}-{:02}  {}", m.year, m.month, m.amount));
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use khatha_core::dashboard::MonthlyTotal;
    use khatha_core::Money;

    #[test]
    fn test_empty_shop() {
        let summary = DashboardSummary {
            total_due: Money::zero(),
            todays_sales: Money::zero(),
            pending_orders: 0,
            top_debtors: vec![],
            lowest_stock: vec![],
            next_pending_orders: vec![],
            monthly_billing: vec![],
        };
        let text = render(&summary);
        assert!(text.contains("Top dues        none"));
        assert!(text.ends_with("Next orders     none"));
    }

    #[test]
    fn test_monthly_lines() {
        let summary = DashboardSummary {
            total_due: Money::from_rupees(450),
            todays_sales: Money::from_rupees(120),
            pending_orders: 1,
            top_debtors: vec![],
            lowest_stock: vec![],
            next_pending_orders: vec![],
            monthly_billing: vec![MonthlyTotal {
                year: 2024,
                month: 5,
                amount: Money::from_rupees(21000),
            }],
        };
        let text = render(&summary);
        assert!(text.starts_with("To collect      ₹450.00"));
        assert!(text.ends_with("2024-05  ₹21000.00"));
    }
}
