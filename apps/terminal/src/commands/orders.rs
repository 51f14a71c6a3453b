//! # Order Commands (shop side)
//!
//! ```text
//! PENDING ──► PACKED ──► DELIVERED (customer's OTP)
//!    │
//!    └──► CANCELLED
//! ```

use khatha_core::Order;

use crate::cli::OrdersCommand;
use crate::commands::{retailer_api, Reply};
use crate::error::CommandResult;
use crate::state::AppState;
use crate::view;

pub async fn run(state: &AppState, cmd: OrdersCommand) -> CommandResult<Reply> {
    let (api, retailer_id) = retailer_api(state).await?;

    match cmd {
        OrdersCommand::List => {
            let mut orders = api.orders().for_retailer(retailer_id).await?;
            newest_first(&mut orders);
            Reply::new(render_table(&orders, Party::Customer), &orders)
        }
        OrdersCommand::Status { id, status, otp } => {
            api.orders().update_status(id, status, otp.as_deref()).await?;
            Reply::new(
                format!("Order {} is now {}", id, status),
                &serde_json::json!({ "orderId": id, "status": status }),
            )
        }
    }
}

pub(crate) fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()).then(b.id.cmp(&a.id)));
}

/// Which side of the order the table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Party {
    Customer,
    Shop,
}

pub(crate) fn render_table(orders: &[Order], party: Party) -> String {
    let rows: Vec<Vec<String>> = orders
        .iter()
        .map(|o| {
            let who = match party {
                Party::Customer => o
                    .customer_name
                    .clone()
                    .or_else(|| o.customer_phone.clone())
                    .unwrap_or_else(|| o.customer_id.map(|id| format!("#{}", id)).unwrap_or_default()),
                Party::Shop => o
                    .retailer_name
                    .clone()
                    .unwrap_or_else(|| o.retailer_id.map(|id| format!("#{}", id)).unwrap_or_default()),
            };
            vec![
                o.id.to_string(),
                o.order_date
                    .as_deref()
                    .map(|d| d.chars().take(10).collect())
                    .unwrap_or_default(),
                who,
                o.item_count().to_string(),
                o.total_amount.to_string(),
                o.payment_mode.map(|m| m.to_string()).unwrap_or_default(),
                o.status.to_string(),
            ]
        })
        .collect();

    let who = match party {
        Party::Customer => "Customer",
        Party::Shop => "Shop",
    };
    view::table_or_empty(
        &["Id", "Date", who, "Items", "Total", "Pay", "Status"],
        &rows,
        "No orders yet",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use khatha_core::{Money, OrderPaymentMode, OrderStatus};

    fn order(id: i64, date: &str) -> Order {
        Order {
            id,
            retailer_id: Some(1),
            customer_id: Some(55),
            items: Some(r#"[{"name":"Tea","qty":2,"price":10}]"#.into()),
            total_amount: Money::from_rupees(20),
            payment_mode: Some(OrderPaymentMode::Cod),
            status: OrderStatus::Pending,
            order_date: Some(date.into()),
            customer_name: None,
            customer_phone: Some("9876543210".into()),
            retailer_name: Some("Sharma Kirana".into()),
        }
    }

    #[test]
    fn test_newest_first() {
        let mut orders = vec![order(1, "2024-05-01T09:00:00"), order(2, "2024-05-03T09:00:00")];
        newest_first(&mut orders);
        assert_eq!(orders[0].id, 2);
    }

    #[test]
    fn test_table_names_the_other_party() {
        let orders = vec![order(1, "2024-05-01T09:00:00")];
        let shop_view = render_table(&orders, Party::Customer);
        assert!(shop_view.contains("9876543210"));
        assert!(shop_view.contains("PENDING"));

        let customer_view = render_table(&orders, Party::Shop);
        assert!(customer_view.contains("Sharma Kirana"));
        assert!(customer_view.lines().nth(2).unwrap().contains("  2  "));
    }
}
