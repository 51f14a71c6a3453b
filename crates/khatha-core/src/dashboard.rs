//! # Dashboard
//!
//! Shop overview computed from already-fetched lists.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::money::Money;
use crate::types::{Bill, BillType, Customer, Order, OrderStatus, Product};

/// How many entries each "top" list shows.
pub const TOP_N: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Σ customer due.
    pub total_due: Money,
    /// Σ amount of SALE/GAVE bills dated `today`.
    pub todays_sales: Money,
    pub pending_orders: usize,
    pub top_debtors: Vec<Customer>,
    pub lowest_stock: Vec<Product>,
    pub next_pending_orders: Vec<Order>,
    /// (year, month) → Σ bill amount, oldest first.
    pub monthly_billing: Vec<MonthlyTotal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub amount: Money,
}

impl DashboardSummary {
    pub fn build(
        today: NaiveDate,
        customers: &[Customer],
        products: &[Product],
        bills: &[Bill],
        orders: &[Order],
    ) -> Self {
        let total_due = customers.iter().map(|c| c.due_amount).sum();

        let is_sale = |b: &&Bill| matches!(b.bill_type, BillType::Sale | BillType::Gave);
        let todays_sales = bills
            .iter()
            .filter(is_sale)
            .filter(|b| b.timestamp().map(|t| t.date()) == Some(today))
            .map(|b| b.amount)
            .sum();

        let mut top_debtors: Vec<Customer> = customers
            .iter()
            .filter(|c| c.due_amount.is_positive())
            .cloned()
            .collect();
        top_debtors.sort_by(|a, b| b.due_amount.cmp(&a.due_amount));
        top_debtors.truncate(TOP_N);

        let mut lowest_stock = products.to_vec();
        lowest_stock.sort_by_key(|p| p.quantity);
        lowest_stock.truncate(TOP_N);

        let pending: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .collect();
        let pending_orders = pending.len();
        let next_pending_orders = pending.into_iter().take(TOP_N).cloned().collect();

        let mut by_month: BTreeMap<(i32, u32), Money> = BTreeMap::new();
        for bill in bills.iter().filter(is_sale) {
            if let Some(ts) = bill.timestamp() {
                *by_month.entry((ts.year(), ts.month())).or_default() += bill.amount;
            }
        }
        let monthly_billing = by_month
            .into_iter()
            .map(|((year, month), amount)| MonthlyTotal { year, month, amount })
            .collect();

        DashboardSummary {
            total_due,
            todays_sales,
            pending_orders,
            top_debtors,
            lowest_stock,
            next_pending_orders,
            monthly_billing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductType;

    fn customer(id: i64, due: i64) -> Customer {
        Customer {
            id,
            name: format!("C{}", id),
            phone: String::new(),
            email: None,
            loyalty_points: 0,
            due_amount: Money::from_rupees(due),
            scheme_monthly_amount: None,
            scheme_target_amount: None,
            scheme_collected_amount: None,
        }
    }

    fn product(id: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("P{}", id),
            barcode: String::new(),
            price: Money::from_rupees(1),
            quantity: stock,
            product_type: ProductType::Unit,
            category: None,
            image_url: None,
            retailer_id: None,
        }
    }

    fn bill(id: i64, kind: BillType, amount: i64, date: &str) -> Bill {
        Bill {
            id,
            bill_number: None,
            bill_type: kind,
            amount: Money::from_rupees(amount),
            paid_amount: Money::zero(),
            due_amount: Money::zero(),
            payment_mode: None,
            items: None,
            status: None,
            bill_date: Some(date.to_string()),
            created_at: None,
            image_url: None,
            loyalty_points_used: None,
            customer: None,
        }
    }

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id,
            retailer_id: Some(1),
            customer_id: Some(1),
            items: None,
            total_amount: Money::from_rupees(10),
            payment_mode: None,
            status,
            order_date: None,
            customer_name: None,
            customer_phone: None,
            retailer_name: None,
        }
    }

    #[test]
    fn test_summary() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let customers = vec![customer(1, 100), customer(2, 0), customer(3, 400), customer(4, 50)];
        let products = vec![product(1, 20), product(2, 1), product(3, 0)];
        let bills = vec![
            bill(1, BillType::Sale, 105, "2024-05-10T09:00:00"),
            bill(2, BillType::Gave, 40, "2024-05-10"),
            bill(3, BillType::Received, 500, "2024-05-10"),
            bill(4, BillType::Sale, 70, "2024-04-02"),
        ];
        let orders = vec![
            order(1, OrderStatus::Delivered),
            order(2, OrderStatus::Pending),
            order(3, OrderStatus::Pending),
            order(4, OrderStatus::Pending),
        ];

        let s = DashboardSummary::build(today, &customers, &products, &bills, &orders);

        assert_eq!(s.total_due, Money::from_rupees(550));
        assert_eq!(s.todays_sales, Money::from_rupees(145));
        assert_eq!(s.pending_orders, 3);
        assert_eq!(s.top_debtors.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(s.lowest_stock.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(s.next_pending_orders.len(), 2);
        assert_eq!(
            s.monthly_billing,
            vec![
                MonthlyTotal { year: 2024, month: 4, amount: Money::from_rupees(70) },
                MonthlyTotal { year: 2024, month: 5, amount: Money::from_rupees(145) },
            ]
        );
    }
}
