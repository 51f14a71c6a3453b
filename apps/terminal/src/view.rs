//! Plain-text rendering shared by the commands.

use khatha_core::bill_items::ReceiptRow;
use khatha_core::pricing::BillTotals;
use khatha_core::Money;

/// Left-aligned columns sized to the widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// `"(none)"` for an empty list, the table otherwise.
pub fn table_or_empty(headers: &[&str], rows: &[Vec<String>], empty: &str) -> String {
    if rows.is_empty() {
        empty.to_string()
    } else {
        table(headers, rows)
    }
}

pub fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

pub fn totals(t: &BillTotals) -> String {
    let mut out = vec![
        format!("Subtotal   {}", t.sub_total),
        format!("GST        {}", t.gst),
    ];
    if t.redeem.is_positive() {
        out.push(format!("Redeemed  -{}", t.redeem));
    }
    out.push(format!("TOTAL      {}", t.total));
    if t.due_amount.is_positive() {
        out.push(format!("Paid now   {}", t.paid_amount));
        out.push(format!("Due        {}", t.due_amount));
    }
    if t.loyalty_points_earned > 0 {
        out.push(format!("Points earned: {}", t.loyalty_points_earned));
    }
    out.join("\n")
}

pub fn receipt(rows: &[ReceiptRow], total: Money) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.name.clone(), r.qty.to_string(), r.unit_price.to_string(), r.amount.to_string()])
        .collect();
    format!("{}\nTOTAL {}", table(&["Item", "Qty", "Price", "Amount"], &body), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let out = table(
            &["Id", "Name"],
            &[vec!["1".into(), "Tea".into()], vec!["22".into(), "Biscuits".into()]],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Id  Name");
        assert_eq!(lines[1], "--  --------");
        assert_eq!(lines[3], "22  Biscuits");
    }

    #[test]
    fn test_totals_hide_due_for_paid_bills() {
        let t = BillTotals {
            sub_total: Money::from_rupees(40),
            gst: Money::from_rupees(2),
            gross_total: Money::from_rupees(42),
            total: Money::from_rupees(42),
            paid_amount: Money::from_rupees(42),
            ..BillTotals::default()
        };
        let out = totals(&t);
        assert!(out.contains("TOTAL      ₹42.00"));
        assert!(!out.contains("Due"));
    }

    #[test]
    fn test_empty_table_message() {
        assert_eq!(table_or_empty(&["Id"], &[], "No customers yet"), "No customers yet");
    }
}
