//! Read-only sales aggregations.
//!
//! These back the dashboard, report, and statistics screens of an embedding
//! application. They are pure functions over a slice of committed
//! transactions; fetch the slice with
//! [`CheckoutEngine::transactions`](crate::CheckoutEngine::transactions) or
//! [`transactions_between`](crate::CheckoutEngine::transactions_between)
//! and aggregate from there.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use kasir_core::actor::ActorId;
use serde::Serialize;

use crate::transaction::Transaction;

/// Headline figures over a set of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Number of committed transactions.
    pub transaction_count: usize,
    /// Sum of transaction totals.
    pub gross_revenue: i64,
    /// Revenue minus the cost-price share of every sold line.
    pub gross_profit: i64,
}

/// Per-cashier revenue figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashierRevenue {
    /// The cashier.
    pub cashier: ActorId,
    /// Transactions rung up by this cashier.
    pub transaction_count: usize,
    /// Revenue across those transactions.
    pub gross_revenue: i64,
}

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRevenue {
    /// The day (UTC).
    pub day: NaiveDate,
    /// Transactions committed that day.
    pub transaction_count: usize,
    /// Revenue committed that day.
    pub gross_revenue: i64,
}

/// Units sold for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Total units sold across all transactions.
    pub units_sold: u64,
}

/// Computes the headline figures for `transactions`.
#[must_use]
pub fn sales_summary(transactions: &[Transaction]) -> SalesSummary {
    let gross_revenue = transactions.iter().map(|t| t.total).sum();
    let gross_profit = transactions
        .iter()
        .flat_map(|t| &t.lines)
        .map(|l| (l.unit_price - l.cost_price) * i64::from(l.quantity))
        .sum();
    SalesSummary {
        transaction_count: transactions.len(),
        gross_revenue,
        gross_profit,
    }
}

/// Revenue per cashier, highest revenue first (ties by cashier id).
#[must_use]
pub fn revenue_by_cashier(transactions: &[Transaction]) -> Vec<CashierRevenue> {
    let mut by_cashier: BTreeMap<&ActorId, (usize, i64)> = BTreeMap::new();
    for t in transactions {
        let entry = by_cashier.entry(&t.cashier).or_default();
        entry.0 += 1;
        entry.1 += t.total;
    }
    let mut rows: Vec<CashierRevenue> = by_cashier
        .into_iter()
        .map(|(cashier, (transaction_count, gross_revenue))| CashierRevenue {
            cashier: cashier.clone(),
            transaction_count,
            gross_revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.gross_revenue.cmp(&a.gross_revenue));
    rows
}

/// Revenue per calendar day, chronological.
#[must_use]
pub fn daily_revenue(transactions: &[Transaction]) -> Vec<DailyRevenue> {
    let mut by_day: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();
    for t in transactions {
        let entry = by_day.entry(t.committed_at.date_naive()).or_default();
        entry.0 += 1;
        entry.1 += t.total;
    }
    by_day
        .into_iter()
        .map(|(day, (transaction_count, gross_revenue))| DailyRevenue {
            day,
            transaction_count,
            gross_revenue,
        })
        .collect()
}

/// The `limit` best-selling products by units sold, descending
/// (ties by product key).
#[must_use]
pub fn top_products(transactions: &[Transaction], limit: usize) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for line in transactions.iter().flat_map(|t| &t.lines) {
        *by_product
            .entry((line.name.as_str(), line.category.as_str()))
            .or_default() += u64::from(line.quantity);
    }
    let mut rows: Vec<ProductSales> = by_product
        .into_iter()
        .map(|((name, category), units_sold)| ProductSales {
            name: name.to_owned(),
            category: category.to_owned(),
            units_sold,
        })
        .collect();
    rows.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use kasir_cart::CartLine;
    use uuid::Uuid;

    use crate::transaction::PaymentMethod;

    use super::*;

    fn line(name: &str, quantity: u32, unit_price: i64, cost_price: i64) -> CartLine {
        CartLine {
            name: name.to_owned(),
            category: "Stationery".to_owned(),
            quantity,
            unit_price,
            cost_price,
            subtotal: unit_price * i64::from(quantity),
        }
    }

    fn transaction(cashier: &str, day: u32, lines: Vec<CartLine>) -> Transaction {
        let total = lines.iter().map(|l| l.subtotal).sum();
        Transaction {
            id: Uuid::new_v4(),
            committed_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            cashier: ActorId::new(cashier),
            lines,
            total,
            amount_paid: total,
            change_due: 0,
            method: PaymentMethod::QrisTransfer,
        }
    }

    #[test]
    fn test_sales_summary_totals_revenue_and_profit() {
        let transactions = vec![
            transaction("budi", 10, vec![line("Pen", 4, 2_000, 1_200)]),
            transaction("sari", 11, vec![line("Eraser", 2, 1_000, 400)]),
        ];

        let summary = sales_summary(&transactions);

        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.gross_revenue, 8_000 + 2_000);
        assert_eq!(summary.gross_profit, 4 * 800 + 2 * 600);
    }

    #[test]
    fn test_sales_summary_of_nothing_is_zero() {
        let summary = sales_summary(&[]);

        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.gross_revenue, 0);
        assert_eq!(summary.gross_profit, 0);
    }

    #[test]
    fn test_revenue_by_cashier_sorts_by_revenue_descending() {
        let transactions = vec![
            transaction("budi", 10, vec![line("Pen", 1, 2_000, 1_200)]),
            transaction("sari", 10, vec![line("Pen", 10, 2_000, 1_200)]),
            transaction("budi", 11, vec![line("Pen", 2, 2_000, 1_200)]),
        ];

        let rows = revenue_by_cashier(&transactions);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cashier, ActorId::new("sari"));
        assert_eq!(rows[0].gross_revenue, 20_000);
        assert_eq!(rows[0].transaction_count, 1);
        assert_eq!(rows[1].cashier, ActorId::new("budi"));
        assert_eq!(rows[1].gross_revenue, 6_000);
        assert_eq!(rows[1].transaction_count, 2);
    }

    #[test]
    fn test_daily_revenue_groups_chronologically() {
        let transactions = vec![
            transaction("budi", 12, vec![line("Pen", 1, 2_000, 1_200)]),
            transaction("budi", 10, vec![line("Pen", 2, 2_000, 1_200)]),
            transaction("sari", 12, vec![line("Pen", 3, 2_000, 1_200)]),
        ];

        let rows = daily_revenue(&transactions);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day, NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
        assert_eq!(rows[0].gross_revenue, 4_000);
        assert_eq!(rows[1].day, NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(rows[1].gross_revenue, 8_000);
        assert_eq!(rows[1].transaction_count, 2);
    }

    #[test]
    fn test_top_products_ranks_by_units_sold_and_truncates() {
        let transactions = vec![
            transaction(
                "budi",
                10,
                vec![line("Pen", 4, 2_000, 1_200), line("Eraser", 1, 1_000, 400)],
            ),
            transaction("sari", 11, vec![line("Eraser", 9, 1_000, 400)]),
            transaction("sari", 12, vec![line("Ruler", 2, 3_000, 2_000)]),
        ];

        let rows = top_products(&transactions, 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Eraser");
        assert_eq!(rows[0].units_sold, 10);
        assert_eq!(rows[1].name, "Pen");
        assert_eq!(rows[1].units_sold, 4);
    }
}
