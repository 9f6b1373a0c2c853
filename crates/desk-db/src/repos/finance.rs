//! Financial summary over sales, paid orders and expenses.
//!
//! Amounts are TEXT columns, so the sums are taken in Rust with `Decimal`
//! rather than with SQL `SUM`, which would go through floating point.

use desk_core::enums::ExpenseCategory;
use desk_core::money::{Decimal, add_amounts, sub_amounts};
use desk_core::responses::FinancialSummary;

use crate::error::DatabaseError;
use crate::helpers::{parse_decimal, parse_enum};
use crate::service::DeskService;

async fn sum_columns(
    conn: &libsql::Connection,
    sql: &str,
    columns: usize,
) -> Result<Vec<Decimal>, DatabaseError> {
    let mut totals = vec![Decimal::ZERO; columns];
    let mut rows = conn.query(sql, ()).await?;
    while let Some(row) = rows.next().await? {
        for (idx, total) in (0_i32..).zip(totals.iter_mut()) {
            let amount = parse_decimal(&row.get::<String>(idx)?)?;
            *total = add_amounts("summary total", *total, amount)?;
        }
    }
    Ok(totals)
}

impl DeskService {
    /// Revenue, expenses and profit over everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails, a stored amount is corrupt,
    /// or a total overflows.
    pub async fn financial_summary(&self) -> Result<FinancialSummary, DatabaseError> {
        let (_read, conn) = self.read().await;

        let pos = sum_columns(conn, "SELECT total_amount, profit FROM transactions", 2).await?;
        let orders =
            sum_columns(conn, "SELECT total_amount FROM orders WHERE is_paid = 1", 1).await?;

        let mut summary = FinancialSummary {
            pos_revenue: pos[0],
            gross_profit: pos[1],
            order_revenue: orders[0],
            ..FinancialSummary::default()
        };

        let mut rows = conn.query("SELECT category, amount FROM expenses", ()).await?;
        while let Some(row) = rows.next().await? {
            let category: ExpenseCategory = parse_enum(&row.get::<String>(0)?)?;
            let amount = parse_decimal(&row.get::<String>(1)?)?;
            summary.total_expenses = add_amounts("total_expenses", summary.total_expenses, amount)?;
            let bucket = summary.expense_breakdown.entry(category).or_default();
            *bucket = add_amounts("expense_breakdown", *bucket, amount)?;
        }

        summary.total_revenue =
            add_amounts("total_revenue", summary.pos_revenue, summary.order_revenue)?;
        summary.net_profit =
            sub_amounts("net_profit", summary.total_revenue, summary.total_expenses)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{dec, seed_product, test_service};
    use crate::updates::order::OrderUpdateBuilder;
    use desk_core::inputs::{
        NewExpense, NewOrder, NewOrderItem, NewTransaction, NewTransactionItem,
    };
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn empty_shop_is_all_zero() {
        let svc = test_service().await;
        let summary = svc.financial_summary().await.unwrap();
        assert_eq!(summary, FinancialSummary::default());
    }

    #[tokio::test]
    async fn summary_combines_sales_paid_orders_and_expenses() {
        let svc = test_service().await;
        let product = seed_product(&svc, "FIN", "100", "60", 50).await;

        svc.create_transaction(
            None,
            &NewTransaction {
                items: vec![NewTransactionItem {
                    product_id: product.id.clone(),
                    quantity: 2,
                    price: dec("100"),
                    ..NewTransactionItem::default()
                }],
                total_amount: dec("200"),
                payment_method: "upi".into(),
                ..NewTransaction::default()
            },
        )
        .await
        .unwrap();

        let order_input = |total: &str| NewOrder {
            customer_name: "Kiran".into(),
            customer_phone: "9000000001".into(),
            items: vec![NewOrderItem {
                product_id: product.id.clone(),
                quantity: 1,
                price: dec(total),
                ..NewOrderItem::default()
            }],
            total_amount: dec(total),
            ..NewOrder::default()
        };
        let paid = svc.create_order(None, &order_input("500")).await.unwrap();
        svc.update_order(None, &paid.id, &OrderUpdateBuilder::new().is_paid(true).build())
            .await
            .unwrap();
        svc.create_order(None, &order_input("999")).await.unwrap();

        for (title, amount, category) in [
            ("Rent", "300", ExpenseCategory::Rent),
            ("Power", "50.25", ExpenseCategory::Utilities),
            ("Water", "10", ExpenseCategory::Utilities),
        ] {
            svc.create_expense(
                None,
                &NewExpense {
                    title: title.into(),
                    amount: dec(amount),
                    category,
                    ..NewExpense::default()
                },
            )
            .await
            .unwrap();
        }

        let summary = svc.financial_summary().await.unwrap();
        assert_eq!(summary.pos_revenue, dec("200"));
        assert_eq!(summary.gross_profit, dec("80"));
        assert_eq!(summary.order_revenue, dec("500"));
        assert_eq!(summary.total_revenue, dec("700"));
        assert_eq!(summary.total_expenses, dec("360.25"));
        assert_eq!(summary.net_profit, dec("339.75"));
        assert_eq!(
            summary.expense_breakdown.get(&ExpenseCategory::Utilities),
            Some(&dec("60.25"))
        );
        assert_eq!(summary.expense_breakdown.len(), 2);
    }

    #[tokio::test]
    async fn overflowing_totals_are_an_error_not_a_crash() {
        let svc = test_service().await;
        let huge = (Decimal::MAX - Decimal::ONE).to_string();
        for id in ["txn-big1", "txn-big2"] {
            svc.db()
                .conn()
                .execute(
                    "INSERT INTO transactions (id, total_amount, payment_method) VALUES (?1, ?2, 'cash')",
                    libsql::params![id, huge.as_str()],
                )
                .await
                .unwrap();
        }

        for _ in 0..2 {
            let err = svc.financial_summary().await.unwrap_err();
            assert!(matches!(err, DatabaseError::Validation(_)), "got {err:?}");
        }
    }
}
