//! Expense repository.

use desk_core::entities::Expense;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_EXPENSE;
use desk_core::inputs::NewExpense;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    fmt_datetime, get_opt_string, now_utc, parse_datetime, parse_decimal, parse_enum,
};
use crate::repos::audit::record_audit;
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::expense::ExpenseUpdate;

const SELECT_COLS: &str = "id, title, amount, category, date, notes, created_at, updated_at";

fn row_to_expense(row: &libsql::Row) -> Result<Expense, DatabaseError> {
    Ok(Expense {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        amount: parse_decimal(&row.get::<String>(2)?)?,
        category: parse_enum(&row.get::<String>(3)?)?,
        date: parse_datetime(&row.get::<String>(4)?)?,
        notes: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

async fn fetch_expense(conn: &libsql::Connection, id: &str) -> Result<Expense, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM expenses WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("expense", id))?;
    row_to_expense(&row)
}

impl DeskService {
    /// Record an expense. The date defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank title or negative amount.
    pub async fn create_expense(
        &self,
        actor: Option<&str>,
        input: &NewExpense,
    ) -> Result<Expense, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let now = now_utc();
            let expense = Expense {
                id: generate_id(&tx, PREFIX_EXPENSE).await?,
                title: input.title.trim().to_string(),
                amount: input.amount,
                category: input.category,
                date: input.date.unwrap_or(now),
                notes: input.notes.clone(),
                created_at: now,
                updated_at: now,
            };
            let ts = fmt_datetime(&now);
            tx.execute(
                "INSERT INTO expenses (id, title, amount, category, date, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    expense.id.as_str(),
                    expense.title.as_str(),
                    expense.amount.to_string(),
                    expense.category.as_str(),
                    fmt_datetime(&expense.date),
                    expense.notes.as_deref(),
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await?;
            record_audit(
                &tx,
                actor,
                EntityType::Expense,
                &expense.id,
                AuditAction::Created,
                None,
            )
            .await?;
            Ok(expense)
        }
        .await;
        finish(tx, result).await
    }

    /// Expenses, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM expenses ORDER BY date DESC, rowid DESC"),
                (),
            )
            .await?;
        let mut expenses = Vec::new();
        while let Some(row) = rows.next().await? {
            expenses.push(row_to_expense(&row)?);
        }
        Ok(expenses)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no expense has this id.
    pub async fn get_expense(&self, id: &str) -> Result<Expense, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_expense(conn, id).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn update_expense(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &ExpenseUpdate,
    ) -> Result<Expense, DatabaseError> {
        update.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_expense(&tx, id).await?;

            let mut set = SetClause::default();
            if let Some(ref title) = update.title {
                set.push("title", title.trim());
            }
            if let Some(amount) = update.amount {
                set.push("amount", amount.to_string());
            }
            if let Some(category) = update.category {
                set.push("category", category.as_str());
            }
            if let Some(date) = update.date {
                set.push("date", fmt_datetime(&date));
            }
            if let Some(ref notes) = update.notes {
                set.push_opt("notes", notes.as_deref());
            }
            if set.is_empty() {
                return fetch_expense(&tx, id).await;
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("expenses", id);
            tx.execute(&sql, libsql::params_from_iter(params)).await?;
            record_audit(
                &tx,
                actor,
                EntityType::Expense,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            fetch_expense(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no expense has this id.
    pub async fn delete_expense(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx.execute("DELETE FROM expenses WHERE id = ?1", [id]).await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("expense", id));
            }
            record_audit(&tx, actor, EntityType::Expense, id, AuditAction::Deleted, None).await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{dec, test_service};
    use crate::updates::expense::ExpenseUpdateBuilder;
    use chrono::{TimeZone, Utc};
    use desk_core::enums::ExpenseCategory;

    fn rent(day: u32) -> NewExpense {
        NewExpense {
            title: format!("Rent {day}"),
            amount: dec("12000"),
            category: ExpenseCategory::Rent,
            date: Some(Utc.with_ymd_and_hms(2026, 10, day, 10, 0, 0).unwrap()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn list_is_date_descending() {
        let svc = test_service().await;
        svc.create_expense(None, &rent(1)).await.unwrap();
        svc.create_expense(None, &rent(9)).await.unwrap();
        svc.create_expense(None, &rent(4)).await.unwrap();

        let titles: Vec<String> = svc
            .list_expenses()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Rent 9", "Rent 4", "Rent 1"]);
    }

    #[tokio::test]
    async fn date_defaults_to_now() {
        let svc = test_service().await;
        let mut input = rent(1);
        input.date = None;
        let expense = svc.create_expense(None, &input).await.unwrap();
        assert_eq!(expense.date, expense.created_at);
        assert_eq!(svc.get_expense(&expense.id).await.unwrap(), expense);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let svc = test_service().await;
        let expense = svc.create_expense(None, &rent(1)).await.unwrap();
        let update = ExpenseUpdateBuilder::new()
            .amount(dec("11500.75"))
            .category(ExpenseCategory::Utilities)
            .build();
        let updated = svc
            .update_expense(None, &expense.id, &update)
            .await
            .unwrap();
        assert_eq!(updated.amount, dec("11500.75"));
        assert_eq!(updated.category, ExpenseCategory::Utilities);

        svc.delete_expense(None, &expense.id).await.unwrap();
        assert!(matches!(
            svc.get_expense(&expense.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn negative_amount_rejected() {
        let svc = test_service().await;
        let mut input = rent(1);
        input.amount = dec("-1");
        assert!(matches!(
            svc.create_expense(None, &input).await,
            Err(DatabaseError::Validation(_))
        ));
    }
}
