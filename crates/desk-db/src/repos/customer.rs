//! Customer repository.
//!
//! Customers are keyed by phone number. The sale and order pipelines call
//! [`find_or_create_on`] and [`record_activity_on`] inside their own
//! transaction so purchase totals never drift from the recorded sales.

use chrono::{DateTime, Utc};
use desk_core::entities::Customer;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_CUSTOMER;
use desk_core::inputs::NewCustomer;
use desk_core::money::{Decimal, add_amounts};
use tracing::debug;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    fmt_datetime, fts_query, get_opt_string, now_utc, parse_datetime, parse_decimal,
};
use crate::repos::audit::record_audit;
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::customer::CustomerUpdate;

const SELECT_COLS: &str = "id, name, phone, email, address, total_spent, order_count, notes, \
     last_purchase_date, created_at, updated_at";

fn row_to_customer(row: &libsql::Row) -> Result<Customer, DatabaseError> {
    Ok(Customer {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        phone: row.get::<String>(2)?,
        email: get_opt_string(row, 3)?,
        address: get_opt_string(row, 4)?,
        total_spent: parse_decimal(&row.get::<String>(5)?)?,
        order_count: row.get::<i64>(6)?,
        notes: get_opt_string(row, 7)?,
        last_purchase_date: get_opt_string(row, 8)?
            .as_deref()
            .map(parse_datetime)
            .transpose()?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

async fn collect_customers(mut rows: libsql::Rows) -> Result<Vec<Customer>, DatabaseError> {
    let mut customers = Vec::new();
    while let Some(row) = rows.next().await? {
        customers.push(row_to_customer(&row)?);
    }
    Ok(customers)
}

async fn fetch_customer(conn: &libsql::Connection, id: &str) -> Result<Customer, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM customers WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("customer", id))?;
    row_to_customer(&row)
}

pub(crate) async fn fetch_by_phone(
    conn: &libsql::Connection,
    phone: &str,
) -> Result<Option<Customer>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM customers WHERE phone = ?1"),
            [phone],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_customer(&row)?)),
        None => Ok(None),
    }
}

async fn insert_customer(
    conn: &libsql::Connection,
    actor: Option<&str>,
    input: &NewCustomer,
) -> Result<Customer, DatabaseError> {
    let now = now_utc();
    let customer = Customer {
        id: generate_id(conn, PREFIX_CUSTOMER).await?,
        name: input.name.trim().to_string(),
        phone: input.phone.trim().to_string(),
        email: input.email.clone(),
        address: input.address.clone(),
        total_spent: Decimal::ZERO,
        order_count: 0,
        notes: input.notes.clone(),
        last_purchase_date: None,
        created_at: now,
        updated_at: now,
    };
    let ts = fmt_datetime(&now);
    conn.execute(
        "INSERT INTO customers (id, name, phone, email, address, total_spent, order_count,
             notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, '0', 0, ?6, ?7, ?8)",
        libsql::params![
            customer.id.as_str(),
            customer.name.as_str(),
            customer.phone.as_str(),
            customer.email.as_deref(),
            customer.address.as_deref(),
            customer.notes.as_deref(),
            ts.as_str(),
            ts.as_str()
        ],
    )
    .await
    .map_err(|e| {
        DatabaseError::from_write(e, || {
            format!("a customer with phone '{}' already exists", customer.phone)
        })
    })?;
    record_audit(
        conn,
        actor,
        EntityType::Customer,
        &customer.id,
        AuditAction::Created,
        None,
    )
    .await?;
    Ok(customer)
}

/// Look up a customer by phone, creating one when absent.
///
/// A blank phone is a no-op. A new customer without a name is named after
/// the phone. An existing customer's name is replaced when a different
/// non-blank name is given.
pub(crate) async fn find_or_create_on(
    conn: &libsql::Connection,
    actor: Option<&str>,
    name: Option<&str>,
    phone: &str,
) -> Result<Option<Customer>, DatabaseError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Ok(None);
    }
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    if let Some(existing) = fetch_by_phone(conn, phone).await? {
        return match name {
            Some(name) if name != existing.name => {
                conn.execute(
                    "UPDATE customers SET name = ?1, updated_at = ?2 WHERE id = ?3",
                    libsql::params![name, fmt_datetime(&now_utc()), existing.id.as_str()],
                )
                .await?;
                debug!(id = %existing.id, "customer renamed from sale");
                Ok(Some(fetch_customer(conn, &existing.id).await?))
            }
            _ => Ok(Some(existing)),
        };
    }

    let input = NewCustomer {
        name: name.unwrap_or(phone).to_string(),
        phone: phone.to_string(),
        ..NewCustomer::default()
    };
    insert_customer(conn, actor, &input).await.map(Some)
}

/// Add `amount` to the customer's lifetime spend and bump their purchase count.
///
/// Unknown phones are ignored.
pub(crate) async fn record_activity_on(
    conn: &libsql::Connection,
    phone: &str,
    amount: Decimal,
    at: DateTime<Utc>,
) -> Result<Option<Customer>, DatabaseError> {
    let Some(customer) = fetch_by_phone(conn, phone.trim()).await? else {
        return Ok(None);
    };
    let total = add_amounts("total_spent", customer.total_spent, amount)?;
    let ts = fmt_datetime(&at);
    conn.execute(
        "UPDATE customers
         SET total_spent = ?1, order_count = order_count + 1,
             last_purchase_date = ?2, updated_at = ?2
         WHERE id = ?3",
        libsql::params![total.to_string(), ts, customer.id.as_str()],
    )
    .await?;
    Ok(Some(fetch_customer(conn, &customer.id).await?))
}

impl DeskService {
    /// # Errors
    ///
    /// Returns `Validation` for bad input or `Conflict` for a duplicate phone.
    pub async fn create_customer(
        &self,
        actor: Option<&str>,
        input: &NewCustomer,
    ) -> Result<Customer, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = insert_customer(&tx, actor, input).await;
        finish(tx, result).await
    }

    /// Resolve the customer behind a sale or order, creating them on first purchase.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the lookup or insert fails.
    pub async fn find_or_create_customer(
        &self,
        actor: Option<&str>,
        name: Option<&str>,
        phone: &str,
    ) -> Result<Option<Customer>, DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = find_or_create_on(&tx, actor, name, phone).await;
        finish(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the update fails.
    pub async fn record_customer_activity(
        &self,
        phone: &str,
        amount: Decimal,
    ) -> Result<Option<Customer>, DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = record_activity_on(&tx, phone, amount, now_utc()).await;
        finish(tx, result).await
    }

    /// Customers ordered by lifetime spend, biggest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(&format!("SELECT {SELECT_COLS} FROM customers"), ())
            .await?;
        let mut customers = collect_customers(rows).await?;
        customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent).then(a.name.cmp(&b.name)));
        Ok(customers)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no customer has this id.
    pub async fn get_customer(&self, id: &str) -> Result<Customer, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_customer(conn, id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_customer_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<Customer>, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_by_phone(conn, phone.trim()).await
    }

    /// # Errors
    ///
    /// Returns `NotFound`, `Validation`, or `Conflict` for a duplicate phone.
    pub async fn update_customer(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &CustomerUpdate,
    ) -> Result<Customer, DatabaseError> {
        update.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_customer(&tx, id).await?;

            let mut set = SetClause::default();
            if let Some(ref name) = update.name {
                set.push("name", name.trim());
            }
            if let Some(ref phone) = update.phone {
                set.push("phone", phone.trim());
            }
            if let Some(ref email) = update.email {
                set.push_opt("email", email.as_deref());
            }
            if let Some(ref address) = update.address {
                set.push_opt("address", address.as_deref());
            }
            if let Some(ref notes) = update.notes {
                set.push_opt("notes", notes.as_deref());
            }
            if set.is_empty() {
                return fetch_customer(&tx, id).await;
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("customers", id);
            tx.execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| {
                    DatabaseError::from_write(e, || {
                        format!(
                            "a customer with phone '{}' already exists",
                            update.phone.as_deref().unwrap_or_default()
                        )
                    })
                })?;
            record_audit(
                &tx,
                actor,
                EntityType::Customer,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            fetch_customer(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Delete a customer. Their past sales and orders keep the copied name and phone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no customer has this id.
    pub async fn delete_customer(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx
                .execute("DELETE FROM customers WHERE id = ?1", [id])
                .await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("customer", id));
            }
            record_audit(&tx, actor, EntityType::Customer, id, AuditAction::Deleted, None)
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }

    /// Full-text search over name, phone and email.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn search_customers(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Customer>, DatabaseError> {
        let Some(fts) = fts_query(query) else {
            return Ok(Vec::new());
        };
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(
                "SELECT c.id, c.name, c.phone, c.email, c.address, c.total_spent, c.order_count,
                        c.notes, c.last_purchase_date, c.created_at, c.updated_at
                 FROM customers_fts
                 JOIN customers c ON c.rowid = customers_fts.rowid
                 WHERE customers_fts MATCH ?1
                 ORDER BY rank
                 LIMIT ?2",
                libsql::params![fts, i64::from(limit)],
            )
            .await?;
        collect_customers(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{dec, test_service};
    use crate::updates::customer::CustomerUpdateBuilder;

    fn anita() -> NewCustomer {
        NewCustomer {
            name: "Anita".into(),
            phone: "9876543210".into(),
            ..NewCustomer::default()
        }
    }

    #[tokio::test]
    async fn create_and_duplicate_phone() {
        let svc = test_service().await;
        let customer = svc.create_customer(None, &anita()).await.unwrap();
        assert!(customer.id.starts_with("cus-"));
        assert_eq!(customer.total_spent, Decimal::ZERO);

        let err = svc.create_customer(None, &anita()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_or_create_blank_phone_is_noop() {
        let svc = test_service().await;
        let found = svc
            .find_or_create_customer(None, Some("Walk-in"), "  ")
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(svc.list_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_or_create_names_after_phone() {
        let svc = test_service().await;
        let created = svc
            .find_or_create_customer(None, None, "555")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.name, "555");

        let renamed = svc
            .find_or_create_customer(None, Some("Ravi"), "555")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "Ravi");

        let unchanged = svc
            .find_or_create_customer(None, Some("  "), "555")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, "Ravi");
        assert_eq!(svc.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn activity_accumulates_spend() {
        let svc = test_service().await;
        svc.create_customer(None, &anita()).await.unwrap();
        svc.record_customer_activity("9876543210", dec("120.50"))
            .await
            .unwrap();
        let customer = svc
            .record_customer_activity("9876543210", dec("79.50"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_spent, dec("200.00"));
        assert_eq!(customer.order_count, 2);
        assert!(customer.last_purchase_date.is_some());

        let unknown = svc
            .record_customer_activity("000", dec("1"))
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn spend_overflow_is_rejected_and_keeps_the_old_total() {
        let svc = test_service().await;
        svc.create_customer(None, &anita()).await.unwrap();
        svc.record_customer_activity("9876543210", Decimal::MAX)
            .await
            .unwrap();

        let err = svc
            .record_customer_activity("9876543210", Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(ref m) if m.contains("total_spent")));

        let customer = svc
            .find_customer_by_phone("9876543210")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_spent, Decimal::MAX);
        assert_eq!(customer.order_count, 1);
    }

    #[tokio::test]
    async fn list_orders_by_spend() {
        let svc = test_service().await;
        for (name, phone, spend) in [("A", "1", "9"), ("B", "2", "100"), ("C", "3", "10")] {
            svc.create_customer(
                None,
                &NewCustomer {
                    name: name.into(),
                    phone: phone.into(),
                    ..NewCustomer::default()
                },
            )
            .await
            .unwrap();
            svc.record_customer_activity(phone, dec(spend)).await.unwrap();
        }
        let names: Vec<String> = svc
            .list_customers()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn update_clears_email() {
        let svc = test_service().await;
        let mut input = anita();
        input.email = Some("anita@example.com".into());
        let customer = svc.create_customer(None, &input).await.unwrap();

        let update = CustomerUpdateBuilder::new().email(None).build();
        let updated = svc
            .update_customer(None, &customer.id, &update)
            .await
            .unwrap();
        assert_eq!(updated.email, None);
    }

    #[tokio::test]
    async fn search_by_phone_prefix() {
        let svc = test_service().await;
        let customer = svc.create_customer(None, &anita()).await.unwrap();
        let hits = svc.search_customers("98765", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, customer.id);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let svc = test_service().await;
        assert!(matches!(
            svc.delete_customer(None, "cus-missing").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
