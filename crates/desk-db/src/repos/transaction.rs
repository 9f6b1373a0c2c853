//! POS transaction repository and the sale pipeline.

use std::collections::HashMap;

use desk_core::audit_detail::SaleDetail;
use desk_core::entities::{Transaction, TransactionItem};
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_TRANSACTION;
use desk_core::inputs::NewTransaction;
use desk_core::money::{Decimal, add_amounts, line_profit, line_subtotal};
use tracing::info;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    fmt_datetime, get_opt_string, now_utc, parse_datetime, parse_decimal,
};
use crate::repos::audit::record_audit;
use crate::repos::customer::{find_or_create_on, record_activity_on};
use crate::repos::product::{apply_stock_delta, fetch_product};
use crate::service::{DeskService, finish};

const SELECT_COLS: &str = "id, total_amount, tax, discount, profit, payment_method, \
     customer_name, customer_phone, notes, created_by, created_at";

fn row_to_transaction(row: &libsql::Row) -> Result<Transaction, DatabaseError> {
    Ok(Transaction {
        id: row.get::<String>(0)?,
        items: Vec::new(),
        total_amount: parse_decimal(&row.get::<String>(1)?)?,
        tax: parse_decimal(&row.get::<String>(2)?)?,
        discount: parse_decimal(&row.get::<String>(3)?)?,
        profit: parse_decimal(&row.get::<String>(4)?)?,
        payment_method: row.get::<String>(5)?,
        customer_name: get_opt_string(row, 6)?,
        customer_phone: get_opt_string(row, 7)?,
        notes: get_opt_string(row, 8)?,
        created_by: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_item(row: &libsql::Row) -> Result<TransactionItem, DatabaseError> {
    Ok(TransactionItem {
        product_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        quantity: row.get::<i64>(3)?,
        price: parse_decimal(&row.get::<String>(4)?)?,
        subtotal: parse_decimal(&row.get::<String>(5)?)?,
    })
}

const ITEM_COLS: &str = "transaction_id, product_id, name, quantity, price, subtotal";

async fn fetch_transaction(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Transaction, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM transactions WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("transaction", id))?;
    let mut txn = row_to_transaction(&row)?;

    let mut rows = conn
        .query(
            &format!(
                "SELECT {ITEM_COLS} FROM transaction_items WHERE transaction_id = ?1 ORDER BY position"
            ),
            [id],
        )
        .await?;
    while let Some(row) = rows.next().await? {
        txn.items.push(row_to_item(&row)?);
    }
    Ok(txn)
}

impl DeskService {
    /// Record a POS sale.
    ///
    /// In one database transaction: every line's product is loaded and its
    /// stock decremented, profit is computed from the products' cost prices,
    /// the buyer (when a phone is given) is found or created and credited,
    /// and the sale with its lines is stored. Any failure leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input, `NotFound` for an unknown product,
    /// or `InsufficientStock` when a line asks for more than is on hand.
    pub async fn create_transaction(
        &self,
        actor: Option<&str>,
        input: &NewTransaction,
    ) -> Result<Transaction, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let id = generate_id(&tx, PREFIX_TRANSACTION).await?;
            let now = now_utc();

            let mut profit = Decimal::ZERO;
            let mut items = Vec::with_capacity(input.items.len());
            for line in &input.items {
                let product = fetch_product(&tx, &line.product_id).await?;
                if product.stock_level < line.quantity {
                    return Err(DatabaseError::InsufficientStock {
                        product: product.name,
                        available: product.stock_level,
                        requested: line.quantity,
                    });
                }
                let margin = line_profit(line.price, product.cost_price, line.quantity)?;
                profit = add_amounts("profit", profit, margin)?;
                apply_stock_delta(&tx, actor, &product.id, -line.quantity, Some(id.as_str()))
                    .await?;
                let subtotal = match line.subtotal {
                    Some(subtotal) => subtotal,
                    None => line_subtotal(line.price, line.quantity)?,
                };

                items.push(TransactionItem {
                    product_id: product.id,
                    name: line.name.clone().unwrap_or(product.name),
                    quantity: line.quantity,
                    price: line.price,
                    subtotal,
                });
            }

            let phone = input
                .customer_phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty());
            if let Some(phone) = phone {
                find_or_create_on(&tx, actor, input.customer_name.as_deref(), phone).await?;
                record_activity_on(&tx, phone, input.total_amount, now).await?;
            }

            let txn = Transaction {
                id,
                items,
                total_amount: input.total_amount,
                tax: input.tax,
                discount: input.discount,
                profit,
                payment_method: input.payment_method.trim().to_string(),
                customer_name: input.customer_name.clone(),
                customer_phone: phone.map(String::from),
                notes: input.notes.clone(),
                created_by: actor.map(String::from),
                created_at: now,
            };
            tx.execute(
                "INSERT INTO transactions (id, total_amount, tax, discount, profit, payment_method,
                     customer_name, customer_phone, notes, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                libsql::params![
                    txn.id.as_str(),
                    txn.total_amount.to_string(),
                    txn.tax.to_string(),
                    txn.discount.to_string(),
                    txn.profit.to_string(),
                    txn.payment_method.as_str(),
                    txn.customer_name.as_deref(),
                    txn.customer_phone.as_deref(),
                    txn.notes.as_deref(),
                    txn.created_by.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
            for (position, item) in (0_i64..).zip(&txn.items) {
                tx.execute(
                    "INSERT INTO transaction_items (transaction_id, position, product_id, name,
                         quantity, price, subtotal)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    libsql::params![
                        txn.id.as_str(),
                        position,
                        item.product_id.as_str(),
                        item.name.as_str(),
                        item.quantity,
                        item.price.to_string(),
                        item.subtotal.to_string()
                    ],
                )
                .await?;
            }

            let detail = SaleDetail {
                total_amount: txn.total_amount,
                items: txn.items.len(),
                customer_phone: txn.customer_phone.clone(),
            };
            record_audit(
                &tx,
                actor,
                EntityType::Transaction,
                &txn.id,
                AuditAction::Created,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
            Ok(txn)
        }
        .await;
        let txn = finish(tx, result).await?;
        info!(id = %txn.id, total = %txn.total_amount, items = txn.items.len(), "sale recorded");
        Ok(txn)
    }

    /// All sales, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM transactions ORDER BY created_at DESC, rowid DESC"
                ),
                (),
            )
            .await?;
        let mut transactions = Vec::new();
        while let Some(row) = rows.next().await? {
            transactions.push(row_to_transaction(&row)?);
        }

        let mut items: HashMap<String, Vec<TransactionItem>> = HashMap::new();
        let mut rows = conn
            .query(
                &format!("SELECT {ITEM_COLS} FROM transaction_items ORDER BY transaction_id, position"),
                (),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let txn_id = row.get::<String>(0)?;
            items.entry(txn_id).or_default().push(row_to_item(&row)?);
        }
        for txn in &mut transactions {
            txn.items = items.remove(&txn.id).unwrap_or_default();
        }
        Ok(transactions)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no sale has this id.
    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_transaction(conn, id).await
    }
}
