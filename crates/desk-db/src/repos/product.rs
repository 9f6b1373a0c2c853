//! Product repository.
//!
//! Stock only moves through [`apply_stock_delta`]: a single conditional
//! `UPDATE` that refuses to take the level below zero, followed by the
//! low-stock check and a `stock_adjusted` audit entry.

use desk_core::audit_detail::StockAdjustedDetail;
use desk_core::entities::Product;
use desk_core::enums::{AuditAction, EntityType, NotificationKind};
use desk_core::ids::PREFIX_PRODUCT;
use desk_core::inputs::NewProduct;
use tracing::info;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    encode_string_list, fmt_datetime, fts_query, get_opt_string, now_utc, parse_datetime,
    parse_decimal, parse_enum, parse_string_list,
};
use crate::repos::audit::record_audit;
use crate::repos::notification::insert_notification;
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::product::ProductUpdate;

pub(crate) const LOW_STOCK_TITLE: &str = "Low Stock Warning";

const SELECT_COLS: &str = "id, name, sku, description, category, supplier, price, cost_price, \
     stock_level, min_stock_level, status, images, created_at, updated_at";

fn row_to_product(row: &libsql::Row) -> Result<Product, DatabaseError> {
    Ok(Product {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        sku: row.get::<String>(2)?,
        description: get_opt_string(row, 3)?,
        category: row.get::<String>(4)?,
        supplier: get_opt_string(row, 5)?,
        price: parse_decimal(&row.get::<String>(6)?)?,
        cost_price: parse_decimal(&row.get::<String>(7)?)?,
        stock_level: row.get::<i64>(8)?,
        min_stock_level: row.get::<i64>(9)?,
        status: parse_enum(&row.get::<String>(10)?)?,
        images: parse_string_list(&row.get::<String>(11)?)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

async fn collect_products(mut rows: libsql::Rows) -> Result<Vec<Product>, DatabaseError> {
    let mut products = Vec::new();
    while let Some(row) = rows.next().await? {
        products.push(row_to_product(&row)?);
    }
    Ok(products)
}

/// Load a product on `conn`, or `NotFound`.
pub(crate) async fn fetch_product(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Product, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM products WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("product", id))?;
    row_to_product(&row)
}

/// Emit the low-stock warning when `product` is at or below its minimum.
pub(crate) async fn warn_if_low(
    conn: &libsql::Connection,
    product: &Product,
) -> Result<(), DatabaseError> {
    if product.is_low_stock() {
        let message = format!(
            "Product \"{}\" is running low ({} units remaining).",
            product.name, product.stock_level
        );
        insert_notification(conn, LOW_STOCK_TITLE, &message, NotificationKind::Warning).await?;
    }
    Ok(())
}

/// Move stock by `delta` units, refusing to go below zero.
///
/// A negative delta that would overdraw the product fails with
/// `InsufficientStock` and leaves the row untouched. A delta whose result
/// does not fit in an `i64` fails with `Validation`.
pub(crate) async fn apply_stock_delta(
    conn: &libsql::Connection,
    actor: Option<&str>,
    id: &str,
    delta: i64,
    reference: Option<&str>,
) -> Result<Product, DatabaseError> {
    let current = fetch_product(conn, id).await?;
    let Some(level) = current.stock_level.checked_add(delta) else {
        return Err(DatabaseError::Validation(format!(
            "stock adjustment of {delta} is out of range for {}",
            current.name
        )));
    };
    if level < 0 {
        return Err(DatabaseError::InsufficientStock {
            product: current.name,
            available: current.stock_level,
            requested: delta.saturating_neg(),
        });
    }

    let now = fmt_datetime(&now_utc());
    conn.execute(
        "UPDATE products SET stock_level = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![level, now, id],
    )
    .await?;

    let product = fetch_product(conn, id).await?;
    warn_if_low(conn, &product).await?;

    let detail = StockAdjustedDetail {
        delta,
        new_level: product.stock_level,
        reference: reference.map(String::from),
    };
    record_audit(
        conn,
        actor,
        EntityType::Product,
        id,
        AuditAction::StockAdjusted,
        Some(serde_json::to_value(&detail)?),
    )
    .await?;
    Ok(product)
}

impl DeskService {
    /// # Errors
    ///
    /// Returns `Validation` for bad input, `Conflict` for a duplicate SKU.
    pub async fn create_product(
        &self,
        actor: Option<&str>,
        input: &NewProduct,
    ) -> Result<Product, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let now = now_utc();
            let product = Product {
                id: generate_id(&tx, PREFIX_PRODUCT).await?,
                name: input.name.trim().to_string(),
                sku: input.sku.trim().to_string(),
                description: input.description.clone(),
                category: input.category.trim().to_string(),
                supplier: input.supplier.clone(),
                price: input.price,
                cost_price: input.cost_price,
                stock_level: input.stock_level,
                min_stock_level: input
                    .min_stock_level
                    .unwrap_or(self.settings().default_min_stock),
                status: input.status,
                images: input.images.clone(),
                created_at: now,
                updated_at: now,
            };
            let ts = fmt_datetime(&now);
            tx.execute(
                "INSERT INTO products (id, name, sku, description, category, supplier, price,
                     cost_price, stock_level, min_stock_level, status, images, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                libsql::params![
                    product.id.as_str(),
                    product.name.as_str(),
                    product.sku.as_str(),
                    product.description.as_deref(),
                    product.category.as_str(),
                    product.supplier.as_deref(),
                    product.price.to_string(),
                    product.cost_price.to_string(),
                    product.stock_level,
                    product.min_stock_level,
                    product.status.as_str(),
                    encode_string_list(&product.images)?,
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await
            .map_err(|e| {
                DatabaseError::from_write(e, || format!("SKU '{}' already exists", product.sku))
            })?;

            record_audit(
                &tx,
                actor,
                EntityType::Product,
                &product.id,
                AuditAction::Created,
                None,
            )
            .await?;
            Ok(product)
        }
        .await;
        let product = finish(tx, result).await?;
        info!(id = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    /// All products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM products ORDER BY name COLLATE NOCASE, rowid"),
                (),
            )
            .await?;
        collect_products(rows).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no product has this id.
    pub async fn get_product(&self, id: &str) -> Result<Product, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_product(conn, id).await
    }

    /// Apply a partial update. Setting `stock_level` directly is allowed and
    /// triggers the low-stock check like any other stock movement.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Validation`, or `Conflict` for a duplicate SKU.
    pub async fn update_product(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &ProductUpdate,
    ) -> Result<Product, DatabaseError> {
        update.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_product(&tx, id).await?;

            let mut set = SetClause::default();
            if let Some(ref name) = update.name {
                set.push("name", name.trim());
            }
            if let Some(ref sku) = update.sku {
                set.push("sku", sku.trim());
            }
            if let Some(ref description) = update.description {
                set.push_opt("description", description.as_deref());
            }
            if let Some(ref category) = update.category {
                set.push("category", category.trim());
            }
            if let Some(ref supplier) = update.supplier {
                set.push_opt("supplier", supplier.as_deref());
            }
            if let Some(price) = update.price {
                set.push("price", price.to_string());
            }
            if let Some(cost) = update.cost_price {
                set.push("cost_price", cost.to_string());
            }
            if let Some(stock) = update.stock_level {
                set.push("stock_level", stock);
            }
            if let Some(min) = update.min_stock_level {
                set.push("min_stock_level", min);
            }
            if let Some(status) = update.status {
                set.push("status", status.as_str());
            }
            if let Some(ref images) = update.images {
                set.push("images", encode_string_list(images)?);
            }
            if set.is_empty() {
                return fetch_product(&tx, id).await;
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("products", id);
            tx.execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| {
                    DatabaseError::from_write(e, || {
                        format!(
                            "SKU '{}' already exists",
                            update.sku.as_deref().unwrap_or_default()
                        )
                    })
                })?;

            let product = fetch_product(&tx, id).await?;
            if update.stock_level.is_some() || update.min_stock_level.is_some() {
                warn_if_low(&tx, &product).await?;
            }
            record_audit(
                &tx,
                actor,
                EntityType::Product,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            Ok(product)
        }
        .await;
        finish(tx, result).await
    }

    /// Delete a product. Past sale and order lines keep their copied name and price.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has this id.
    pub async fn delete_product(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx.execute("DELETE FROM products WHERE id = ?1", [id]).await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("product", id));
            }
            record_audit(&tx, actor, EntityType::Product, id, AuditAction::Deleted, None).await?;
            Ok(())
        }
        .await;
        finish(tx, result).await?;
        info!(%id, "product deleted");
        Ok(())
    }

    /// Manual stock correction (delivery received, breakage, recount).
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InsufficientStock` when a negative delta would
    /// take the level below zero.
    pub async fn adjust_stock(
        &self,
        actor: Option<&str>,
        id: &str,
        delta: i64,
    ) -> Result<Product, DatabaseError> {
        if delta == 0 {
            return Err(DatabaseError::Validation("delta must not be zero".into()));
        }
        let (_gate, tx) = self.begin_write().await?;
        let result = apply_stock_delta(&tx, actor, id, delta, Some("manual")).await;
        finish(tx, result).await
    }

    /// Products at or below their minimum stock level, lowest stock first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn low_stock_products(&self) -> Result<Vec<Product>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM products
                     WHERE stock_level <= min_stock_level
                     ORDER BY stock_level, name COLLATE NOCASE"
                ),
                (),
            )
            .await?;
        collect_products(rows).await
    }

    /// Full-text search over name, SKU, category and description.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, DatabaseError> {
        let Some(fts) = fts_query(query) else {
            return Ok(Vec::new());
        };
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(
                "SELECT p.id, p.name, p.sku, p.description, p.category, p.supplier, p.price,
                        p.cost_price, p.stock_level, p.min_stock_level, p.status, p.images,
                        p.created_at, p.updated_at
                 FROM products_fts
                 JOIN products p ON p.rowid = products_fts.rowid
                 WHERE products_fts MATCH ?1
                 ORDER BY rank
                 LIMIT ?2",
                libsql::params![fts, i64::from(limit)],
            )
            .await?;
        collect_products(rows).await
    }
}
