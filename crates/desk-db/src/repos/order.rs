//! Order repository: custom and wholesale orders with a status lifecycle.

use std::collections::HashMap;

use desk_core::audit_detail::{SaleDetail, StatusChangedDetail};
use desk_core::entities::{Order, OrderItem};
use desk_core::enums::{AuditAction, EntityType, NotificationKind, OrderStatus};
use desk_core::errors::CoreError;
use desk_core::ids::{PREFIX_ORDER, short_ref};
use desk_core::inputs::NewOrder;
use desk_core::money::{format_amount, line_subtotal};
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    fmt_datetime, get_bool, get_opt_string, now_utc, parse_datetime, parse_decimal, parse_enum,
    parse_optional_date,
};
use crate::repos::audit::record_audit;
use crate::repos::customer::{find_or_create_on, record_activity_on};
use crate::repos::notification::insert_notification;
use crate::repos::product::{apply_stock_delta, fetch_product};
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::order::OrderUpdate;

pub(crate) const NEW_ORDER_TITLE: &str = "New Order Received";

const SELECT_COLS: &str = "id, customer_name, customer_phone, total_amount, status, order_type, \
     due_date, notes, payment_method, is_paid, created_at, updated_at";

const ITEM_COLS: &str = "order_id, product_id, name, quantity, price, custom_notes, subtotal";

fn row_to_order(row: &libsql::Row) -> Result<Order, DatabaseError> {
    Ok(Order {
        id: row.get::<String>(0)?,
        customer_name: row.get::<String>(1)?,
        customer_phone: row.get::<String>(2)?,
        items: Vec::new(),
        total_amount: parse_decimal(&row.get::<String>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        order_type: parse_enum(&row.get::<String>(5)?)?,
        due_date: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        notes: get_opt_string(row, 7)?,
        payment_method: get_opt_string(row, 8)?,
        is_paid: get_bool(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

fn row_to_item(row: &libsql::Row) -> Result<OrderItem, DatabaseError> {
    Ok(OrderItem {
        product_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        quantity: row.get::<i64>(3)?,
        price: parse_decimal(&row.get::<String>(4)?)?,
        custom_notes: get_opt_string(row, 5)?,
        subtotal: parse_decimal(&row.get::<String>(6)?)?,
    })
}

async fn fetch_order(conn: &libsql::Connection, id: &str) -> Result<Order, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM orders WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("order", id))?;
    let mut order = row_to_order(&row)?;

    let mut rows = conn
        .query(
            &format!("SELECT {ITEM_COLS} FROM order_items WHERE order_id = ?1 ORDER BY position"),
            [id],
        )
        .await?;
    while let Some(row) = rows.next().await? {
        order.items.push(row_to_item(&row)?);
    }
    Ok(order)
}

impl DeskService {
    /// Take an order.
    ///
    /// Stock for every line is reserved immediately with the same conditional
    /// decrement as a POS sale. The customer is found or created and credited,
    /// and a "New Order Received" notification is raised, all in one
    /// database transaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound` for an unknown product, or
    /// `InsufficientStock`.
    pub async fn create_order(
        &self,
        actor: Option<&str>,
        input: &NewOrder,
    ) -> Result<Order, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let id = generate_id(&tx, PREFIX_ORDER).await?;
            let now = now_utc();

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
                apply_stock_delta(&tx, actor, &product.id, -line.quantity, Some(id.as_str()))
                    .await?;
                let subtotal = match line.subtotal {
                    Some(subtotal) => subtotal,
                    None => line_subtotal(line.price, line.quantity)?,
                };
                items.push(OrderItem {
                    product_id: product.id,
                    name: line.name.clone().unwrap_or(product.name),
                    quantity: line.quantity,
                    price: line.price,
                    custom_notes: line.custom_notes.clone(),
                    subtotal,
                });
            }

            let customer_name = input.customer_name.trim().to_string();
            let customer_phone = input.customer_phone.trim().to_string();
            find_or_create_on(&tx, actor, Some(customer_name.as_str()), &customer_phone)
                .await?;
            record_activity_on(&tx, &customer_phone, input.total_amount, now).await?;

            let order = Order {
                id,
                customer_name,
                customer_phone,
                items,
                total_amount: input.total_amount,
                status: OrderStatus::Pending,
                order_type: input.order_type,
                due_date: input.due_date,
                notes: input.notes.clone(),
                payment_method: input.payment_method.clone(),
                is_paid: input.is_paid,
                created_at: now,
                updated_at: now,
            };
            let ts = fmt_datetime(&now);
            tx.execute(
                "INSERT INTO orders (id, customer_name, customer_phone, total_amount, status,
                     order_type, due_date, notes, payment_method, is_paid, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                libsql::params![
                    order.id.as_str(),
                    order.customer_name.as_str(),
                    order.customer_phone.as_str(),
                    order.total_amount.to_string(),
                    order.status.as_str(),
                    order.order_type.as_str(),
                    order.due_date.map(|d| d.to_string()),
                    order.notes.as_deref(),
                    order.payment_method.as_deref(),
                    i64::from(order.is_paid),
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await?;
            for (position, item) in (0_i64..).zip(&order.items) {
                tx.execute(
                    "INSERT INTO order_items (order_id, position, product_id, name, quantity,
                         price, custom_notes, subtotal)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    libsql::params![
                        order.id.as_str(),
                        position,
                        item.product_id.as_str(),
                        item.name.as_str(),
                        item.quantity,
                        item.price.to_string(),
                        item.custom_notes.as_deref(),
                        item.subtotal.to_string()
                    ],
                )
                .await?;
            }

            let message = format!(
                "Order #{} from {} for {}",
                short_ref(&order.id),
                order.customer_name,
                format_amount(&self.settings().currency_symbol, order.total_amount)
            );
            insert_notification(&tx, NEW_ORDER_TITLE, &message, NotificationKind::Info).await?;

            let detail = SaleDetail {
                total_amount: order.total_amount,
                items: order.items.len(),
                customer_phone: Some(order.customer_phone.clone()),
            };
            record_audit(
                &tx,
                actor,
                EntityType::Order,
                &order.id,
                AuditAction::Created,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
            Ok(order)
        }
        .await;
        let order = finish(tx, result).await?;
        info!(id = %order.id, customer = %order.customer_name, "order created");
        Ok(order)
    }

    /// All orders, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_orders(&self) -> Result<Vec<Order>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM orders ORDER BY created_at DESC, rowid DESC"),
                (),
            )
            .await?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next().await? {
            orders.push(row_to_order(&row)?);
        }

        let mut items: HashMap<String, Vec<OrderItem>> = HashMap::new();
        let mut rows = conn
            .query(
                &format!("SELECT {ITEM_COLS} FROM order_items ORDER BY order_id, position"),
                (),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let order_id = row.get::<String>(0)?;
            items.entry(order_id).or_default().push(row_to_item(&row)?);
        }
        for order in &mut orders {
            order.items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no order has this id.
    pub async fn get_order(&self, id: &str) -> Result<Order, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_order(conn, id).await
    }

    /// Move an order along its lifecycle. Cancelling returns every line's
    /// quantity to stock; lines whose product has since been deleted are skipped.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InvalidState` for a transition the lifecycle
    /// does not allow.
    pub async fn update_order_status(
        &self,
        actor: Option<&str>,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let order = fetch_order(&tx, id).await?;
            if !order.status.can_transition_to(status) {
                return Err(CoreError::InvalidTransition {
                    entity_type: "order".into(),
                    id: id.to_string(),
                    from: order.status.to_string(),
                    to: status.to_string(),
                }
                .into());
            }

            tx.execute(
                "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), fmt_datetime(&now_utc()), id],
            )
            .await?;

            if status == OrderStatus::Cancelled {
                for item in &order.items {
                    match apply_stock_delta(&tx, actor, &item.product_id, item.quantity, Some(id))
                        .await
                    {
                        Ok(_) => {}
                        Err(DatabaseError::NotFound { .. }) => {
                            warn!(
                                order = %id,
                                product = %item.product_id,
                                "restock skipped, product gone"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
            }

            let detail = StatusChangedDetail {
                from: order.status.to_string(),
                to: status.to_string(),
            };
            record_audit(
                &tx,
                actor,
                EntityType::Order,
                id,
                AuditAction::StatusChanged,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
            fetch_order(&tx, id).await
        }
        .await;
        let order = finish(tx, result).await?;
        info!(%id, status = %order.status, "order status changed");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Validation`.
    pub async fn update_order(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &OrderUpdate,
    ) -> Result<Order, DatabaseError> {
        update.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_order(&tx, id).await?;

            let mut set = SetClause::default();
            if let Some(ref name) = update.customer_name {
                set.push("customer_name", name.trim());
            }
            if let Some(ref phone) = update.customer_phone {
                set.push("customer_phone", phone.trim());
            }
            if let Some(due_date) = update.due_date {
                set.push_opt("due_date", due_date.map(|d| d.to_string()).as_deref());
            }
            if let Some(ref notes) = update.notes {
                set.push_opt("notes", notes.as_deref());
            }
            if let Some(ref payment_method) = update.payment_method {
                set.push_opt("payment_method", payment_method.as_deref());
            }
            if let Some(is_paid) = update.is_paid {
                set.push("is_paid", i64::from(is_paid));
            }
            if let Some(order_type) = update.order_type {
                set.push("order_type", order_type.as_str());
            }
            if set.is_empty() {
                return fetch_order(&tx, id).await;
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("orders", id);
            tx.execute(&sql, libsql::params_from_iter(params)).await?;
            record_audit(
                &tx,
                actor,
                EntityType::Order,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            fetch_order(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Remove an order and its lines. Stock is left as it is.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no order has this id.
    pub async fn delete_order(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx.execute("DELETE FROM orders WHERE id = ?1", [id]).await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("order", id));
            }
            record_audit(&tx, actor, EntityType::Order, id, AuditAction::Deleted, None).await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{dec, seed_product, test_service};
    use crate::updates::order::OrderUpdateBuilder;
    use desk_core::inputs::NewOrderItem;
    use pretty_assertions::assert_eq;

    fn order_for(product_id: &str, quantity: i64, total: &str) -> NewOrder {
        NewOrder {
            customer_name: "Kiran".into(),
            customer_phone: "9000000001".into(),
            items: vec![NewOrderItem {
                product_id: product_id.into(),
                quantity,
                price: dec("150"),
                custom_notes: Some("gold leaf corners".into()),
                ..NewOrderItem::default()
            }],
            total_amount: dec(total),
            ..NewOrder::default()
        }
    }

    #[tokio::test]
    async fn create_reserves_stock_and_notifies() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 10).await;

        let order = svc
            .create_order(None, &order_for(&product.id, 4, "600"))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].subtotal, dec("600"));
        assert_eq!(svc.get_product(&product.id).await.unwrap().stock_level, 6);

        let notes = svc.list_notifications(None).await.unwrap();
        assert_eq!(notes[0].title, NEW_ORDER_TITLE);
        assert_eq!(
            notes[0].message,
            format!("Order #{} from Kiran for ₹600", short_ref(&order.id))
        );

        let customer = svc
            .find_customer_by_phone("9000000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_spent, dec("600"));
    }

    #[tokio::test]
    async fn create_with_insufficient_stock_leaves_nothing() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 1).await;
        let err = svc
            .create_order(None, &order_for(&product.id, 2, "300"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InsufficientStock { .. }));
        assert!(svc.list_orders().await.unwrap().is_empty());
        assert!(svc.list_customers().await.unwrap().is_empty());
        assert!(svc.list_notifications(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_requires_customer() {
        let svc = test_service().await;
        let mut input = order_for("prd-x", 1, "1");
        input.customer_phone = String::new();
        assert!(matches!(
            svc.create_order(None, &input).await,
            Err(DatabaseError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn lifecycle_follows_state_machine() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 10).await;
        let order = svc
            .create_order(None, &order_for(&product.id, 1, "150"))
            .await
            .unwrap();

        let order = svc
            .update_order_status(None, &order.id, OrderStatus::ReadyForPickup)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::ReadyForPickup);

        let order = svc
            .update_order_status(None, &order.id, OrderStatus::InProduction)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::InProduction);

        let done = svc
            .update_order_status(None, &order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(done.status, OrderStatus::Delivered);

        let err = svc
            .update_order_status(None, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)), "{err}");
        assert_eq!(svc.get_product(&product.id).await.unwrap().stock_level, 9);

        let err = svc
            .update_order_status(None, &order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)), "{err}");
    }

    #[tokio::test]
    async fn cancel_restocks() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 10).await;
        let order = svc
            .create_order(None, &order_for(&product.id, 3, "450"))
            .await
            .unwrap();
        assert_eq!(svc.get_product(&product.id).await.unwrap().stock_level, 7);

        svc.update_order_status(None, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(svc.get_product(&product.id).await.unwrap().stock_level, 10);
    }

    #[tokio::test]
    async fn cancel_skips_deleted_products() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 10).await;
        let order = svc
            .create_order(None, &order_for(&product.id, 3, "450"))
            .await
            .unwrap();
        svc.delete_product(None, &product.id).await.unwrap();

        let cancelled = svc
            .update_order_status(None, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn update_marks_paid() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 10).await;
        let order = svc
            .create_order(None, &order_for(&product.id, 1, "150"))
            .await
            .unwrap();

        let update = OrderUpdateBuilder::new()
            .is_paid(true)
            .notes(None)
            .build();
        let updated = svc.update_order(None, &order.id, &update).await.unwrap();
        assert!(updated.is_paid);
        assert_eq!(updated.notes, None);
        assert_eq!(updated.items.len(), 1);
    }

    #[tokio::test]
    async fn delete_keeps_stock() {
        let svc = test_service().await;
        let product = seed_product(&svc, "ORD", "150", "90", 10).await;
        let order = svc
            .create_order(None, &order_for(&product.id, 2, "300"))
            .await
            .unwrap();
        svc.delete_order(None, &order.id).await.unwrap();

        assert_eq!(svc.get_product(&product.id).await.unwrap().stock_level, 8);
        assert!(matches!(
            svc.get_order(&order.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
