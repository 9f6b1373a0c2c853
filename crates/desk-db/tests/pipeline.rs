//! End-to-end checks of the sale pipeline against a real database file.

use std::str::FromStr;
use std::sync::Arc;

use desk_core::enums::OrderStatus;
use desk_core::inputs::{NewOrder, NewOrderItem, NewProduct, NewTransaction, NewTransactionItem};
use desk_core::money::Decimal;
use desk_db::error::DatabaseError;
use desk_db::service::{DeskService, ServiceSettings};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn service_at(path: &std::path::Path) -> DeskService {
    DeskService::new_local(path.to_str().unwrap(), ServiceSettings::default())
        .await
        .unwrap()
}

async fn frame(svc: &DeskService, stock: i64) -> String {
    svc.create_product(
        None,
        &NewProduct {
            name: "Walnut Frame".into(),
            sku: "FRM-WAL".into(),
            category: "Frames".into(),
            price: dec("450"),
            cost_price: dec("300"),
            stock_level: stock,
            min_stock_level: Some(0),
            ..NewProduct::default()
        },
    )
    .await
    .unwrap()
    .id
}

fn one_unit(product_id: &str) -> NewTransaction {
    NewTransaction {
        items: vec![NewTransactionItem {
            product_id: product_id.into(),
            quantity: 1,
            price: dec("450"),
            ..NewTransactionItem::default()
        }],
        total_amount: dec("450"),
        payment_method: "cash".into(),
        ..NewTransaction::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let dir = tempfile::TempDir::new().unwrap();
    let svc = Arc::new(service_at(&dir.path().join("shop.db")).await);
    let product_id = frame(&svc, 10).await;

    let mut handles = Vec::new();
    for _ in 0..25 {
        let svc = Arc::clone(&svc);
        let product_id = product_id.clone();
        handles.push(tokio::spawn(async move {
            svc.create_transaction(None, &one_unit(&product_id)).await
        }));
    }

    let mut sold = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(DatabaseError::InsufficientStock { .. }) => refused += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(sold, 10);
    assert_eq!(refused, 15);
    assert_eq!(svc.get_product(&product_id).await.unwrap().stock_level, 0);
    assert_eq!(svc.list_transactions().await.unwrap().len(), 10);
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("shop.db");

    let product_id = {
        let svc = service_at(&path).await;
        let product_id = frame(&svc, 5).await;
        svc.create_transaction(None, &one_unit(&product_id))
            .await
            .unwrap();
        product_id
    };

    let svc = service_at(&path).await;
    assert_eq!(svc.get_product(&product_id).await.unwrap().stock_level, 4);
    let summary = svc.financial_summary().await.unwrap();
    assert_eq!(summary.pos_revenue, dec("450"));
    assert_eq!(summary.gross_profit, dec("150"));
}

#[tokio::test]
async fn order_then_cancel_returns_stock_and_keeps_history() {
    let dir = tempfile::TempDir::new().unwrap();
    let svc = service_at(&dir.path().join("shop.db")).await;
    let product_id = frame(&svc, 6).await;

    let order = svc
        .create_order(
            Some("usr-owner"),
            &NewOrder {
                customer_name: "Kiran".into(),
                customer_phone: "9000000001".into(),
                items: vec![NewOrderItem {
                    product_id: product_id.clone(),
                    quantity: 4,
                    price: dec("450"),
                    ..NewOrderItem::default()
                }],
                total_amount: dec("1800"),
                ..NewOrder::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(svc.get_product(&product_id).await.unwrap().stock_level, 2);

    svc.update_order_status(Some("usr-owner"), &order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(svc.get_product(&product_id).await.unwrap().stock_level, 6);

    let history = svc
        .query_audit(&desk_db::repos::audit::AuditFilter {
            entity_id: Some(order.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| e.actor.as_deref() == Some("usr-owner")));
}
