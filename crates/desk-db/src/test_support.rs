//! Shared test utilities for desk-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::str::FromStr;

    use desk_core::entities::{Product, User};
    use desk_core::inputs::{NewProduct, NewUser};
    use desk_core::money::Decimal;

    use crate::DeskDb;
    use crate::service::{DeskService, ServiceSettings};

    /// Create an in-memory `DeskService` with default settings.
    pub async fn test_service() -> DeskService {
        let db = DeskDb::open_local(":memory:").await.unwrap();
        DeskService::from_db(db, ServiceSettings::default())
    }

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Insert a product with the given price, cost, and stock.
    pub async fn seed_product(
        svc: &DeskService,
        sku: &str,
        price: &str,
        cost: &str,
        stock: i64,
    ) -> Product {
        svc.create_product(
            None,
            &NewProduct {
                name: format!("Product {sku}"),
                sku: sku.into(),
                category: "Frames".into(),
                price: dec(price),
                cost_price: dec(cost),
                stock_level: stock,
                min_stock_level: Some(2),
                ..NewProduct::default()
            },
        )
        .await
        .unwrap()
    }

    pub async fn seed_user(svc: &DeskService, email: &str) -> User {
        svc.create_user(
            None,
            &NewUser {
                name: "Test User".into(),
                email: email.into(),
                password: "correct horse".into(),
            },
        )
        .await
        .unwrap()
    }
}
