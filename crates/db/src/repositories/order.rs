use sqlx::Row;

use orderdesk_core::domain::customer::CustomerId;
use orderdesk_core::domain::order::{Order, OrderId};

use super::{OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<Order, RepositoryError> {
    let id: String = row.try_get("_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_id: String =
        row.try_get("customerId").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let amount: f64 = row.try_get("amount").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Order { id: OrderId(id), customer_id: CustomerId(customer_id), amount })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query("SELECT \"_id\", \"customerId\", amount FROM orders")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_order).collect()
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row =
            sqlx::query("SELECT \"_id\", \"customerId\", amount FROM orders WHERE \"_id\" = ?")
                .bind(&id.0)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_order(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, order: Order) -> Result<Order, RepositoryError> {
        sqlx::query(
            "INSERT INTO orders (\"_id\", \"customerId\", amount)
             VALUES (?, ?, ?)
             ON CONFLICT(\"_id\") DO UPDATE SET
                 \"customerId\" = excluded.\"customerId\",
                 amount = excluded.amount",
        )
        .bind(&order.id.0)
        .bind(&order.customer_id.0)
        .bind(order.amount)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use orderdesk_core::domain::customer::CustomerId;
    use orderdesk_core::domain::order::{Order, OrderId};

    use super::SqlOrderRepository;
    use crate::repositories::OrderRepository;
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlOrderRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlOrderRepository::new(pool)
    }

    #[tokio::test]
    async fn save_preserves_client_supplied_id() {
        let repo = repo().await;
        let order = Order {
            id: OrderId("client-chosen".to_string()),
            customer_id: CustomerId("c-1".to_string()),
            amount: 42.75,
        };

        repo.save(order.clone()).await.expect("save");

        let found = repo.find_by_id(&OrderId("client-chosen".to_string())).await.expect("find");
        assert_eq!(found, Some(order));
    }

    #[tokio::test]
    async fn orders_for_unknown_customers_are_accepted() {
        let repo = repo().await;
        let order = Order {
            id: OrderId::generate(),
            customer_id: CustomerId("no-such-customer".to_string()),
            amount: 1.0,
        };

        repo.save(order).await.expect("reference is not enforced");
        assert_eq!(repo.find_all().await.expect("find all").len(), 1);
    }

    #[tokio::test]
    async fn save_overwrites_order_with_same_id() {
        let repo = repo().await;
        let first = Order {
            id: OrderId("o-1".to_string()),
            customer_id: CustomerId("c-1".to_string()),
            amount: 1.0,
        };
        let second = Order { amount: 2.5, ..first.clone() };

        repo.save(first).await.expect("insert");
        repo.save(second.clone()).await.expect("replace");

        assert_eq!(repo.find_all().await.expect("find all"), vec![second]);
    }
}
