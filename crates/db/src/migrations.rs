use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] =
        &["customer", "orders", "idx_customer_email", "idx_orders_customer_id"];

    #[tokio::test]
    async fn migrations_create_collections_and_indexes() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for name in MANAGED_SCHEMA_OBJECTS {
            let count = sqlx::query("SELECT COUNT(*) AS count FROM sqlite_master WHERE name = ?")
                .bind(name)
                .fetch_one(&pool)
                .await
                .expect("query sqlite_master")
                .get::<i64, _>("count");
            assert_eq!(count, 1, "expected schema object `{name}` after migration");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn email_index_is_unique() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let unique: i64 = sqlx::query_scalar(
            "SELECT \"unique\" FROM pragma_index_list('customer') \
             WHERE name = 'idx_customer_email'",
        )
        .fetch_one(&pool)
        .await
        .expect("index list");
        assert_eq!(unique, 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run should be a no-op");
        pool.close().await;
    }
}
