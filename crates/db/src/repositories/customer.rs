use sqlx::Row;

use orderdesk_core::domain::customer::{Customer, CustomerId};

use super::{CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: String = row.try_get("_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String =
        row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Customer { id: CustomerId(id), name, email })
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query("SELECT \"_id\", name, email FROM customer")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_customer).collect()
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query("SELECT \"_id\", name, email FROM customer WHERE \"_id\" = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        sqlx::query(
            "INSERT INTO customer (\"_id\", name, email)
             VALUES (?, ?, ?)
             ON CONFLICT(\"_id\") DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email",
        )
        .bind(&customer.id.0)
        .bind(&customer.name)
        .bind(&customer.email)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use orderdesk_core::domain::customer::{Customer, CustomerId};

    use super::SqlCustomerRepository;
    use crate::repositories::{CustomerRepository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn customer(id: &str, email: &str) -> Customer {
        Customer {
            id: CustomerId(id.to_string()),
            name: "Ada".to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_find_by_id() {
        let repo = SqlCustomerRepository::new(setup().await);
        let saved = repo.save(customer("c-1", "ada@example.com")).await.expect("save");

        let found = repo.find_by_id(&saved.id).await.expect("find");

        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_missing_customer() {
        let repo = SqlCustomerRepository::new(setup().await);

        let found = repo.find_by_id(&CustomerId("nope".to_string())).await.expect("find");

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn save_replaces_existing_document_by_id() {
        let repo = SqlCustomerRepository::new(setup().await);
        repo.save(customer("c-1", "ada@example.com")).await.expect("insert");

        let replacement = Customer {
            id: CustomerId("c-1".to_string()),
            name: "Ada Lovelace".to_string(),
            email: "lovelace@example.com".to_string(),
        };
        repo.save(replacement.clone()).await.expect("replace");

        let all = repo.find_all().await.expect("find all");
        assert_eq!(all, vec![replacement]);
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_duplicate_key() {
        let repo = SqlCustomerRepository::new(setup().await);
        repo.save(customer("c-1", "ada@example.com")).await.expect("first save");

        let error = repo.save(customer("c-2", "ada@example.com")).await.expect_err("duplicate");

        assert!(matches!(error, RepositoryError::DuplicateKey(_)), "got {error:?}");
        assert_eq!(repo.find_all().await.expect("find all").len(), 1);
    }

    #[tokio::test]
    async fn resaving_same_customer_with_own_email_is_allowed() {
        let repo = SqlCustomerRepository::new(setup().await);
        repo.save(customer("c-1", "ada@example.com")).await.expect("first save");

        repo.save(customer("c-1", "ada@example.com")).await.expect("second save");
    }
}
