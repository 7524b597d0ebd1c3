use async_trait::async_trait;
use thiserror::Error;

use orderdesk_core::aggregation::CustomerOrder;
use orderdesk_core::domain::customer::{Customer, CustomerId};
use orderdesk_core::domain::order::{Order, OrderId};
use orderdesk_core::errors::ApplicationError;

pub mod aggregation;
pub mod customer;
pub mod memory;
pub mod order;

pub use aggregation::SqlCustomerOrderQuery;
pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCustomerOrderQuery, InMemoryCustomerRepository, InMemoryOrderRepository};
pub use order::SqlOrderRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::DuplicateKey(db.message().to_string())
            }
            _ => Self::Database(error),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        Self::Persistence(error.to_string())
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    /// Inserts or wholly replaces the customer keyed by its id.
    ///
    /// Fails with [`RepositoryError::DuplicateKey`] when another customer
    /// already owns the email.
    async fn save(&self, customer: Customer) -> Result<Customer, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;
    async fn save(&self, order: Order) -> Result<Order, RepositoryError>;
}

#[async_trait]
pub trait CustomerOrderQuery: Send + Sync {
    async fn customer_orders(&self) -> Result<Vec<CustomerOrder>, RepositoryError>;
}
