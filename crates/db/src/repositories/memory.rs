//! Map-backed repositories used by unit and router tests. The running
//! service always stores through SQLite.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use orderdesk_core::aggregation::{CustomerOrder, CustomerOrderPipeline};
use orderdesk_core::domain::customer::{Customer, CustomerId};
use orderdesk_core::domain::order::{Order, OrderId};

use super::{CustomerOrderQuery, CustomerRepository, OrderRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<String, Customer>>,
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id.0).cloned())
    }

    async fn save(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        let taken = customers
            .values()
            .any(|existing| existing.email == customer.email && existing.id != customer.id);
        if taken {
            return Err(RepositoryError::DuplicateKey(format!(
                "customer.email `{}` already exists",
                customer.email
            )));
        }
        customers.insert(customer.id.0.clone(), customer.clone());
        Ok(customer)
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id.0).cloned())
    }

    async fn save(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.0.clone(), order.clone());
        Ok(order)
    }
}

pub struct InMemoryCustomerOrderQuery {
    customers: Arc<InMemoryCustomerRepository>,
    orders: Arc<InMemoryOrderRepository>,
    pipeline: CustomerOrderPipeline,
}

impl InMemoryCustomerOrderQuery {
    pub fn new(
        customers: Arc<InMemoryCustomerRepository>,
        orders: Arc<InMemoryOrderRepository>,
    ) -> Self {
        Self { customers, orders, pipeline: CustomerOrderPipeline::default() }
    }
}

#[async_trait::async_trait]
impl CustomerOrderQuery for InMemoryCustomerOrderQuery {
    async fn customer_orders(&self) -> Result<Vec<CustomerOrder>, RepositoryError> {
        let customers = self.customers.find_all().await?;
        let orders = self.orders.find_all().await?;
        Ok(self.pipeline.evaluate(&customers, &orders))
    }
}
