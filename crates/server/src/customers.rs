//! `/customers` endpoints: customer CRUD, order intake and the
//! customer/order aggregation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use orderdesk_core::{errors::DomainError, Customer, CustomerId, CustomerOrder, Order};
use orderdesk_db::repositories::{SqlCustomerOrderQuery, SqlCustomerRepository, SqlOrderRepository};
use orderdesk_db::{
    CustomerOrderQuery, CustomerRepository, DbPool, OrderRepository, RepositoryError,
};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct CustomerState {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    customer_orders: Arc<dyn CustomerOrderQuery>,
}

impl CustomerState {
    pub fn sql(db_pool: DbPool) -> Self {
        Self {
            customers: Arc::new(SqlCustomerRepository::new(db_pool.clone())),
            orders: Arc::new(SqlOrderRepository::new(db_pool.clone())),
            customer_orders: Arc::new(SqlCustomerOrderQuery::new(db_pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use orderdesk_db::repositories::{
            InMemoryCustomerOrderQuery, InMemoryCustomerRepository, InMemoryOrderRepository,
        };

        let customers = Arc::new(InMemoryCustomerRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());
        Self {
            customers: customers.clone(),
            orders: orders.clone(),
            customer_orders: Arc::new(InMemoryCustomerOrderQuery::new(customers, orders)),
        }
    }
}

pub fn router(state: CustomerState) -> Router {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/{id}", put(update_customer))
        .route("/customers/customerAndOrders", get(customer_and_orders))
        .route("/customers/customerOrder", post(create_order))
        .route("/customers/orders", get(list_orders))
        .with_state(state)
}

/// Stores a new customer under a freshly generated id, whatever id the
/// body carried.
async fn create_customer(
    State(state): State<CustomerState>,
    Json(customer): Json<Customer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = customer.with_id(CustomerId::generate());
    let email = customer.email.clone();

    match state.customers.save(customer).await {
        Ok(saved) => {
            info!(
                event_name = "customers.created",
                customer_id = %saved.id,
                "customer created"
            );
            Ok((StatusCode::CREATED, Json(saved)))
        }
        Err(RepositoryError::DuplicateKey(_)) => Err(DomainError::DuplicateEmail { email }.into()),
        Err(error) => Err(error.into()),
    }
}

async fn list_customers(
    State(state): State<CustomerState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.customers.find_all().await?))
}

/// Replaces an existing customer. The path id always wins over the body id.
async fn update_customer(
    State(state): State<CustomerState>,
    Path(id): Path<Uuid>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, ApiError> {
    let id = CustomerId::from(id);
    if state.customers.find_by_id(&id).await?.is_none() {
        return Err(DomainError::CustomerNotFound(id.0).into());
    }

    let saved = state.customers.save(customer.with_id(id)).await?;
    info!(event_name = "customers.updated", customer_id = %saved.id, "customer replaced");
    Ok(Json(saved))
}

async fn customer_and_orders(
    State(state): State<CustomerState>,
) -> Result<Json<Vec<CustomerOrder>>, ApiError> {
    Ok(Json(state.customer_orders.customer_orders().await?))
}

/// Stores an order as received, keeping a client-supplied id.
async fn create_order(
    State(state): State<CustomerState>,
    Json(order): Json<Order>,
) -> Result<Json<Order>, ApiError> {
    let saved = state.orders.save(order).await?;
    info!(
        event_name = "orders.created",
        order_id = %saved.id.0,
        customer_id = %saved.customer_id,
        "order stored"
    );
    Ok(Json(saved))
}

async fn list_orders(State(state): State<CustomerState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.find_all().await?))
}
