use sqlx::{QueryBuilder, Row, Sqlite};

use orderdesk_core::aggregation::{CustomerOrder, CustomerOrderPipeline, FieldRef};
use orderdesk_core::domain::order::OrderId;

use super::{CustomerOrderQuery, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerOrderQuery {
    pool: DbPool,
    pipeline: CustomerOrderPipeline,
}

impl SqlCustomerOrderQuery {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, pipeline: CustomerOrderPipeline::default() }
    }
}

fn push_ident(builder: &mut QueryBuilder<'_, Sqlite>, ident: &str) {
    builder.push("\"");
    builder.push(ident.replace('"', "\"\""));
    builder.push("\"");
}

/// Renders the pipeline as one SELECT.
///
/// Lookup followed by an unwind of the looked-up array is an inner join:
/// customers without orders produce no row.
pub fn render(pipeline: &CustomerOrderPipeline) -> QueryBuilder<'static, Sqlite> {
    let base = pipeline.collection;
    let joined = pipeline.unwind.path;
    let mut builder = QueryBuilder::new("SELECT ");

    for (index, projection) in pipeline.project.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        let (table, field) = match projection.source {
            FieldRef::Base(field) => (base, field),
            FieldRef::Joined(field) => (joined, field),
        };
        push_ident(&mut builder, table);
        builder.push(".");
        push_ident(&mut builder, field);
        builder.push(" AS ");
        push_ident(&mut builder, projection.alias);
    }

    builder.push(" FROM ");
    push_ident(&mut builder, base);
    builder.push(" INNER JOIN ");
    push_ident(&mut builder, pipeline.lookup.from);
    builder.push(" AS ");
    push_ident(&mut builder, joined);
    builder.push(" ON ");
    push_ident(&mut builder, joined);
    builder.push(".");
    push_ident(&mut builder, pipeline.lookup.foreign_field);
    builder.push(" = ");
    push_ident(&mut builder, base);
    builder.push(".");
    push_ident(&mut builder, pipeline.lookup.local_field);

    builder
}

fn row_to_customer_order(row: &sqlx::sqlite::SqliteRow) -> Result<CustomerOrder, RepositoryError> {
    let customer_name: String =
        row.try_get("customerName").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let order_id: String =
        row.try_get("orderId").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let order_amount: f64 =
        row.try_get("orderAmount").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(CustomerOrder { customer_name, order_id: OrderId(order_id), order_amount })
}

#[async_trait::async_trait]
impl CustomerOrderQuery for SqlCustomerOrderQuery {
    async fn customer_orders(&self) -> Result<Vec<CustomerOrder>, RepositoryError> {
        let mut builder = render(&self.pipeline);
        tracing::debug!(
            event_name = "db.aggregation.customer_orders",
            sql = builder.sql(),
            "running customer/order aggregation"
        );
        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter().map(row_to_customer_order).collect()
    }
}
