//! The customer/order aggregation.
//!
//! The pipeline is fixed: join `orders` onto `customer` by customer id,
//! flatten to one row per (customer, order) pair, then project three fields.
//! Storage backends either render it (SQL) or evaluate it over loaded
//! documents (in-memory).

use serde::{Deserialize, Serialize};

use crate::domain::customer::{self, Customer};
use crate::domain::order::{self, Order, OrderId};

/// One joined row produced by the aggregation. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    pub customer_name: String,
    pub order_id: OrderId,
    pub order_amount: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup {
    pub from: &'static str,
    pub local_field: &'static str,
    pub foreign_field: &'static str,
    pub as_field: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unwind {
    pub path: &'static str,
}

/// Where a projected value is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRef {
    /// A field of the base collection document.
    Base(&'static str),
    /// A field of the unwound joined document.
    Joined(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projection {
    pub source: FieldRef,
    pub alias: &'static str,
}

impl Projection {
    pub const fn new(source: FieldRef, alias: &'static str) -> Self {
        Self { source, alias }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerOrderPipeline {
    pub collection: &'static str,
    pub lookup: Lookup,
    pub unwind: Unwind,
    pub project: [Projection; 3],
}

impl Default for CustomerOrderPipeline {
    fn default() -> Self {
        Self {
            collection: customer::fields::COLLECTION,
            lookup: Lookup {
                from: order::fields::COLLECTION,
                local_field: customer::fields::ID,
                foreign_field: order::fields::CUSTOMER_ID,
                as_field: order::fields::COLLECTION,
            },
            unwind: Unwind { path: order::fields::COLLECTION },
            project: [
                Projection::new(FieldRef::Base(customer::fields::NAME), "customerName"),
                Projection::new(FieldRef::Joined(order::fields::ID), "orderId"),
                Projection::new(FieldRef::Joined(order::fields::AMOUNT), "orderAmount"),
            ],
        }
    }
}

impl CustomerOrderPipeline {
    /// Runs the pipeline over documents already loaded in memory.
    ///
    /// Customers without orders and orders without a customer produce no rows.
    pub fn evaluate(&self, customers: &[Customer], orders: &[Order]) -> Vec<CustomerOrder> {
        customers
            .iter()
            .flat_map(|customer| {
                orders.iter().filter(move |order| order.customer_id == customer.id).map(
                    move |order| CustomerOrder {
                        customer_name: customer.name.clone(),
                        order_id: order.id.clone(),
                        order_amount: order.amount,
                    },
                )
            })
            .collect()
    }
}
