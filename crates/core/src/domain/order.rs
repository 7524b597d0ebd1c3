use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::CustomerId;

/// Stored field names of the `orders` collection.
pub mod fields {
    pub const COLLECTION: &str = "orders";
    pub const ID: &str = "_id";
    pub const CUSTOMER_ID: &str = "customerId";
    pub const AMOUNT: &str = "amount";
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// An order document. `customer_id` is a loose reference; nothing checks
/// that the customer exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default = "OrderId::generate")]
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub amount: f64,
}
