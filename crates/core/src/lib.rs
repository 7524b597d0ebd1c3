pub mod aggregation;
pub mod config;
pub mod domain;
pub mod errors;

pub use aggregation::{CustomerOrder, CustomerOrderPipeline};
pub use domain::customer::{Customer, CustomerId};
pub use domain::order::{Order, OrderId};
pub use errors::{ApplicationError, DomainError, InterfaceError, DUPLICATE_EMAIL_MESSAGE};
