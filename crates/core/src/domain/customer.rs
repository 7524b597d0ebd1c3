use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored field names of the `customer` collection.
pub mod fields {
    pub const COLLECTION: &str = "customer";
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<Uuid> for CustomerId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A customer document. `email` is unique across the collection.
///
/// Bodies without an `id` get a freshly generated one on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default = "CustomerId::generate")]
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

impl Customer {
    /// Returns the same customer carrying `id` instead of its current one.
    pub fn with_id(self, id: CustomerId) -> Self {
        Self { id, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::{Customer, CustomerId};

    #[test]
    fn missing_id_is_generated_on_deserialize() {
        let customer: Customer =
            serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com"}"#).expect("decode");

        assert!(uuid::Uuid::parse_str(&customer.id.0).is_ok());
        assert_eq!(customer.name, "Ada");
    }

    #[test]
    fn supplied_id_is_kept_and_serialized_flat() {
        let customer: Customer =
            serde_json::from_str(r#"{"id":"c-1","name":"Ada","email":"ada@example.com"}"#)
                .expect("decode");
        assert_eq!(customer.id, CustomerId("c-1".to_string()));

        let value = serde_json::to_value(&customer).expect("encode");
        assert_eq!(value["id"], "c-1");
    }

    #[test]
    fn with_id_replaces_only_the_id() {
        let customer = Customer {
            id: CustomerId("old".to_string()),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };

        let moved = customer.clone().with_id(CustomerId("new".to_string()));

        assert_eq!(moved.id.0, "new");
        assert_eq!(moved.email, customer.email);
    }
}
