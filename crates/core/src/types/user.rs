//! Principal and customer records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// A registered storefront user, as returned by the customer service.
///
/// The backend creates and persists principals; the account facade only
/// reads them, mutates a few fields and writes them back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceUser {
    /// The backend's identifier for this user.
    pub external_id: CustomerId,
    /// Login name.
    pub user_name: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Extensible property bag (e.g. `Phone`).
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl CommerceUser {
    /// Create a principal with only its identifiers set.
    #[must_use]
    pub fn new(external_id: impl Into<CustomerId>, user_name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            user_name: user_name.into(),
            ..Self::default()
        }
    }

    /// Get a property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// Get a string property value.
    #[must_use]
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(serde_json::Value::as_str)
    }

    /// Set (or replace) a property value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// The correlation-only customer for this principal.
    ///
    /// Only the external ID is carried over; no other principal field leaks
    /// into party requests.
    #[must_use]
    pub fn as_customer(&self) -> CommerceCustomer {
        CommerceCustomer::new(self.external_id.clone())
    }
}

/// A customer, identified solely by its external ID.
///
/// Used as the correlation key for party operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceCustomer {
    /// The backend's identifier for this customer.
    pub external_id: CustomerId,
}

impl CommerceCustomer {
    /// Create a new customer reference.
    #[must_use]
    pub fn new(external_id: impl Into<CustomerId>) -> Self {
        Self {
            external_id: external_id.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn principal() -> CommerceUser {
        let mut user = CommerceUser::new("Entity-Customer-1", "storefront\\alice");
        user.first_name = Some("Alice".to_string());
        user.last_name = Some("Smith".to_string());
        user.email = "alice@example.com".to_string();
        user
    }

    #[test]
    fn test_set_property_replaces() {
        let mut user = principal();
        user.set_property("Phone", "555-0100");
        user.set_property("Phone", "555-0199");
        assert_eq!(user.property_str("Phone"), Some("555-0199"));
        assert_eq!(user.properties.len(), 1);
    }

    #[test]
    fn test_as_customer_carries_only_external_id() {
        let customer = principal().as_customer();
        let json = serde_json::to_value(&customer).unwrap();
        assert_eq!(json, serde_json::json!({ "externalId": "Entity-Customer-1" }));
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let user: CommerceUser = serde_json::from_str(
            r#"{
                "externalId": "Entity-Customer-9",
                "userName": "storefront\\bob",
                "firstName": "Bob",
                "email": "bob@example.com",
                "properties": { "Phone": "555-0142" }
            }"#,
        )
        .unwrap();

        assert_eq!(user.external_id.as_str(), "Entity-Customer-9");
        assert_eq!(user.last_name, None);
        assert_eq!(user.property_str("Phone"), Some("555-0142"));
    }
}
