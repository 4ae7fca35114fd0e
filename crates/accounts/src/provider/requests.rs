//! Request types sent to the customer service provider.
//!
//! Requests carrying passwords hold them as `SecretString` and are
//! deliberately not serializable.

use secrecy::SecretString;
use serde::Serialize;
use storefront_accounts_core::{CommerceCustomer, CommerceUser, Party};

/// Look up a user by user name (or email).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserRequest {
    pub user_name: String,
}

impl GetUserRequest {
    #[must_use]
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

/// Create a user in a given shop.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub user_name: String,
    pub password: SecretString,
    pub email: String,
    pub shop_name: String,
}

/// Write back a modified user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user: CommerceUser,
}

/// Change a user's password.
#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub user_name: String,
    pub current_password: SecretString,
    pub new_password: SecretString,
}

/// List a customer's parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPartiesRequest {
    pub customer: CommerceCustomer,
}

/// Add, update or remove a batch of a customer's parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartiesRequest {
    pub customer: CommerceCustomer,
    pub parties: Vec<Party>,
}

impl PartiesRequest {
    #[must_use]
    pub const fn new(customer: CommerceCustomer, parties: Vec<Party>) -> Self {
        Self { customer, parties }
    }
}
