//! Customer service provider contract.
//!
//! The backend that owns customer records. Every operation takes a request
//! and returns a [`ServiceResult`] (success flag, optional payload, system
//! messages). Failures the backend can't express as a result surface as
//! [`ProviderError`]; the facade converts those into failure results at its
//! operation boundary.

mod requests;

pub use requests::*;

use serde::{Deserialize, Serialize};
use storefront_accounts_core::{CommerceUser, Party, ServiceResult};
use thiserror::Error;

/// Result of looking up a user.
pub type GetUserResult = ServiceResult<CommerceUser>;
/// Result of creating a user.
pub type CreateUserResult = ServiceResult<CommerceUser>;
/// Result of updating a user.
pub type UpdateUserResult = ServiceResult<CommerceUser>;
/// Result of a password change or reset.
pub type UpdatePasswordResult = ServiceResult<()>;
/// Result of listing a customer's parties.
pub type GetPartiesResult = ServiceResult<Vec<Party>>;
/// Result of adding parties to a customer.
pub type AddPartiesResult = ServiceResult<()>;
/// Result of updating or removing a customer's parties.
pub type CustomerResult = ServiceResult<()>;

/// Status codes reported when the credential store rejects a new user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CreateUserStatus {
    Success,
    InvalidUserName,
    InvalidPassword,
    InvalidQuestion,
    InvalidAnswer,
    InvalidEmail,
    DuplicateUserName,
    DuplicateEmail,
    UserRejected,
    InvalidProviderUserKey,
    DuplicateProviderUserKey,
    ProviderError,
    /// A status this version does not know about.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for CreateUserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Errors a customer service provider can raise instead of returning a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The credential store refused to create the user.
    #[error("user creation rejected: {0}")]
    CredentialCreation(CreateUserStatus),

    /// The backend could not be reached.
    #[error("customer service unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Convert into a failed result carrying the error text.
    #[must_use]
    pub fn into_result<T>(self) -> ServiceResult<T> {
        ServiceResult::failed().with_message(self.to_string())
    }
}

/// Backend that owns customer records and credentials.
///
/// Implementations are shared across requests and must be thread-safe.
pub trait CustomerServiceProvider: Send + Sync {
    /// Look up a user by user name or email.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn get_user(&self, request: &GetUserRequest) -> Result<GetUserResult, ProviderError>;

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::CredentialCreation` when the credential store
    /// rejects the user, or another `ProviderError` if the backend fails.
    fn create_user(&self, request: &CreateUserRequest) -> Result<CreateUserResult, ProviderError>;

    /// Write back a modified user.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn update_user(&self, request: &UpdateUserRequest) -> Result<UpdateUserResult, ProviderError>;

    /// Change a user's password.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn update_password(
        &self,
        request: &UpdatePasswordRequest,
    ) -> Result<UpdatePasswordResult, ProviderError>;

    /// List a customer's parties.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn get_parties(&self, request: &GetPartiesRequest) -> Result<GetPartiesResult, ProviderError>;

    /// Add parties to a customer.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn add_parties(&self, request: &PartiesRequest) -> Result<AddPartiesResult, ProviderError>;

    /// Update a customer's parties.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn update_parties(&self, request: &PartiesRequest) -> Result<CustomerResult, ProviderError>;

    /// Remove parties from a customer.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the backend fails outright.
    fn remove_parties(&self, request: &PartiesRequest) -> Result<CustomerResult, ProviderError>;
}
