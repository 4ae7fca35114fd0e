//! Credential store contract.
//!
//! Password resets bypass the customer service and go straight to the
//! credential (membership) store, which maps emails to user names and issues
//! temporary passwords.

use secrecy::SecretString;
use thiserror::Error;

/// Errors raised by the credential store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// No user is registered under the email address.
    #[error("no user is registered for {0}")]
    UnknownEmail(String),

    /// The store refused to reset the password.
    #[error("password reset rejected: {0}")]
    ResetRejected(String),

    /// The store failed.
    #[error("credential store error: {0}")]
    Store(String),
}

/// Maps emails to user names and resets passwords.
pub trait CredentialStore: Send + Sync {
    /// The user name registered for `email`, if any.
    ///
    /// # Errors
    ///
    /// Returns `CredentialStoreError` if the lookup fails.
    fn user_name_by_email(&self, email: &str) -> Result<Option<String>, CredentialStoreError>;

    /// Reset the user's password, returning the new temporary password.
    ///
    /// # Errors
    ///
    /// Returns `CredentialStoreError` if the reset fails.
    fn reset_password(&self, user_name: &str) -> Result<SecretString, CredentialStoreError>;
}
