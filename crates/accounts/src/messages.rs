//! System message lookup and logging.
//!
//! Messages the facade synthesizes (when the backend is silent) are looked
//! up by [`MessageKey`] through a [`MessageCatalog`], so storefronts can
//! localize them. Messages on failure paths are forwarded to `tracing` via
//! [`log_system_messages`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use storefront_accounts_core::SystemMessage;

use crate::config::ConfigError;

/// Keys of every system message the facade can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    UserNotFound,
    UserAlreadyExists,
    UserNameForEmailExists,
    InvalidPassword,
    InvalidEmail,
    PasswordRetrievalAnswerInvalid,
    PasswordRetrievalQuestionInvalid,
    UserNameInvalid,
    AuthenticationProviderError,
    UserRejected,
    UnknownMembershipProviderError,
    ChangePasswordError,
    AddAddressError,
    UpdateAddressError,
    RemoveAddressError,
    UpdateUserError,
}

impl MessageKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::UserNotFound,
        Self::UserAlreadyExists,
        Self::UserNameForEmailExists,
        Self::InvalidPassword,
        Self::InvalidEmail,
        Self::PasswordRetrievalAnswerInvalid,
        Self::PasswordRetrievalQuestionInvalid,
        Self::UserNameInvalid,
        Self::AuthenticationProviderError,
        Self::UserRejected,
        Self::UnknownMembershipProviderError,
        Self::ChangePasswordError,
        Self::AddAddressError,
        Self::UpdateAddressError,
        Self::RemoveAddressError,
        Self::UpdateUserError,
    ];

    /// The lookup key, which doubles as the untranslated message text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserNotFound => "User Not Found Error",
            Self::UserAlreadyExists => "User Already Exists",
            Self::UserNameForEmailExists => "User Name For Email Exists",
            Self::InvalidPassword => "Invalid Password Error",
            Self::InvalidEmail => "Invalid Email Error",
            Self::PasswordRetrievalAnswerInvalid => "Password Retrieval Answer Invalid",
            Self::PasswordRetrievalQuestionInvalid => "Password Retrieval Question Invalid",
            Self::UserNameInvalid => "User Name Invalid",
            Self::AuthenticationProviderError => "Authentication Provider Error",
            Self::UserRejected => "User Rejected Error",
            Self::UnknownMembershipProviderError => "Unknown Membership Provider Error",
            Self::ChangePasswordError => "Change Password Error",
            Self::AddAddressError => "Add Address Error",
            Self::UpdateAddressError => "Update Address Error",
            Self::RemoveAddressError => "Remove Address Error",
            Self::UpdateUserError => "Update User Error",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves message keys to user-facing text.
pub trait MessageCatalog: Send + Sync {
    /// Get the localized text for `key`.
    fn system_message(&self, key: MessageKey) -> String;

    /// Get the localized text for `key` as a [`SystemMessage`].
    fn message(&self, key: MessageKey) -> SystemMessage {
        SystemMessage::new(self.system_message(key))
    }
}

/// Message catalog backed by an in-memory table.
///
/// Keys without an entry resolve to their own text, so an empty catalog
/// yields the untranslated English messages.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct CatalogFile(HashMap<String, String>);

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the text for a key.
    #[must_use]
    pub fn with_entry(mut self, key: MessageKey, text: impl Into<String>) -> Self {
        self.entries.insert(key.as_str().to_string(), text.into());
        self
    }

    /// Parse a catalog from a JSON object of `"key": "text"` pairs.
    ///
    /// Unknown keys are kept but never looked up.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Catalog` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let CatalogFile(entries) =
            serde_json::from_str(json).map_err(|e| ConfigError::Catalog(e.to_string()))?;

        for key in entries.keys() {
            if !MessageKey::ALL.iter().any(|k| k.as_str() == key) {
                tracing::debug!(key = %key, "Ignoring unknown system message key");
            }
        }

        Ok(Self { entries })
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Catalog` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Catalog(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

impl MessageCatalog for Catalog {
    fn system_message(&self, key: MessageKey) -> String {
        self.entries
            .get(key.as_str())
            .cloned()
            .unwrap_or_else(|| key.as_str().to_string())
    }
}

/// Forward a result's system messages to the log.
///
/// Each message is logged as its own event, tagged with the facade
/// operation that produced it.
pub fn log_system_messages(operation: &str, messages: &[SystemMessage]) {
    for message in messages {
        tracing::error!(operation, message = %message.message, "System message");
    }
}
