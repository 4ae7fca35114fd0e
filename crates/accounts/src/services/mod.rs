//! The account facade.
//!
//! [`AccountManager`] is split by concern:
//!
//! - `lookup` - Resolve a principal by user name or email
//! - `reconcile` - Tracker identity vs. authenticated principal check
//! - `session` - Login and logout
//! - `parties` - Customer address management
//! - `account` - Registration, passwords and profile updates

mod account;
mod lookup;
mod parties;
mod reconcile;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use reconcile::{Reconciliation, reconcile};

use std::sync::Arc;

use storefront_accounts_core::{ServiceResult, Storefront, SystemMessage};

use crate::cart::CartManager;
use crate::config::AccountsConfig;
use crate::credentials::CredentialStore;
use crate::mail::MailSender;
use crate::messages::{MessageCatalog, MessageKey};
use crate::provider::CustomerServiceProvider;

/// Coordinates authentication, registration, passwords and addresses.
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct AccountManager {
    provider: Arc<dyn CustomerServiceProvider>,
    carts: Arc<dyn CartManager>,
    credentials: Arc<dyn CredentialStore>,
    mailer: Arc<dyn MailSender>,
    catalog: Arc<dyn MessageCatalog>,
    config: AccountsConfig,
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AccountManager {
    /// Create a new account manager.
    #[must_use]
    pub fn new(
        config: AccountsConfig,
        provider: Arc<dyn CustomerServiceProvider>,
        carts: Arc<dyn CartManager>,
        credentials: Arc<dyn CredentialStore>,
        mailer: Arc<dyn MailSender>,
        catalog: Arc<dyn MessageCatalog>,
    ) -> Self {
        Self {
            provider,
            carts,
            credentials,
            mailer,
            catalog,
            config,
        }
    }

    /// The configuration this manager runs with.
    #[must_use]
    pub const fn config(&self) -> &AccountsConfig {
        &self.config
    }

    /// The storefront operations run against.
    #[must_use]
    pub const fn storefront(&self) -> &Storefront {
        &self.config.storefront
    }

    fn message(&self, key: MessageKey) -> SystemMessage {
        self.catalog.message(key)
    }

    /// Give a silent failure the message for `key`.
    fn explain_failure<T>(
        &self,
        mut result: ServiceResult<T>,
        key: MessageKey,
    ) -> ServiceResult<T> {
        if !result.success && !result.has_messages() {
            result.messages.push(self.message(key));
        }
        result
    }
}
