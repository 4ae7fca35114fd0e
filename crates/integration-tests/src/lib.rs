//! Integration tests for Storefront Accounts.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-accounts-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `account_flows` - End-to-end facade flows against in-memory collaborators
//! - `properties` - Property tests over arbitrary backend results
//!
//! The [`fakes`] module provides in-memory implementations of every
//! collaborator the account facade talks to.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

pub mod fakes;

use std::sync::Arc;

use storefront_accounts::{AccountManager, AccountsConfig, Catalog};

use crate::fakes::{InMemoryCarts, InMemoryCredentials, InMemoryCustomerService, Outbox};

/// Shop name every test manager runs against.
pub const SHOP_NAME: &str = "pineapple-test";

/// A manager wired to in-memory collaborators, with handles on each.
pub struct TestContext {
    pub manager: AccountManager,
    pub customers: Arc<InMemoryCustomerService>,
    pub carts: Arc<InMemoryCarts>,
    pub credentials: Arc<InMemoryCredentials>,
    pub outbox: Arc<Outbox>,
}

impl TestContext {
    /// A context with empty collaborators and the untranslated catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(Catalog::new())
    }

    /// A context with empty collaborators and `catalog`.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        let customers = Arc::new(InMemoryCustomerService::default());
        let carts = Arc::new(InMemoryCarts::default());
        let credentials = Arc::new(InMemoryCredentials::default());
        let outbox = Arc::new(Outbox::default());

        let manager = AccountManager::new(
            AccountsConfig::new(SHOP_NAME),
            customers.clone(),
            carts.clone(),
            credentials.clone(),
            outbox.clone(),
            Arc::new(catalog),
        );

        Self {
            manager,
            customers,
            carts,
            credentials,
            outbox,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
