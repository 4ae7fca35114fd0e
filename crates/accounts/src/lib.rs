//! Storefront Accounts
//!
//! Account orchestration for a storefront: login and logout, registration,
//! password changes and resets, and customer address (party) management.
//!
//! # Architecture
//!
//! - [`AccountManager`] is the facade. It resolves the customer, calls the
//!   backend [`CustomerServiceProvider`], normalizes the result into a
//!   [`ManagerResponse`](storefront_accounts_core::ManagerResponse) and logs
//!   failures. No operation returns `Err`; every failure becomes a failed
//!   [`ServiceResult`](storefront_accounts_core::ServiceResult) carrying at
//!   least one system message.
//! - Long-lived collaborators (provider, cart manager, credential store,
//!   mailer, message catalog) are shared trait objects held by the manager.
//! - Request-scoped collaborators (visitor, tracker, session, authenticator)
//!   are borrowed per call through a [`RequestContext`].
//!
//! # Modules
//!
//! - `services` - The facade and its operations
//! - `provider` - Customer service backend contract
//! - `context` - Request-scoped collaborator contracts
//! - `cart`, `credentials`, `mail` - Remaining collaborator contracts
//! - `messages` - Localized system messages and failure logging
//! - `config` - Environment configuration
//! - `telemetry` - Tracing subscriber setup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod context;
pub mod credentials;
pub mod mail;
pub mod messages;
pub mod provider;
pub mod services;
pub mod telemetry;

pub use cart::{CartError, CartManager};
pub use config::{AccountsConfig, ConfigError, SmtpConfig};
pub use context::{Authenticator, RequestContext, SessionStore, VisitorContext, VisitorTracker};
pub use credentials::{CredentialStore, CredentialStoreError};
#[cfg(feature = "smtp")]
pub use mail::SmtpMailer;
pub use mail::{MailError, MailSender, MailTemplate};
pub use messages::{Catalog, MessageCatalog, MessageKey};
pub use provider::{CreateUserStatus, CustomerServiceProvider, ProviderError};
pub use services::{AccountManager, Reconciliation};
