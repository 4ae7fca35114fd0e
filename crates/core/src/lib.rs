//! Storefront Accounts Core - Shared types library.
//!
//! This crate provides the data carriers exchanged between the account
//! facade (`storefront-accounts`) and the customer service backend:
//!
//! - principals, customers and parties (addresses)
//! - the backend `ServiceResult` with its ordered system messages
//! - the `ManagerResponse` envelope returned by every facade operation
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no logging, no backend
//! clients. Everything here is a transient request/response DTO; the backend
//! owns persistence.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, user and party records, results and envelopes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
