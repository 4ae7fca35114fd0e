//! Core types for Storefront Accounts.
//!
//! This module provides type-safe wrappers for account domain concepts.

pub mod id;
pub mod party;
pub mod response;
pub mod user;

pub use id::*;
pub use party::{Cart, Party, Storefront};
pub use response::{ManagerResponse, ServiceResult, SystemMessage};
pub use user::{CommerceCustomer, CommerceUser};
