//! Cart manager contract.
//!
//! Login carries the anonymous visitor's cart over to the authenticated
//! session: the current cart is fetched right after the credential check and
//! merged under the pre-login customer ID once identity is settled.

use storefront_accounts_core::{Cart, CustomerId, Storefront};
use thiserror::Error;

use crate::context::VisitorContext;

/// Errors raised by the cart manager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// No cart exists for the visitor.
    #[error("cart not found")]
    NotFound,

    /// The cart backend failed.
    #[error("cart service error: {0}")]
    Service(String),
}

/// Retrieves and merges shopping carts.
pub trait CartManager: Send + Sync {
    /// Get the visitor's current cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart cannot be retrieved.
    fn current_cart(
        &self,
        visitor: &dyn VisitorContext,
        storefront: &Storefront,
    ) -> Result<Cart, CartError>;

    /// Merge the cart held under `prior_customer_id` into the visitor's
    /// authenticated cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the merge fails.
    fn merge_carts(
        &self,
        storefront: &Storefront,
        visitor: &dyn VisitorContext,
        prior_customer_id: &CustomerId,
        cart: &Cart,
    ) -> Result<Cart, CartError>;
}
