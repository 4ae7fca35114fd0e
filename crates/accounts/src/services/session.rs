//! Login and logout.

use secrecy::SecretString;

use super::AccountManager;
use super::reconcile::{Reconciliation, reconcile};
use crate::context::RequestContext;

impl AccountManager {
    /// Authenticate a visitor and carry their anonymous cart over.
    ///
    /// On a successful credential check the visitor's current cart is
    /// fetched, the tracker is bound to `user_name`, the visitor is marked as
    /// just logged in, the tracker claim is reconciled with the active
    /// principal and the cart is merged under the pre-login customer ID.
    ///
    /// Returns exactly what the authentication provider returned. Cart and
    /// reconciliation problems are logged, never surfaced: a mismatch forces
    /// a full [`logout`](Self::logout) but the call still returns `true`.
    pub fn login(
        &self,
        ctx: &mut RequestContext<'_>,
        user_name: &str,
        password: &SecretString,
        persistent: bool,
    ) -> bool {
        let prior_customer_id = ctx.visitor.customer_id();

        let authenticated = ctx.auth.login(user_name, password, persistent);
        if !authenticated {
            tracing::info!(user_name, "Login rejected");
            return false;
        }

        let cart = self
            .carts
            .current_cart(&*ctx.visitor, self.storefront())
            .inspect_err(|e| {
                tracing::warn!(error = %e, customer_id = %prior_customer_id, "Failed to fetch cart at login");
            })
            .ok();

        let source = self.config.identity_source.as_str();
        ctx.tracker.identify_as(source, user_name);
        ctx.visitor.user_just_logged_in();

        let active = ctx.auth.current_user_name();
        let reconciliation = reconcile(&*ctx.tracker, source, active.as_deref());
        let torn_down = reconciliation.is_mismatch();
        if let Reconciliation::Mismatch { tracked, active } = reconciliation {
            tracing::warn!(
                tracked = %tracked,
                active = active.as_deref().unwrap_or("<none>"),
                "Tracker identity does not match authenticated user, forcing logout"
            );
            ctx.tracker.clear_identity(source);
            self.logout(ctx);
        }

        if let Some(cart) = cart {
            if let Err(e) = self.carts.merge_carts(
                self.storefront(),
                &*ctx.visitor,
                &prior_customer_id,
                &cart,
            ) {
                tracing::warn!(error = %e, cart_id = %cart.external_id, "Failed to merge cart at login");
            }
        }

        if torn_down {
            tracing::warn!(user_name, "Login accepted but session torn down");
        } else {
            tracing::info!(user_name, "User logged in");
        }
        true
    }

    /// Tear down the visitor's session and sign out.
    ///
    /// Ends the tracked visit, clears, abandons and empties the session,
    /// blanks the session cookie and signs out, in that order. Safe to call
    /// on an already torn-down session.
    pub fn logout(&self, ctx: &mut RequestContext<'_>) {
        ctx.tracker.end_visit(true);

        ctx.session.clear();
        ctx.session.abandon();
        ctx.session.remove_all();
        ctx.session.set_cookie(&self.config.session_cookie_name, "");

        ctx.auth.logout();
        tracing::debug!("Session torn down");
    }
}
