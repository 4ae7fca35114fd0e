//! Request-scoped collaborators.
//!
//! The visitor, its tracked identity, the HTTP session and the
//! authentication provider all belong to a single inbound request. They are
//! handed to facade operations explicitly through a [`RequestContext`]
//! instead of being reached through process-wide "current" singletons.
//!
//! Every teardown method here must be safe to call on an already torn-down
//! session: logout runs unconditionally, including as a side effect of a
//! failed identity reconciliation during login.

use secrecy::SecretString;
use storefront_accounts_core::CustomerId;

/// The visitor making the current request.
pub trait VisitorContext {
    /// The visitor's customer correlation ID.
    ///
    /// Before login this is the anonymous ID the visitor's cart is keyed by.
    fn customer_id(&self) -> CustomerId;

    /// The user name of the logged-in visitor (empty when anonymous).
    fn user_name(&self) -> String;

    /// Record that the visitor has just authenticated.
    fn user_just_logged_in(&mut self);
}

/// Tracks the visitor across requests and records identity claims.
pub trait VisitorTracker {
    /// Bind the tracked contact to `identifier` under `source`.
    fn identify_as(&mut self, source: &str, identifier: &str);

    /// The identifier bound under `source`, if any.
    ///
    /// Source tags compare case-insensitively.
    fn identity(&self, source: &str) -> Option<String>;

    /// Remove the identifier bound under `source`.
    fn clear_identity(&mut self, source: &str);

    /// End the tracked visit, optionally forgetting the visitor.
    fn end_visit(&mut self, clear_visitor: bool);
}

/// The server-side session of the current request.
pub trait SessionStore {
    /// Clear all session-scoped data.
    fn clear(&mut self);

    /// Abandon the session so it is not reused.
    fn abandon(&mut self);

    /// Remove every remaining session entry.
    fn remove_all(&mut self);

    /// Set a response cookie.
    fn set_cookie(&mut self, name: &str, value: &str);
}

/// Verifies credentials and holds the authenticated principal of the request.
pub trait Authenticator {
    /// Check credentials and, on success, sign the user in.
    fn login(&mut self, user_name: &str, password: &SecretString, persistent: bool) -> bool;

    /// Sign the current user out.
    fn logout(&mut self);

    /// Name of the principal active for this request, if any.
    fn current_user_name(&self) -> Option<String>;
}

/// Request-scoped collaborators for one facade call.
pub struct RequestContext<'a> {
    pub visitor: &'a mut dyn VisitorContext,
    pub tracker: &'a mut dyn VisitorTracker,
    pub session: &'a mut dyn SessionStore,
    pub auth: &'a mut dyn Authenticator,
}

impl std::fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("customer_id", &self.visitor.customer_id())
            .field("user_name", &self.visitor.user_name())
            .finish_non_exhaustive()
    }
}
