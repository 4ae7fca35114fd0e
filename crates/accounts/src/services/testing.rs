//! Mock collaborators for the facade's unit tests.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use storefront_accounts_core::{
    Cart, CartId, CommerceUser, CustomerId, Party, ServiceResult, Storefront,
};
use tracing_subscriber::layer::SubscriberExt;

use super::AccountManager;
use crate::cart::{CartError, CartManager};
use crate::config::AccountsConfig;
use crate::context::{Authenticator, RequestContext, SessionStore, VisitorContext, VisitorTracker};
use crate::credentials::{CredentialStore, CredentialStoreError};
use crate::mail::{MailError, MailSender, MailTemplate};
use crate::messages::Catalog;
use crate::provider::{
    AddPartiesResult, CreateUserRequest, CreateUserResult, CustomerResult, CustomerServiceProvider,
    GetPartiesRequest, GetPartiesResult, GetUserRequest, GetUserResult, PartiesRequest,
    ProviderError, UpdatePasswordRequest, UpdatePasswordResult, UpdateUserRequest,
    UpdateUserResult,
};

pub fn alice() -> CommerceUser {
    let mut user = CommerceUser::new("cust-alice", "alice");
    user.email = "alice@example.com".to_string();
    user.first_name = Some("Alice".to_string());
    user.last_name = Some("Liddell".to_string());
    user
}

// =============================================================================
// Long-lived collaborators
// =============================================================================

/// Customer service returning canned results and recording requests.
pub struct MockProvider {
    pub user: Result<GetUserResult, ProviderError>,
    pub create: Result<CreateUserResult, ProviderError>,
    pub update_user: Result<UpdateUserResult, ProviderError>,
    pub update_password: Result<UpdatePasswordResult, ProviderError>,
    pub parties: Result<GetPartiesResult, ProviderError>,
    pub add_parties: Result<AddPartiesResult, ProviderError>,
    pub change_parties: Result<CustomerResult, ProviderError>,
    pub calls: Mutex<Vec<&'static str>>,
    pub updated_users: Mutex<Vec<CommerceUser>>,
    pub party_requests: Mutex<Vec<PartiesRequest>>,
    pub shop_names: Mutex<Vec<String>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            user: Ok(ServiceResult::ok(alice())),
            create: Ok(ServiceResult::ok(alice())),
            update_user: Ok(ServiceResult::ok(alice())),
            update_password: Ok(ServiceResult::ok_empty()),
            parties: Ok(ServiceResult::ok(vec![Party::reference("addr-1")])),
            add_parties: Ok(ServiceResult::ok_empty()),
            change_parties: Ok(ServiceResult::ok_empty()),
            calls: Mutex::new(Vec::new()),
            updated_users: Mutex::new(Vec::new()),
            party_requests: Mutex::new(Vec::new()),
            shop_names: Mutex::new(Vec::new()),
        }
    }
}

impl MockProvider {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CustomerServiceProvider for MockProvider {
    fn get_user(&self, _request: &GetUserRequest) -> Result<GetUserResult, ProviderError> {
        self.record("get_user");
        self.user.clone()
    }

    fn create_user(&self, request: &CreateUserRequest) -> Result<CreateUserResult, ProviderError> {
        self.record("create_user");
        self.shop_names.lock().unwrap().push(request.shop_name.clone());
        self.create.clone()
    }

    fn update_user(&self, request: &UpdateUserRequest) -> Result<UpdateUserResult, ProviderError> {
        self.record("update_user");
        self.updated_users.lock().unwrap().push(request.user.clone());
        self.update_user.clone()
    }

    fn update_password(
        &self,
        _request: &UpdatePasswordRequest,
    ) -> Result<UpdatePasswordResult, ProviderError> {
        self.record("update_password");
        self.update_password.clone()
    }

    fn get_parties(&self, _request: &GetPartiesRequest) -> Result<GetPartiesResult, ProviderError> {
        self.record("get_parties");
        self.parties.clone()
    }

    fn add_parties(&self, request: &PartiesRequest) -> Result<AddPartiesResult, ProviderError> {
        self.record("add_parties");
        self.party_requests.lock().unwrap().push(request.clone());
        self.add_parties.clone()
    }

    fn update_parties(&self, request: &PartiesRequest) -> Result<CustomerResult, ProviderError> {
        self.record("update_parties");
        self.party_requests.lock().unwrap().push(request.clone());
        self.change_parties.clone()
    }

    fn remove_parties(&self, request: &PartiesRequest) -> Result<CustomerResult, ProviderError> {
        self.record("remove_parties");
        self.party_requests.lock().unwrap().push(request.clone());
        self.change_parties.clone()
    }
}

/// Cart manager that hands out a fixed cart and records merges.
#[derive(Clone, Default)]
pub struct MockCarts {
    error: Option<CartError>,
    merged: Arc<Mutex<Vec<CustomerId>>>,
}

impl MockCarts {
    pub fn failing(error: CartError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn merged(&self) -> Vec<CustomerId> {
        self.merged.lock().unwrap().clone()
    }
}

impl CartManager for MockCarts {
    fn current_cart(
        &self,
        visitor: &dyn VisitorContext,
        _storefront: &Storefront,
    ) -> Result<Cart, CartError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(Cart {
            external_id: CartId::new("cart-1"),
            customer_id: Some(visitor.customer_id()),
            line_count: 2,
        })
    }

    fn merge_carts(
        &self,
        _storefront: &Storefront,
        _visitor: &dyn VisitorContext,
        prior_customer_id: &CustomerId,
        cart: &Cart,
    ) -> Result<Cart, CartError> {
        self.merged.lock().unwrap().push(prior_customer_id.clone());
        Ok(cart.clone())
    }
}

/// Credential store with a single registered email.
pub struct MockCredentials {
    pub user_name: Option<String>,
    pub reset_error: Option<CredentialStoreError>,
}

impl Default for MockCredentials {
    fn default() -> Self {
        Self {
            user_name: Some("alice".to_string()),
            reset_error: None,
        }
    }
}

impl CredentialStore for MockCredentials {
    fn user_name_by_email(&self, _email: &str) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.user_name.clone())
    }

    fn reset_password(&self, _user_name: &str) -> Result<SecretString, CredentialStoreError> {
        match &self.reset_error {
            Some(error) => Err(error.clone()),
            None => Ok(SecretString::from("tmp-Qx81")),
        }
    }
}

/// Mailer recording what it was asked to send.
#[derive(Clone, Default)]
pub struct MockMailer {
    failure: Option<String>,
    sent: Arc<Mutex<Vec<MailTemplate>>>,
}

impl MockMailer {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<MailTemplate> {
        self.sent.lock().unwrap().clone()
    }
}

impl MailSender for MockMailer {
    fn send(&self, mail: &MailTemplate) -> Result<(), MailError> {
        if let Some(reason) = &self.failure {
            return Err(MailError::Transport(reason.clone()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

// =============================================================================
// Manager constructors
// =============================================================================

pub fn build(
    provider: MockProvider,
    carts: MockCarts,
    credentials: MockCredentials,
    mailer: MockMailer,
    catalog: Catalog,
) -> (AccountManager, Arc<MockProvider>) {
    let provider = Arc::new(provider);
    let manager = AccountManager::new(
        AccountsConfig::new("storefront"),
        provider.clone(),
        Arc::new(carts),
        Arc::new(credentials),
        Arc::new(mailer),
        Arc::new(catalog),
    );
    (manager, provider)
}

pub fn manager(provider: MockProvider) -> AccountManager {
    build(
        provider,
        MockCarts::default(),
        MockCredentials::default(),
        MockMailer::default(),
        Catalog::new(),
    )
    .0
}

pub fn manager_with_carts(provider: MockProvider, carts: MockCarts) -> AccountManager {
    build(
        provider,
        carts,
        MockCredentials::default(),
        MockMailer::default(),
        Catalog::new(),
    )
    .0
}

pub fn manager_with_catalog(provider: MockProvider, catalog: Catalog) -> AccountManager {
    build(
        provider,
        MockCarts::default(),
        MockCredentials::default(),
        MockMailer::default(),
        catalog,
    )
    .0
}

/// Manager plus a handle on its provider for inspecting recorded calls.
pub fn observed(provider: MockProvider) -> (AccountManager, Arc<MockProvider>) {
    build(
        provider,
        MockCarts::default(),
        MockCredentials::default(),
        MockMailer::default(),
        Catalog::new(),
    )
}

// =============================================================================
// Request-scoped fakes
// =============================================================================

/// Ordered record of teardown calls shared by the request fakes.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

pub struct FakeVisitor {
    pub customer_id: CustomerId,
    pub user_name: String,
    pub just_logged_in: bool,
}

impl VisitorContext for FakeVisitor {
    fn customer_id(&self) -> CustomerId {
        self.customer_id.clone()
    }

    fn user_name(&self) -> String {
        self.user_name.clone()
    }

    fn user_just_logged_in(&mut self) {
        self.just_logged_in = true;
    }
}

pub struct FakeTracker {
    identities: Vec<(String, String)>,
    journal: Journal,
}

impl FakeTracker {
    pub const fn new(journal: Journal) -> Self {
        Self {
            identities: Vec::new(),
            journal,
        }
    }

    pub fn identity_of(&self, source: &str) -> Option<String> {
        self.identity(source)
    }
}

impl VisitorTracker for FakeTracker {
    fn identify_as(&mut self, source: &str, identifier: &str) {
        self.identities.retain(|(s, _)| !s.eq_ignore_ascii_case(source));
        self.identities
            .push((source.to_string(), identifier.to_string()));
    }

    fn identity(&self, source: &str) -> Option<String> {
        self.identities
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(source))
            .map(|(_, id)| id.clone())
    }

    fn clear_identity(&mut self, source: &str) {
        self.journal.record("tracker.clear_identity");
        self.identities.retain(|(s, _)| !s.eq_ignore_ascii_case(source));
    }

    fn end_visit(&mut self, clear_visitor: bool) {
        self.journal.record("tracker.end_visit");
        if clear_visitor {
            self.identities.clear();
        }
    }
}

pub struct FakeSession {
    journal: Journal,
}

impl SessionStore for FakeSession {
    fn clear(&mut self) {
        self.journal.record("session.clear");
    }

    fn abandon(&mut self) {
        self.journal.record("session.abandon");
    }

    fn remove_all(&mut self) {
        self.journal.record("session.remove_all");
    }

    fn set_cookie(&mut self, name: &str, value: &str) {
        self.journal.record(format!("session.set_cookie({name}={value})"));
    }
}

pub struct FakeAuth {
    pub accept: bool,
    pub principal: Option<String>,
    pub persistent: Option<bool>,
    journal: Journal,
}

impl Authenticator for FakeAuth {
    fn login(&mut self, _user_name: &str, _password: &SecretString, persistent: bool) -> bool {
        self.persistent = Some(persistent);
        self.accept
    }

    fn logout(&mut self) {
        self.journal.record("auth.logout");
    }

    fn current_user_name(&self) -> Option<String> {
        self.principal.clone()
    }
}

/// One request's worth of fakes.
pub struct RequestFakes {
    pub visitor: FakeVisitor,
    pub tracker: FakeTracker,
    pub session: FakeSession,
    pub auth: FakeAuth,
    pub journal: Journal,
}

impl RequestFakes {
    /// Fakes for an anonymous visitor `customer_id` whose credential check
    /// yields `accept` and whose active principal is `principal`.
    pub fn new(customer_id: &str, accept: bool, principal: Option<&str>) -> Self {
        let journal = Journal::default();
        Self {
            visitor: FakeVisitor {
                customer_id: CustomerId::new(customer_id),
                user_name: principal.unwrap_or_default().to_string(),
                just_logged_in: false,
            },
            tracker: FakeTracker::new(journal.clone()),
            session: FakeSession {
                journal: journal.clone(),
            },
            auth: FakeAuth {
                accept,
                principal: principal.map(str::to_string),
                persistent: None,
                journal: journal.clone(),
            },
            journal,
        }
    }

    pub fn context(&mut self) -> RequestContext<'_> {
        RequestContext {
            visitor: &mut self.visitor,
            tracker: &mut self.tracker,
            session: &mut self.session,
            auth: &mut self.auth,
        }
    }
}

// =============================================================================
// Log capture
// =============================================================================

/// Log events recorded as `"LEVEL message"`.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<String>>>);

impl CapturedLogs {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CapturedLogs {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.0
            .lock()
            .unwrap()
            .push(format!("{} {message}", event.metadata().level()));
    }
}

/// Run `f` with a subscriber that records every event it emits.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
