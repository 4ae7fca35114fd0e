//! In-memory collaborators for the account facade.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use secrecy::{ExposeSecret, SecretString};
use storefront_accounts::cart::{CartError, CartManager};
use storefront_accounts::context::{
    Authenticator, RequestContext, SessionStore, VisitorContext, VisitorTracker,
};
use storefront_accounts::credentials::{CredentialStore, CredentialStoreError};
use storefront_accounts::mail::{MailError, MailSender, MailTemplate};
use storefront_accounts::provider::{
    AddPartiesResult, CreateUserRequest, CreateUserResult, CreateUserStatus, CustomerResult,
    CustomerServiceProvider, GetPartiesRequest, GetPartiesResult, GetUserRequest, GetUserResult,
    PartiesRequest, ProviderError, UpdatePasswordRequest, UpdatePasswordResult, UpdateUserRequest,
    UpdateUserResult,
};
use storefront_accounts_core::{
    Cart, CartId, CommerceUser, CustomerId, Party, PartyId, ServiceResult, Storefront,
};

// =============================================================================
// Customer service
// =============================================================================

#[derive(Default)]
struct CustomerState {
    users: BTreeMap<CustomerId, CommerceUser>,
    passwords: HashMap<CustomerId, String>,
    parties: HashMap<CustomerId, Vec<Party>>,
    next_id: u32,
}

impl CustomerState {
    fn find(&self, name_or_email: &str) -> Option<&CommerceUser> {
        self.users.values().find(|u| {
            u.user_name.eq_ignore_ascii_case(name_or_email)
                || u.email.eq_ignore_ascii_case(name_or_email)
        })
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Customer service holding users and their parties in memory.
///
/// Lookups match user name or email case-insensitively. Silent failures
/// (no messages) are returned where a real backend would be silent, so the
/// facade's message synthesis is exercised.
#[derive(Default)]
pub struct InMemoryCustomerService {
    state: Mutex<CustomerState>,
    offline: AtomicBool,
    shop_names: Mutex<Vec<String>>,
}

impl InMemoryCustomerService {
    /// Insert a user directly, bypassing registration.
    pub fn seed(&self, user_name: &str, email: &str, password: &str) -> CommerceUser {
        let mut state = self.state.lock().unwrap();
        let id = CustomerId::new(state.next_id("cust"));
        let mut user = CommerceUser::new(id.clone(), user_name);
        user.email = email.to_string();
        state.users.insert(id.clone(), user.clone());
        state.passwords.insert(id, password.to_string());
        user
    }

    /// Make every call fail with `ProviderError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The stored copy of a user.
    pub fn user(&self, user_name: &str) -> Option<CommerceUser> {
        self.state.lock().unwrap().find(user_name).cloned()
    }

    /// The stored parties of a customer.
    pub fn parties_of(&self, customer_id: &CustomerId) -> Vec<Party> {
        self.state
            .lock()
            .unwrap()
            .parties
            .get(customer_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `password` is the user's current password.
    pub fn password_matches(&self, user_name: &str, password: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .find(user_name)
            .and_then(|u| state.passwords.get(&u.external_id))
            .is_some_and(|p| p == password)
    }

    /// Shop names seen on create requests, in order.
    pub fn shop_names(&self) -> Vec<String> {
        self.shop_names.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), ProviderError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl CustomerServiceProvider for InMemoryCustomerService {
    fn get_user(&self, request: &GetUserRequest) -> Result<GetUserResult, ProviderError> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .find(&request.user_name)
            .cloned()
            .map_or_else(ServiceResult::failed, ServiceResult::ok))
    }

    fn create_user(&self, request: &CreateUserRequest) -> Result<CreateUserResult, ProviderError> {
        self.check_online()?;
        self.shop_names
            .lock()
            .unwrap()
            .push(request.shop_name.clone());

        let mut state = self.state.lock().unwrap();
        if request.user_name.trim().is_empty() {
            return Err(ProviderError::CredentialCreation(CreateUserStatus::InvalidUserName));
        }
        if !request.email.contains('@') {
            return Err(ProviderError::CredentialCreation(CreateUserStatus::InvalidEmail));
        }
        if request.password.expose_secret().len() < 6 {
            return Err(ProviderError::CredentialCreation(CreateUserStatus::InvalidPassword));
        }
        if state
            .users
            .values()
            .any(|u| u.user_name.eq_ignore_ascii_case(&request.user_name))
        {
            return Err(ProviderError::CredentialCreation(CreateUserStatus::DuplicateUserName));
        }
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&request.email))
        {
            return Err(ProviderError::CredentialCreation(CreateUserStatus::DuplicateEmail));
        }

        let id = CustomerId::new(state.next_id("cust"));
        let mut user = CommerceUser::new(id.clone(), request.user_name.clone());
        user.email.clone_from(&request.email);
        state.users.insert(id.clone(), user.clone());
        state
            .passwords
            .insert(id, request.password.expose_secret().to_string());
        Ok(ServiceResult::ok(user))
    }

    fn update_user(&self, request: &UpdateUserRequest) -> Result<UpdateUserResult, ProviderError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let id = &request.user.external_id;
        if !state.users.contains_key(id) {
            return Ok(ServiceResult::failed().with_message(format!("customer {id} not found")));
        }
        state.users.insert(id.clone(), request.user.clone());
        Ok(ServiceResult::ok(request.user.clone()))
    }

    fn update_password(
        &self,
        request: &UpdatePasswordRequest,
    ) -> Result<UpdatePasswordResult, ProviderError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let Some(id) = state
            .find(&request.user_name)
            .map(|u| u.external_id.clone())
        else {
            return Ok(ServiceResult::failed());
        };

        let current_matches = state
            .passwords
            .get(&id)
            .is_some_and(|p| p == request.current_password.expose_secret());
        if !current_matches {
            return Ok(ServiceResult::failed());
        }

        state
            .passwords
            .insert(id, request.new_password.expose_secret().to_string());
        Ok(ServiceResult::ok_empty())
    }

    fn get_parties(&self, request: &GetPartiesRequest) -> Result<GetPartiesResult, ProviderError> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(ServiceResult::ok(
            state
                .parties
                .get(&request.customer.external_id)
                .cloned()
                .unwrap_or_default(),
        ))
    }

    fn add_parties(&self, request: &PartiesRequest) -> Result<AddPartiesResult, ProviderError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let mut added = Vec::with_capacity(request.parties.len());
        for party in &request.parties {
            let mut party = party.clone();
            if party.external_id.is_empty() {
                party.external_id = PartyId::new(state.next_id("addr"));
            }
            added.push(party);
        }
        state
            .parties
            .entry(request.customer.external_id.clone())
            .or_default()
            .extend(added);
        Ok(ServiceResult::ok_empty())
    }

    fn update_parties(&self, request: &PartiesRequest) -> Result<CustomerResult, ProviderError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let stored = state
            .parties
            .entry(request.customer.external_id.clone())
            .or_default();

        for party in &request.parties {
            match stored
                .iter_mut()
                .find(|p| p.external_id == party.external_id)
            {
                Some(existing) => *existing = party.clone(),
                None => {
                    return Ok(ServiceResult::failed()
                        .with_message(format!("address {} not found", party.external_id)));
                }
            }
        }
        Ok(ServiceResult::ok_empty())
    }

    fn remove_parties(&self, request: &PartiesRequest) -> Result<CustomerResult, ProviderError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let stored = state
            .parties
            .entry(request.customer.external_id.clone())
            .or_default();

        let before = stored.len();
        stored.retain(|p| {
            !request
                .parties
                .iter()
                .any(|removed| removed.external_id == p.external_id)
        });
        if stored.len() == before {
            return Ok(ServiceResult::failed());
        }
        Ok(ServiceResult::ok_empty())
    }
}

/// Customer service returning canned results for every call.
pub struct ScriptedCustomerService {
    get_user: Result<GetUserResult, ProviderError>,
    create_user: Result<CreateUserResult, ProviderError>,
    update_password: Result<UpdatePasswordResult, ProviderError>,
    parties: Result<GetPartiesResult, ProviderError>,
    party_calls: AtomicU32,
}

impl ScriptedCustomerService {
    /// A backend where every call succeeds without payload.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            get_user: Ok(ServiceResult::ok_empty()),
            create_user: Ok(ServiceResult::ok_empty()),
            update_password: Ok(ServiceResult::ok_empty()),
            parties: Ok(ServiceResult::ok_empty()),
            party_calls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_get_user(mut self, result: Result<GetUserResult, ProviderError>) -> Self {
        self.get_user = result;
        self
    }

    #[must_use]
    pub fn with_create_user(mut self, result: Result<CreateUserResult, ProviderError>) -> Self {
        self.create_user = result;
        self
    }

    #[must_use]
    pub fn with_update_password(
        mut self,
        result: Result<UpdatePasswordResult, ProviderError>,
    ) -> Self {
        self.update_password = result;
        self
    }

    #[must_use]
    pub fn with_parties(mut self, result: Result<GetPartiesResult, ProviderError>) -> Self {
        self.parties = result;
        self
    }

    /// Number of party operations issued.
    pub fn party_calls(&self) -> u32 {
        self.party_calls.load(Ordering::SeqCst)
    }

    fn party_call(&self) {
        self.party_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for ScriptedCustomerService {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerServiceProvider for ScriptedCustomerService {
    fn get_user(&self, _request: &GetUserRequest) -> Result<GetUserResult, ProviderError> {
        self.get_user.clone()
    }

    fn create_user(&self, _request: &CreateUserRequest) -> Result<CreateUserResult, ProviderError> {
        self.create_user.clone()
    }

    fn update_user(&self, request: &UpdateUserRequest) -> Result<UpdateUserResult, ProviderError> {
        Ok(ServiceResult::ok(request.user.clone()))
    }

    fn update_password(
        &self,
        _request: &UpdatePasswordRequest,
    ) -> Result<UpdatePasswordResult, ProviderError> {
        self.update_password.clone()
    }

    fn get_parties(&self, _request: &GetPartiesRequest) -> Result<GetPartiesResult, ProviderError> {
        self.party_call();
        self.parties.clone()
    }

    fn add_parties(&self, _request: &PartiesRequest) -> Result<AddPartiesResult, ProviderError> {
        self.party_call();
        Ok(ServiceResult::ok_empty())
    }

    fn update_parties(&self, _request: &PartiesRequest) -> Result<CustomerResult, ProviderError> {
        self.party_call();
        Ok(ServiceResult::ok_empty())
    }

    fn remove_parties(&self, _request: &PartiesRequest) -> Result<CustomerResult, ProviderError> {
        self.party_call();
        Ok(ServiceResult::ok_empty())
    }
}

// =============================================================================
// Carts, credentials and mail
// =============================================================================

/// Carts keyed by customer ID.
#[derive(Default)]
pub struct InMemoryCarts {
    carts: Mutex<HashMap<CustomerId, Cart>>,
    merges: Mutex<Vec<(CustomerId, CartId)>>,
    unavailable: AtomicBool,
}

impl InMemoryCarts {
    /// Give `customer_id` a cart with `line_count` lines.
    pub fn put(&self, customer_id: &str, line_count: u32) {
        let customer_id = CustomerId::new(customer_id);
        self.carts.lock().unwrap().insert(
            customer_id.clone(),
            Cart {
                external_id: CartId::new(format!("cart-{customer_id}")),
                customer_id: Some(customer_id),
                line_count,
            },
        );
    }

    /// Make every call fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// `(prior customer ID, cart ID)` for every merge, in order.
    pub fn merges(&self) -> Vec<(CustomerId, CartId)> {
        self.merges.lock().unwrap().clone()
    }
}

impl CartManager for InMemoryCarts {
    fn current_cart(
        &self,
        visitor: &dyn VisitorContext,
        _storefront: &Storefront,
    ) -> Result<Cart, CartError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CartError::Service("cart engine unavailable".to_string()));
        }
        self.carts
            .lock()
            .unwrap()
            .get(&visitor.customer_id())
            .cloned()
            .ok_or(CartError::NotFound)
    }

    fn merge_carts(
        &self,
        _storefront: &Storefront,
        _visitor: &dyn VisitorContext,
        prior_customer_id: &CustomerId,
        cart: &Cart,
    ) -> Result<Cart, CartError> {
        self.merges
            .lock()
            .unwrap()
            .push((prior_customer_id.clone(), cart.external_id.clone()));
        Ok(cart.clone())
    }
}

/// Credential store mapping emails to user names.
#[derive(Default)]
pub struct InMemoryCredentials {
    emails: Mutex<HashMap<String, String>>,
    resets: AtomicU32,
}

impl InMemoryCredentials {
    /// Register `email` for `user_name`.
    pub fn register(&self, email: &str, user_name: &str) {
        self.emails
            .lock()
            .unwrap()
            .insert(email.to_lowercase(), user_name.to_string());
    }

    /// Number of passwords reset so far.
    pub fn resets(&self) -> u32 {
        self.resets.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentials {
    fn user_name_by_email(&self, email: &str) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.emails.lock().unwrap().get(&email.to_lowercase()).cloned())
    }

    fn reset_password(&self, user_name: &str) -> Result<SecretString, CredentialStoreError> {
        let known = self
            .emails
            .lock()
            .unwrap()
            .values()
            .any(|name| name == user_name);
        if !known {
            return Err(CredentialStoreError::ResetRejected(user_name.to_string()));
        }
        let n = self.resets.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SecretString::from(format!("tmp-{user_name}-{n}")))
    }
}

/// Mail sender that keeps sent mail.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<MailTemplate>>,
    refusing: AtomicBool,
}

impl Outbox {
    /// Make every send fail at the transport.
    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    /// Mail sent so far.
    pub fn sent(&self) -> Vec<MailTemplate> {
        self.sent.lock().unwrap().clone()
    }
}

impl MailSender for Outbox {
    fn send(&self, mail: &MailTemplate) -> Result<(), MailError> {
        if self.refusing.load(Ordering::SeqCst) {
            return Err(MailError::Transport("554 relay access denied".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

// =============================================================================
// Request-scoped collaborators
// =============================================================================

/// Ordered log of session side effects shared by one request's fakes.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Whether `event` was recorded.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.0.borrow().iter().any(|e| e == event)
    }
}

#[derive(Debug)]
pub struct Visitor {
    pub customer_id: CustomerId,
    pub user_name: String,
    pub just_logged_in: bool,
}

impl VisitorContext for Visitor {
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

#[derive(Debug)]
pub struct Tracker {
    identities: Vec<(String, String)>,
    log: EventLog,
}

impl Tracker {
    /// Pretend an earlier visit already identified the contact.
    pub fn preload(&mut self, source: &str, identifier: &str) {
        self.identities
            .push((source.to_string(), identifier.to_string()));
    }
}

impl VisitorTracker for Tracker {
    fn identify_as(&mut self, source: &str, identifier: &str) {
        self.log.push(format!("tracker.identify_as({identifier})"));
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
        self.log.push("tracker.clear_identity");
        self.identities.retain(|(s, _)| !s.eq_ignore_ascii_case(source));
    }

    fn end_visit(&mut self, clear_visitor: bool) {
        self.log.push(format!("tracker.end_visit({clear_visitor})"));
        if clear_visitor {
            self.identities.clear();
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub entries: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub abandoned: bool,
    log: EventLog,
}

impl SessionStore for Session {
    fn clear(&mut self) {
        self.log.push("session.clear");
        self.entries.clear();
    }

    fn abandon(&mut self) {
        self.log.push("session.abandon");
        self.abandoned = true;
    }

    fn remove_all(&mut self) {
        self.log.push("session.remove_all");
        self.entries.clear();
    }

    fn set_cookie(&mut self, name: &str, value: &str) {
        self.log.push(format!("session.set_cookie({name})"));
        self.cookies.insert(name.to_string(), value.to_string());
    }
}

/// Authentication provider with a fixed set of accounts.
///
/// `impersonating` simulates a desynchronized principal: after a successful
/// login the active principal is that name instead of the one logged in.
#[derive(Debug)]
pub struct Auth {
    accounts: HashMap<String, String>,
    pub principal: Option<String>,
    pub impersonating: Option<String>,
    log: EventLog,
}

impl Auth {
    /// Accept `password` for `user_name`.
    pub fn allow(&mut self, user_name: &str, password: &str) {
        self.accounts
            .insert(user_name.to_lowercase(), password.to_string());
    }
}

impl Authenticator for Auth {
    fn login(&mut self, user_name: &str, password: &SecretString, _persistent: bool) -> bool {
        let ok = self
            .accounts
            .get(&user_name.to_lowercase())
            .is_some_and(|p| p == password.expose_secret());
        self.log.push(format!("auth.login({user_name})={ok}"));
        if ok {
            self.principal = Some(
                self.impersonating
                    .clone()
                    .unwrap_or_else(|| user_name.to_string()),
            );
        }
        ok
    }

    fn logout(&mut self) {
        self.log.push("auth.logout");
        self.principal = None;
    }

    fn current_user_name(&self) -> Option<String> {
        self.principal.clone()
    }
}

/// One inbound request's collaborators.
#[derive(Debug)]
pub struct Request {
    pub visitor: Visitor,
    pub tracker: Tracker,
    pub session: Session,
    pub auth: Auth,
    pub log: EventLog,
}

impl Request {
    /// An anonymous visitor keyed by `customer_id`.
    #[must_use]
    pub fn anonymous(customer_id: &str) -> Self {
        let log = EventLog::default();
        Self {
            visitor: Visitor {
                customer_id: CustomerId::new(customer_id),
                user_name: String::new(),
                just_logged_in: false,
            },
            tracker: Tracker {
                identities: Vec::new(),
                log: log.clone(),
            },
            session: Session {
                entries: BTreeMap::from([("cart_count".to_string(), "2".to_string())]),
                cookies: BTreeMap::new(),
                abandoned: false,
                log: log.clone(),
            },
            auth: Auth {
                accounts: HashMap::new(),
                principal: None,
                impersonating: None,
                log: log.clone(),
            },
            log,
        }
    }

    /// A visitor already signed in as `user_name`.
    #[must_use]
    pub fn signed_in(user_name: &str) -> Self {
        let mut request = Self::anonymous(&format!("cust-session-{user_name}"));
        request.visitor.user_name = user_name.to_string();
        request.auth.principal = Some(user_name.to_string());
        request
    }

    /// Borrow the collaborators for one facade call.
    pub fn context(&mut self) -> RequestContext<'_> {
        RequestContext {
            visitor: &mut self.visitor,
            tracker: &mut self.tracker,
            session: &mut self.session,
            auth: &mut self.auth,
        }
    }
}
