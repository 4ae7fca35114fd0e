//! Principal lookup.

use storefront_accounts_core::{CommerceUser, ManagerResponse};

use super::AccountManager;
use crate::messages::MessageKey;
use crate::provider::{GetUserRequest, GetUserResult};

impl AccountManager {
    /// Look up a principal by user name (or email).
    ///
    /// A failed lookup, or a successful one without a principal, always gets
    /// the "User Not Found Error" message appended after whatever the backend
    /// reported. The backend's success flag is passed through unchanged, so
    /// callers must check `result` as well as `service_result.success`.
    #[must_use]
    pub fn get_user(&self, user_name: &str) -> ManagerResponse<GetUserResult, Option<CommerceUser>> {
        let request = GetUserRequest::new(user_name);

        let mut result = self
            .provider
            .get_user(&request)
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, user_name, "Customer lookup failed");
                e.into_result()
            });

        if !result.has_payload() {
            result.messages.push(self.message(MessageKey::UserNotFound));
        }

        ManagerResponse::from_payload(result)
    }
}
