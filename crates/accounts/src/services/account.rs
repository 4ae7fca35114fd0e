//! Registration, passwords and profile updates.

use std::backtrace::Backtrace;
use std::net::IpAddr;

use secrecy::{ExposeSecret, SecretString};
use storefront_accounts_core::{CommerceUser, ManagerResponse, ServiceResult};

use super::AccountManager;
use crate::context::VisitorContext;
use crate::credentials::CredentialStoreError;
use crate::mail::{IP_ADDRESS_PLACEHOLDER, MailError, MailTemplate, PASSWORD_PLACEHOLDER};
use crate::messages::{MessageKey, log_system_messages};
use crate::provider::{
    CreateUserRequest, CreateUserResult, CreateUserStatus, ProviderError, UpdatePasswordRequest,
    UpdatePasswordResult, UpdateUserRequest, UpdateUserResult,
};

/// Message key for a credential store rejection status.
const fn create_status_message_key(status: CreateUserStatus) -> MessageKey {
    match status {
        CreateUserStatus::DuplicateUserName => MessageKey::UserAlreadyExists,
        CreateUserStatus::DuplicateEmail => MessageKey::UserNameForEmailExists,
        CreateUserStatus::InvalidPassword => MessageKey::InvalidPassword,
        CreateUserStatus::InvalidEmail => MessageKey::InvalidEmail,
        CreateUserStatus::InvalidAnswer => MessageKey::PasswordRetrievalAnswerInvalid,
        CreateUserStatus::InvalidQuestion => MessageKey::PasswordRetrievalQuestionInvalid,
        CreateUserStatus::InvalidUserName => MessageKey::UserNameInvalid,
        CreateUserStatus::ProviderError => MessageKey::AuthenticationProviderError,
        CreateUserStatus::UserRejected => MessageKey::UserRejected,
        CreateUserStatus::Success
        | CreateUserStatus::InvalidProviderUserKey
        | CreateUserStatus::DuplicateProviderUserKey
        | CreateUserStatus::Unknown => MessageKey::UnknownMembershipProviderError,
    }
}

/// Failures on the password reset path after the principal is resolved.
#[derive(Debug, thiserror::Error)]
enum ResetError {
    #[error(transparent)]
    Credentials(#[from] CredentialStoreError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl AccountManager {
    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new user in the configured shop.
    ///
    /// Credential store rejections are mapped to a localized message per
    /// status. A "successful" creation that yields neither a principal nor
    /// any message means the user already existed and is reported as a
    /// failure.
    #[must_use]
    pub fn register_user(
        &self,
        user_name: &str,
        password: &SecretString,
        email: &str,
    ) -> ManagerResponse<CreateUserResult, Option<CommerceUser>> {
        let request = CreateUserRequest {
            user_name: user_name.to_string(),
            password: password.clone(),
            email: email.to_string(),
            shop_name: self.storefront().shop_name.clone(),
        };

        let result = match self.provider.create_user(&request) {
            Ok(result) if !result.success => {
                let result = if result.has_messages() {
                    result
                } else {
                    result.with_message(self.message(MessageKey::UnknownMembershipProviderError))
                };
                log_system_messages("register_user", &result.messages);
                result
            }
            Ok(result) if result.payload.is_none() && !result.has_messages() => {
                let result = result
                    .into_failure()
                    .with_message(self.message(MessageKey::UserAlreadyExists));
                log_system_messages("register_user", &result.messages);
                result
            }
            Ok(result) => result,
            Err(ProviderError::CredentialCreation(status)) => {
                tracing::warn!(user_name, status = %status, "User creation rejected");
                let result = ServiceResult::failed()
                    .with_message(self.message(create_status_message_key(status)));
                log_system_messages("register_user", &result.messages);
                result
            }
            Err(e) => {
                tracing::error!(error = %e, user_name, "User creation failed");
                let result = ServiceResult::failed()
                    .with_message(self.message(MessageKey::UnknownMembershipProviderError));
                log_system_messages("register_user", &result.messages);
                result
            }
        };

        if result.success {
            tracing::info!(user_name, "User registered");
        }
        ManagerResponse::from_payload(result)
    }

    // =========================================================================
    // Passwords
    // =========================================================================

    /// Reset a user's password and mail them the temporary one.
    ///
    /// `subject` and `body` may contain `[IPAddress]` (replaced with
    /// `client_addr`, or nothing) and `[Password]`. The projected value is
    /// `true` only once the mail has been handed to the transport.
    #[must_use]
    pub fn reset_user_password(
        &self,
        email: &str,
        subject: &str,
        body: &str,
        client_addr: Option<IpAddr>,
    ) -> ManagerResponse<UpdatePasswordResult, bool> {
        let lookup = self.get_user(email);
        let user = match lookup.result {
            Some(user) if lookup.service_result.success => user,
            _ => {
                let result = ServiceResult::failed_with(lookup.service_result.messages);
                log_system_messages("reset_user_password", &result.messages);
                return ManagerResponse::new(result, false);
            }
        };

        match self.send_temporary_password(&user, email, subject, body, client_addr) {
            Ok(()) => {
                tracing::info!(user_name = %user.user_name, "Password reset mail sent");
                ManagerResponse::new(ServiceResult::ok_empty(), true)
            }
            Err(e) => {
                let result = ServiceResult::failed().with_message(e.to_string());
                log_system_messages("reset_user_password", &result.messages);
                ManagerResponse::new(result, false)
            }
        }
    }

    fn send_temporary_password(
        &self,
        user: &CommerceUser,
        to: &str,
        subject: &str,
        body: &str,
        client_addr: Option<IpAddr>,
    ) -> Result<(), ResetError> {
        let user_name = self
            .credentials
            .user_name_by_email(&user.email)?
            .ok_or_else(|| CredentialStoreError::UnknownEmail(user.email.clone()))?;
        let password = self.credentials.reset_password(&user_name)?;

        let mail = MailTemplate::new(subject, body, to)
            .with_placeholder(
                IP_ADDRESS_PLACEHOLDER,
                client_addr.map(|addr| addr.to_string()).unwrap_or_default(),
            )
            .with_placeholder(PASSWORD_PLACEHOLDER, password.expose_secret());

        self.mailer.send(&mail)?;
        Ok(())
    }

    /// Change the visitor's password.
    ///
    /// The projected value is the backend's success flag.
    #[must_use]
    pub fn change_user_password(
        &self,
        visitor: &dyn VisitorContext,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> ManagerResponse<UpdatePasswordResult, bool> {
        let request = UpdatePasswordRequest {
            user_name: visitor.user_name(),
            current_password: current_password.clone(),
            new_password: new_password.clone(),
        };

        let result = self
            .provider
            .update_password(&request)
            .unwrap_or_else(|e| e.into_result());
        let result = self.explain_failure(result, MessageKey::ChangePasswordError);

        if !result.success {
            log_system_messages("change_user_password", &result.messages);
        }

        ManagerResponse::from_success(result)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update the visitor's name, phone number and email.
    ///
    /// The phone number is stored in the principal property named by
    /// `phone_property` in the configuration.
    #[must_use]
    pub fn update_user(
        &self,
        visitor: &dyn VisitorContext,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
        email: &str,
    ) -> ManagerResponse<UpdateUserResult, Option<CommerceUser>> {
        let lookup = self.get_user(&visitor.user_name());

        let result = match lookup.result {
            Some(mut user) => {
                user.first_name = Some(first_name.to_string());
                user.last_name = Some(last_name.to_string());
                user.email = email.to_string();
                user.set_property(self.config.phone_property.as_str(), phone_number);

                self.provider
                    .update_user(&UpdateUserRequest { user })
                    .unwrap_or_else(|e| {
                        ServiceResult::failed()
                            .with_message(format!("{e}/{}", Backtrace::force_capture()))
                    })
            }
            None => ServiceResult::failed_with(lookup.service_result.messages),
        };
        let result = self.explain_failure(result, MessageKey::UpdateUserError);

        log_system_messages("update_user", &result.messages);
        ManagerResponse::from_payload(result)
    }
}
