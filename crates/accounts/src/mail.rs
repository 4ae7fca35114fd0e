//! Transactional mail for password resets.
//!
//! A [`MailTemplate`] is a caller-authored subject and HTML body with
//! literal placeholders (e.g. `[Password]`) filled in at render time.
//! Delivery goes through a [`MailSender`]; [`SmtpMailer`] delivers over SMTP
//! via lettre.

use std::collections::BTreeMap;

use thiserror::Error;

/// Placeholder replaced with the requesting client's address.
pub const IP_ADDRESS_PLACEHOLDER: &str = "[IPAddress]";

/// Placeholder replaced with the temporary password.
pub const PASSWORD_PLACEHOLDER: &str = "[Password]";

/// Errors that can occur when sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Failed to build the message.
    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    /// Transport failure.
    #[error("Mail transport error: {0}")]
    Transport(String),
}

#[cfg(feature = "smtp")]
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::MessageBuild(err.to_string())
    }
}

/// A mail ready for placeholder substitution.
#[derive(Clone, PartialEq, Eq)]
pub struct MailTemplate {
    /// Recipient address.
    pub to: String,
    /// Subject, may contain placeholders.
    pub subject: String,
    /// HTML body, may contain placeholders.
    pub body: String,
    /// Placeholder token to replacement value.
    pub placeholders: BTreeMap<String, String>,
}

// Placeholder values include temporary passwords.
impl std::fmt::Debug for MailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailTemplate")
            .field("to", &self.to)
            .field("subject", &self.subject)
            .field("placeholders", &self.placeholders.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl MailTemplate {
    /// Create a template with no placeholders.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            placeholders: BTreeMap::new(),
        }
    }

    /// Add a placeholder replacement.
    #[must_use]
    pub fn with_placeholder(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(token.into(), value.into());
        self
    }

    /// Subject with placeholders substituted.
    #[must_use]
    pub fn rendered_subject(&self) -> String {
        self.substitute(&self.subject)
    }

    /// Body with placeholders substituted.
    #[must_use]
    pub fn rendered_body(&self) -> String {
        self.substitute(&self.body)
    }

    fn substitute(&self, text: &str) -> String {
        self.placeholders
            .iter()
            .fold(text.to_string(), |acc, (token, value)| {
                acc.replace(token.as_str(), value)
            })
    }
}

/// Delivers rendered mail.
pub trait MailSender: Send + Sync {
    /// Render and send `mail`.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the mail cannot be built or delivered.
    fn send(&self, mail: &MailTemplate) -> Result<(), MailError>;
}

#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;

#[cfg(feature = "smtp")]
mod smtp {
    use lettre::{
        Message, SmtpTransport, Transport,
        message::{Mailbox, header::ContentType},
        transport::smtp::{Error as SmtpError, authentication::Credentials},
    };
    use secrecy::ExposeSecret;

    use super::{MailError, MailSender, MailTemplate};
    use crate::config::SmtpConfig;

    /// Mail sender over SMTP with STARTTLS.
    #[derive(Clone)]
    pub struct SmtpMailer {
        mailer: SmtpTransport,
        from_address: String,
    }

    impl SmtpMailer {
        /// Create a new SMTP mailer from configuration.
        ///
        /// # Errors
        ///
        /// Returns error if the relay cannot be configured.
        pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
            let credentials = Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            );

            let mailer = SmtpTransport::starttls_relay(&config.host)?
                .port(config.port)
                .credentials(credentials)
                .build();

            Ok(Self {
                mailer,
                from_address: config.from_address.clone(),
            })
        }

        fn build_message(&self, mail: &MailTemplate) -> Result<Message, MailError> {
            let from: Mailbox = self
                .from_address
                .parse()
                .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?;
            let to: Mailbox = mail
                .to
                .parse()
                .map_err(|_| MailError::InvalidAddress(mail.to.clone()))?;

            Ok(Message::builder()
                .from(from)
                .to(to)
                .subject(mail.rendered_subject())
                .header(ContentType::TEXT_HTML)
                .body(mail.rendered_body())?)
        }
    }

    impl MailSender for SmtpMailer {
        fn send(&self, mail: &MailTemplate) -> Result<(), MailError> {
            let message = self.build_message(mail)?;
            self.mailer.send(&message)?;

            tracing::info!(to = %mail.to, "Email sent successfully");
            Ok(())
        }
    }

}
