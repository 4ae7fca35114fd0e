//! Account facade configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACCOUNTS_SHOP_NAME` - Shop name the customer service and cart manager know
//!
//! ## Optional
//! - `ACCOUNTS_IDENTITY_SOURCE` - Tracker identity source tag (default: `CommerceUser`)
//! - `ACCOUNTS_SESSION_COOKIE` - Session cookie invalidated at logout (default: `storefront_session`)
//! - `ACCOUNTS_PHONE_PROPERTY` - Principal property holding the phone number (default: `Phone`)
//! - `ACCOUNTS_MESSAGES_PATH` - JSON file of localized system messages
//!
//! ## SMTP (all required once `ACCOUNTS_SMTP_HOST` is set)
//! - `ACCOUNTS_SMTP_HOST` - SMTP relay host
//! - `ACCOUNTS_SMTP_PORT` - SMTP port (default: 587)
//! - `ACCOUNTS_SMTP_USERNAME` - SMTP user
//! - `ACCOUNTS_SMTP_PASSWORD` - SMTP password (placeholder and entropy checked)
//! - `ACCOUNTS_MAIL_FROM` - Sender address for password reset mail

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use storefront_accounts_core::Storefront;
use thiserror::Error;

use crate::messages::Catalog;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default tracker identity source tag.
pub const DEFAULT_IDENTITY_SOURCE: &str = "CommerceUser";

/// Default session cookie name.
pub const DEFAULT_SESSION_COOKIE: &str = "storefront_session";

/// Default principal property holding the phone number.
pub const DEFAULT_PHONE_PROPERTY: &str = "Phone";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Invalid message catalog: {0}")]
    Catalog(String),
}

/// Account facade configuration.
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// The storefront operations run against
    pub storefront: Storefront,
    /// Source tag under which the tracker records the logged-in user
    pub identity_source: String,
    /// Session cookie invalidated at logout
    pub session_cookie_name: String,
    /// Principal property holding the phone number
    pub phone_property: String,
    /// JSON file of localized system messages
    pub messages_path: Option<PathBuf>,
    /// SMTP settings for password reset mail
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    /// Relay host
    pub host: String,
    /// Relay port
    pub port: u16,
    /// SMTP user
    pub username: String,
    /// SMTP password
    pub password: SecretString,
    /// Sender address
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl AccountsConfig {
    /// Configuration with defaults for everything but the shop name.
    #[must_use]
    pub fn new(shop_name: impl Into<String>) -> Self {
        Self {
            storefront: Storefront::new(shop_name),
            identity_source: DEFAULT_IDENTITY_SOURCE.to_string(),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            phone_property: DEFAULT_PHONE_PROPERTY.to_string(),
            messages_path: None,
            smtp: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the SMTP password fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let shop_name = get_required_env("ACCOUNTS_SHOP_NAME")?;
        let identity_source = get_env_or_default("ACCOUNTS_IDENTITY_SOURCE", DEFAULT_IDENTITY_SOURCE);
        let session_cookie_name = get_env_or_default("ACCOUNTS_SESSION_COOKIE", DEFAULT_SESSION_COOKIE);
        let phone_property = get_env_or_default("ACCOUNTS_PHONE_PROPERTY", DEFAULT_PHONE_PROPERTY);
        let messages_path = get_optional_env("ACCOUNTS_MESSAGES_PATH").map(PathBuf::from);
        let smtp = SmtpConfig::from_env()?;

        for (key, value) in [
            ("ACCOUNTS_SHOP_NAME", &shop_name),
            ("ACCOUNTS_IDENTITY_SOURCE", &identity_source),
            ("ACCOUNTS_SESSION_COOKIE", &session_cookie_name),
            ("ACCOUNTS_PHONE_PROPERTY", &phone_property),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    "must not be empty".to_string(),
                ));
            }
        }

        Ok(Self {
            storefront: Storefront::new(shop_name),
            identity_source,
            session_cookie_name,
            phone_property,
            messages_path,
            smtp,
        })
    }

    /// Load the configured message catalog, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Catalog` if the configured file cannot be loaded.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        self.messages_path
            .as_deref()
            .map_or_else(|| Ok(Catalog::new()), Catalog::from_file)
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("ACCOUNTS_SMTP_HOST") else {
            return Ok(None);
        };

        let port = get_env_or_default("ACCOUNTS_SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ACCOUNTS_SMTP_PORT".to_string(), e.to_string())
            })?;

        Ok(Some(Self {
            host,
            port,
            username: get_required_env("ACCOUNTS_SMTP_USERNAME")?,
            password: get_validated_secret("ACCOUNTS_SMTP_PASSWORD")?,
            from_address: get_required_env("ACCOUNTS_MAIL_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = AccountsConfig::new("storefront");
        assert_eq!(config.storefront.shop_name, "storefront");
        assert_eq!(config.identity_source, "CommerceUser");
        assert_eq!(config.session_cookie_name, "storefront_session");
        assert_eq!(config.phone_property, "Phone");
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_load_catalog_without_path_is_empty() {
        let catalog = AccountsConfig::new("storefront").load_catalog().unwrap();
        assert_eq!(
            crate::messages::MessageCatalog::system_message(
                &catalog,
                crate::messages::MessageKey::UserNotFound
            ),
            "User Not Found Error"
        );
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let mut config = AccountsConfig::new("storefront");
        config.messages_path = Some(PathBuf::from("/nonexistent/messages.json"));
        assert!(matches!(
            config.load_catalog(),
            Err(ConfigError::Catalog(_))
        ));
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme123", "ACCOUNTS_SMTP_PASSWORD").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        assert!(validate_secret_strength("abababababab", "ACCOUNTS_SMTP_PASSWORD").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("k9$Lq2!vZr8@Tm4#", "ACCOUNTS_SMTP_PASSWORD").is_ok());
    }

    #[test]
    fn test_smtp_config_debug_redacts_password() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: SecretString::from("super_private_smtp_pw"),
            from_address: "shop@example.com".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_smtp_pw"));
    }

    // =========================================================================
    // Environment loading
    // =========================================================================

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const ENV_KEYS: [&str; 10] = [
        "ACCOUNTS_SHOP_NAME",
        "ACCOUNTS_IDENTITY_SOURCE",
        "ACCOUNTS_SESSION_COOKIE",
        "ACCOUNTS_PHONE_PROPERTY",
        "ACCOUNTS_MESSAGES_PATH",
        "ACCOUNTS_SMTP_HOST",
        "ACCOUNTS_SMTP_PORT",
        "ACCOUNTS_SMTP_USERNAME",
        "ACCOUNTS_SMTP_PASSWORD",
        "ACCOUNTS_MAIL_FROM",
    ];

    const SMTP_PASSWORD: &str = "k9$Lq2!vZr8@Tm4#";

    /// Run `f` with exactly `vars` set among the accounts variables.
    #[allow(unsafe_code)]
    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // SAFETY: ENV_LOCK keeps every environment-touching test in this
        // module on one thread at a time.
        unsafe {
            for key in ENV_KEYS {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }

        let result = f();

        // SAFETY: as above.
        unsafe {
            for key in ENV_KEYS {
                std::env::remove_var(key);
            }
        }
        result
    }

    #[test]
    fn test_from_env_defaults() {
        let config = with_env(&[("ACCOUNTS_SHOP_NAME", "storefront")], AccountsConfig::from_env)
            .unwrap();

        assert_eq!(config.storefront.shop_name, "storefront");
        assert_eq!(config.identity_source, DEFAULT_IDENTITY_SOURCE);
        assert_eq!(config.session_cookie_name, DEFAULT_SESSION_COOKIE);
        assert_eq!(config.phone_property, DEFAULT_PHONE_PROPERTY);
        assert!(config.messages_path.is_none());
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_from_env_overrides() {
        let config = with_env(
            &[
                ("ACCOUNTS_SHOP_NAME", "storefront"),
                ("ACCOUNTS_IDENTITY_SOURCE", "ShopUser"),
                ("ACCOUNTS_SESSION_COOKIE", "sid"),
                ("ACCOUNTS_PHONE_PROPERTY", "MobilePhone"),
                ("ACCOUNTS_MESSAGES_PATH", "/etc/storefront/messages.json"),
            ],
            AccountsConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.identity_source, "ShopUser");
        assert_eq!(config.session_cookie_name, "sid");
        assert_eq!(config.phone_property, "MobilePhone");
        assert_eq!(
            config.messages_path,
            Some(PathBuf::from("/etc/storefront/messages.json"))
        );
    }

    #[test]
    fn test_from_env_requires_shop_name() {
        let err = with_env(&[], AccountsConfig::from_env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "ACCOUNTS_SHOP_NAME"));
    }

    #[test]
    fn test_from_env_rejects_empty_values() {
        let err = with_env(&[("ACCOUNTS_SHOP_NAME", "  ")], AccountsConfig::from_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "ACCOUNTS_SHOP_NAME"));

        let err = with_env(
            &[
                ("ACCOUNTS_SHOP_NAME", "storefront"),
                ("ACCOUNTS_SESSION_COOKIE", ""),
            ],
            AccountsConfig::from_env,
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "ACCOUNTS_SESSION_COOKIE")
        );
    }

    #[test]
    fn test_from_env_smtp() {
        let config = with_env(
            &[
                ("ACCOUNTS_SHOP_NAME", "storefront"),
                ("ACCOUNTS_SMTP_HOST", "smtp.example.com"),
                ("ACCOUNTS_SMTP_USERNAME", "mailer"),
                ("ACCOUNTS_SMTP_PASSWORD", SMTP_PASSWORD),
                ("ACCOUNTS_MAIL_FROM", "shop@example.com"),
            ],
            AccountsConfig::from_env,
        )
        .unwrap();

        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.username, "mailer");
        assert_eq!(smtp.from_address, "shop@example.com");
    }

    #[test]
    fn test_from_env_smtp_invalid_port() {
        let err = with_env(
            &[
                ("ACCOUNTS_SHOP_NAME", "storefront"),
                ("ACCOUNTS_SMTP_HOST", "smtp.example.com"),
                ("ACCOUNTS_SMTP_PORT", "not-a-port"),
                ("ACCOUNTS_SMTP_USERNAME", "mailer"),
                ("ACCOUNTS_SMTP_PASSWORD", SMTP_PASSWORD),
                ("ACCOUNTS_MAIL_FROM", "shop@example.com"),
            ],
            AccountsConfig::from_env,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "ACCOUNTS_SMTP_PORT"));
    }

    #[test]
    fn test_from_env_smtp_host_requires_credentials() {
        let err = with_env(
            &[
                ("ACCOUNTS_SHOP_NAME", "storefront"),
                ("ACCOUNTS_SMTP_HOST", "smtp.example.com"),
            ],
            AccountsConfig::from_env,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "ACCOUNTS_SMTP_USERNAME"));

        let err = with_env(
            &[
                ("ACCOUNTS_SHOP_NAME", "storefront"),
                ("ACCOUNTS_SMTP_HOST", "smtp.example.com"),
                ("ACCOUNTS_SMTP_USERNAME", "mailer"),
                ("ACCOUNTS_SMTP_PASSWORD", "changeme-please"),
                ("ACCOUNTS_MAIL_FROM", "shop@example.com"),
            ],
            AccountsConfig::from_env,
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InsecureSecret(key, _) if key == "ACCOUNTS_SMTP_PASSWORD")
        );
    }
}
