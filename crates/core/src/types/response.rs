//! Backend results and the facade response envelope.
//!
//! Every customer service call returns a [`ServiceResult`]: a success flag,
//! an optional domain payload and an ordered list of [`SystemMessage`]s. The
//! account facade hands these back to callers inside a [`ManagerResponse`]
//! together with a value projected from the result, so callers never need to
//! branch on backend-specific shapes.

use serde::{Deserialize, Serialize};

/// A user-facing diagnostic or status message attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    /// The message text, already localized.
    pub message: String,
}

impl SystemMessage {
    /// Create a new system message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for SystemMessage {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for SystemMessage {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result of a customer service backend call.
///
/// ## Invariants
///
/// - `messages` preserves insertion order and is never deduplicated.
/// - A failed result reaching a caller carries at least one message; the
///   facade synthesizes one when the backend is silent.
/// - A successful result whose required payload is absent is treated as a
///   failure by the facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResult<T> {
    /// Whether the backend reported success.
    pub success: bool,
    /// Domain payload, when the operation produces one.
    #[serde(default)]
    pub payload: Option<T>,
    /// Messages in the order they were produced.
    #[serde(default)]
    pub messages: Vec<SystemMessage>,
}

impl<T> Default for ServiceResult<T> {
    fn default() -> Self {
        Self {
            success: false,
            payload: None,
            messages: Vec::new(),
        }
    }
}

impl<T> ServiceResult<T> {
    /// A successful result carrying `payload`.
    #[must_use]
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            messages: Vec::new(),
        }
    }

    /// A successful result without a payload.
    #[must_use]
    pub const fn ok_empty() -> Self {
        Self {
            success: true,
            payload: None,
            messages: Vec::new(),
        }
    }

    /// A failed result with no messages yet.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            success: false,
            payload: None,
            messages: Vec::new(),
        }
    }

    /// A failed result carrying `messages`, in order.
    #[must_use]
    pub fn failed_with(messages: impl IntoIterator<Item = SystemMessage>) -> Self {
        Self {
            success: false,
            payload: None,
            messages: messages.into_iter().collect(),
        }
    }

    /// Append a message and return the result.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<SystemMessage>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Mark the result as failed and return it. Messages are kept.
    #[must_use]
    pub fn into_failure(mut self) -> Self {
        self.success = false;
        self
    }

    /// Whether the result succeeded and carries a payload.
    #[must_use]
    pub const fn has_payload(&self) -> bool {
        self.success && self.payload.is_some()
    }

    /// Whether the backend attached any messages.
    #[must_use]
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Iterate over the message texts.
    pub fn message_texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.message.as_str())
    }
}

/// The envelope returned by every facade operation.
///
/// Pairs the raw backend result with a value derived from it (a principal,
/// a flag, a list of parties). The projected value is always computable from
/// `service_result`; it is carried for caller convenience only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerResponse<R, T> {
    /// The backend result, with any synthesized messages appended.
    pub service_result: R,
    /// The value projected from `service_result`.
    pub result: T,
}

impl<R, T> ManagerResponse<R, T> {
    /// Create a new envelope.
    #[must_use]
    pub const fn new(service_result: R, result: T) -> Self {
        Self {
            service_result,
            result,
        }
    }
}

impl<P: Clone> ManagerResponse<ServiceResult<P>, Option<P>> {
    /// Envelope whose projected value is the result's payload.
    #[must_use]
    pub fn from_payload(service_result: ServiceResult<P>) -> Self {
        let result = service_result.payload.clone();
        Self::new(service_result, result)
    }
}

impl<P> ManagerResponse<ServiceResult<P>, bool> {
    /// Envelope whose projected value is the result's success flag.
    #[must_use]
    pub const fn from_success(service_result: ServiceResult<P>) -> Self {
        let result = service_result.success;
        Self::new(service_result, result)
    }
}
