//! Tracker identity reconciliation.
//!
//! After a successful credential check the visitor tracker is bound to the
//! user name, and the claim it then reports must agree with the principal the
//! authentication provider considers active. A disagreement means the tracked
//! contact and the authenticated session belong to different people.

use crate::context::VisitorTracker;

/// Outcome of comparing the tracker claim with the active principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The claim names the active principal (case-insensitively).
    InSync,
    /// The tracker holds no claim under the source tag.
    NoClaim,
    /// The claim and the active principal disagree.
    Mismatch {
        /// The identifier the tracker holds.
        tracked: String,
        /// The active principal's name, if any.
        active: Option<String>,
    },
}

impl Reconciliation {
    /// Whether the session must be torn down.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Compare the tracker claim under `source` with `active_user_name`.
///
/// An absent active principal never matches a claim.
#[must_use]
pub fn reconcile(
    tracker: &dyn VisitorTracker,
    source: &str,
    active_user_name: Option<&str>,
) -> Reconciliation {
    let Some(tracked) = tracker.identity(source) else {
        return Reconciliation::NoClaim;
    };

    match active_user_name {
        Some(active) if eq_ignore_case(&tracked, active) => Reconciliation::InSync,
        _ => Reconciliation::Mismatch {
            tracked,
            active: active_user_name.map(str::to_string),
        },
    }
}

/// Unicode case-insensitive equality without allocating.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
