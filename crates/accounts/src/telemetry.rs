//! Tracing subscriber setup for hosts that embed the account facade.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_filter` (e.g. `storefront_accounts=info`) when
/// `RUST_LOG` is unset or invalid. Returns `false` if a global subscriber was
/// already installed, so it is safe to call more than once.
pub fn init(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Like [`init`], but emits one JSON object per event.
pub fn init_json(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok()
}
