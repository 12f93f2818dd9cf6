//! Process-wide tracing setup shared by every binary in the workspace.

/// Install the JSON subscriber used in deployed builds.
///
/// Safe to call multiple times; only the first call installs anything.
pub fn init() {
    tracing::init_json();
}

/// Install a human-readable subscriber for local development.
pub fn init_pretty() {
    tracing::init_pretty();
}

/// Subscriber construction (filters, formats).
pub mod tracing;
