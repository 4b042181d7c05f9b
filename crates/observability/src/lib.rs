//! Shared tracing/logging setup.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging with the format named by
/// `HOLDBOOK_LOG_FORMAT` (`json` by default).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("HOLDBOOK_LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    crate::tracing::init(format);
}
