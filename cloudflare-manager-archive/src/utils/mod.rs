//! Utility modules.

/// Keeps server response bodies readable in logs.
pub mod log_sanitizer;
