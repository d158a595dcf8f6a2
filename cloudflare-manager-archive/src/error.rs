use serde::{Deserialize, Serialize};

/// Unified error type for all remote archive operations.
///
/// Each variant includes a `backend` field identifying which archive backend produced the
/// error, plus variant-specific context. All variants are serializable for structured error
/// reporting.
///
/// # Transient Errors
///
/// The following variants represent failures that may succeed if the caller tries again:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`ServerError`](Self::ServerError): the server answered with a 5xx status
///
/// The client never retries on its own; callers decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ArchiveError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Backend that produced the error.
        backend: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Backend that produced the error.
        backend: String,
        /// Error details.
        detail: String,
    },

    /// The server rejected the supplied username/password (HTTP 401).
    InvalidCredentials {
        /// Backend that produced the error.
        backend: String,
        /// Response body, if any.
        raw_message: Option<String>,
    },

    /// The credentials are valid but lack access to the path (HTTP 403).
    PermissionDenied {
        /// Backend that produced the error.
        backend: String,
        /// Path that was refused.
        path: String,
    },

    /// The requested file does not exist (HTTP 404).
    NotFound {
        /// Backend that produced the error.
        backend: String,
        /// Path that was not found.
        path: String,
    },

    /// The server failed to process the request (HTTP 5xx).
    ServerError {
        /// Backend that produced the error.
        backend: String,
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        raw_message: Option<String>,
    },

    /// The archive configuration itself is unusable (bad base URL, etc.).
    InvalidConfiguration {
        /// Backend that produced the error.
        backend: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Failed to parse a server response (e.g. a malformed multistatus document).
    ParseError {
        /// Backend that produced the error.
        backend: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// An unexpected HTTP status.
    Unknown {
        /// Backend that produced the error.
        backend: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        raw_message: String,
    },
}

impl ArchiveError {
    /// Whether the failure is caused by configuration or user input rather than a fault,
    /// used to pick the log level (`warn` when `true`, `error` otherwise).
    ///
    /// **Keep in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::NotFound { .. }
                | Self::InvalidConfiguration { .. }
        )
    }

    /// Whether a later attempt of the same call could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::ServerError { .. }
        )
    }
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { backend, detail } => {
                write!(f, "[{backend}] Network error: {detail}")
            }
            Self::Timeout { backend, detail } => {
                write!(f, "[{backend}] Request timeout: {detail}")
            }
            Self::InvalidCredentials {
                backend,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{backend}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{backend}] Invalid credentials")
                }
            }
            Self::PermissionDenied { backend, path } => {
                write!(f, "[{backend}] Permission denied: {path}")
            }
            Self::NotFound { backend, path } => {
                write!(f, "[{backend}] '{path}' not found")
            }
            Self::ServerError {
                backend,
                status,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{backend}] Server error (HTTP {status}): {msg}")
                } else {
                    write!(f, "[{backend}] Server error (HTTP {status})")
                }
            }
            Self::InvalidConfiguration { backend, detail } => {
                write!(f, "[{backend}] Invalid configuration: {detail}")
            }
            Self::ParseError { backend, detail } => {
                write!(f, "[{backend}] Parse error: {detail}")
            }
            Self::Unknown {
                backend,
                status,
                raw_message,
            } => {
                write!(f, "[{backend}] Unexpected HTTP {status}: {raw_message}")
            }
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Convenience type alias for `Result<T, ArchiveError>`.
pub type Result<T> = std::result::Result<T, ArchiveError>;
