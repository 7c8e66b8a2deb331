// ── Core error types ──
//
// User-facing errors from schoolbus-core. Consumers never see HTTP status
// codes or JSON parse failures directly: `From<schoolbus_api::Error>`
// translates transport-layer errors into the domain taxonomy
// (not found / validation / remote / connection).

use thiserror::Error;

use crate::model::{EntityId, EntityKind};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    /// Mutation or lookup target missing from the current snapshot
    /// (or soft-deleted).
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// Remote resource missing (HTTP 404) where no typed id is at hand.
    #[error("Not found: {message}")]
    RemoteNotFound { message: String },

    /// A required field is missing or malformed. Raised before any
    /// gateway call.
    #[error("Validation failed: {field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Backend request timed out")]
    Timeout,

    /// Backend rejected the request. `message` is the backend's own text
    /// when it sent one.
    #[error("Operation rejected by backend: {message}")]
    Rejected { message: String, status: Option<u16> },

    // ── Local storage errors ─────────────────────────────────────────
    #[error("Dataset {path}: {reason}")]
    Dataset { path: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for failures of the remote collaborator (as opposed to local
    /// validation or lookup failures).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteNotFound { .. }
                | Self::ConnectionFailed { .. }
                | Self::AuthenticationFailed { .. }
                | Self::PermissionDenied { .. }
                | Self::Timeout
                | Self::Rejected { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<schoolbus_api::Error> for CoreError {
    fn from(err: schoolbus_api::Error) -> Self {
        use schoolbus_api::Error as Api;

        match err {
            Api::InvalidToken => CoreError::AuthenticationFailed {
                message: "Invalid or expired API token".into(),
            },
            Api::Forbidden { message } => CoreError::PermissionDenied { message },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::Api {
                message,
                status: 404,
            } => CoreError::RemoteNotFound { message },
            Api::Api { message, status } => CoreError::Rejected {
                message,
                status: Some(status),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected backend response: {message}"))
            }
        }
    }
}
