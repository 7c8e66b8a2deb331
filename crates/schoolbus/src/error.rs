//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use schoolbus_config::ConfigError;
use schoolbus_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(schoolbus::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out")]
    #[diagnostic(
        code(schoolbus::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(schoolbus::auth_failed),
        help(
            "Check the API token of the active profile.\n\
             Pass one with --api-token or set SCHOOLBUS_API_TOKEN."
        )
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(code(schoolbus::permission_denied))]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(schoolbus::not_found),
        help("Run: schoolbus {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Not found on the backend: {message}")]
    #[diagnostic(code(schoolbus::remote_not_found))]
    RemoteNotFound { message: String },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("Backend rejected the operation ({status}): {message}")]
    #[diagnostic(code(schoolbus::rejected))]
    Rejected { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(schoolbus::validation))]
    Validation { field: String, reason: String },

    // ── Local data ───────────────────────────────────────────────────

    #[error("Dataset {path} could not be used: {reason}")]
    #[diagnostic(
        code(schoolbus::dataset),
        help("Point --data at a writable JSON file, or delete a corrupted one to start from demo data.")
    )]
    Dataset { path: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(schoolbus::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: schoolbus config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(schoolbus::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(schoolbus::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────

    #[error("Internal error: {message}")]
    #[diagnostic(code(schoolbus::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(schoolbus::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(schoolbus::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(schoolbus::config_write))]
    ConfigWrite(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::RemoteNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { kind, id } => CliError::NotFound {
                resource_type: kind.label().into(),
                identifier: id.to_string(),
                list_command: format!("{} list", kind.resource()),
            },

            CoreError::RemoteNotFound { message } => CliError::RemoteNotFound { message },

            CoreError::ValidationFailed { field, message } => CliError::Validation {
                field,
                reason: message,
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Rejected { message, status } => CliError::Rejected {
                status: status.map_or_else(|| "no status".into(), |s| s.to_string()),
                message,
            },

            CoreError::Dataset { path, reason } => CliError::Dataset { path, reason },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use schoolbus_core::{EntityId, EntityKind};

    use super::*;

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            kind: EntityKind::Bus,
            id: EntityId::new(42),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "bus '42' not found");
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "buses list"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validation_is_a_usage_error() {
        let err = CliError::from(CoreError::validation("plateNumber", "is required"));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn remote_failures_map_to_distinct_codes() {
        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);
        let conn = CoreError::ConnectionFailed {
            url: "https://api.example".into(),
            reason: "refused".into(),
        };
        assert_eq!(CliError::from(conn).exit_code(), exit_code::CONNECTION);
        let rejected = CoreError::Rejected {
            message: "Lien refusé".into(),
            status: Some(409),
        };
        assert_eq!(
            CliError::from(rejected).to_string(),
            "Backend rejected the operation (409): Lien refusé"
        );
    }
}
