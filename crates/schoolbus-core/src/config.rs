// ── Runtime backend configuration ──
//
// Describes *where* the collections live: a local dataset file (or the
// built-in demo) or a remote REST backend. Never touches config files;
// the CLI builds a `ControllerConfig` and hands it in.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default page size for every admin page.
pub const DEFAULT_ITEMS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// TLS verification strategy for the remote backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Where records are read from and mutations are applied.
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-memory snapshot, optionally persisted to a JSON dataset file.
    /// `None` runs on the demo dataset without persistence.
    Local { dataset: Option<PathBuf> },
    /// REST backend; the server owns identity and pagination.
    Remote {
        url: Url,
        token: Option<SecretString>,
        tls: TlsVerification,
        timeout: Duration,
    },
}

impl Backend {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub backend: Backend,
    pub items_per_page: NonZeroUsize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local { dataset: None },
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}
