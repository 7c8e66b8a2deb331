//! Configuration for the schoolbus CLI.
//!
//! TOML profiles, credential resolution (env var + plaintext), and
//! translation to `schoolbus_core::ControllerConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use schoolbus_core::{Backend, ControllerConfig, DEFAULT_ITEMS_PER_PAGE, TlsVerification};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SCHOOLBUS_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            items_per_page: default_items_per_page(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_items_per_page() -> usize {
    DEFAULT_ITEMS_PER_PAGE.get()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON dataset on disk.
    #[default]
    Local,
    /// REST backend.
    Remote,
}

/// A named profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub backend: BackendKind,

    /// Backend base URL (remote profiles).
    pub api_url: Option<String>,

    /// API token (plaintext; prefer `api_token_env`).
    pub api_token: Option<String>,

    /// Environment variable holding the API token.
    pub api_token_env: Option<String>,

    /// Dataset file (local profiles). Defaults to the platform data dir.
    pub dataset: Option<PathBuf>,

    /// Custom CA certificate for the backend.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    pub items_per_page: Option<usize>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("ma", "schoolbus", "schoolbus")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("schoolbus");
    p
}

/// Config file path: `$SCHOOLBUS_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where local profiles keep their dataset unless told otherwise.
pub fn default_dataset_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("dataset.json"),
        |dirs| dirs.data_dir().join("dataset.json"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from the canonical path + `SCHOOLBUS_*` environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults → TOML file (if present) → environment
/// (`SCHOOLBUS_DEFAULTS__OUTPUT=json`, `SCHOOLBUS_DEFAULT_PROFILE=prod`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SCHOOLBUS_").split("__"));

    Ok(figment.extract()?)
}

pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Token from `api_token_env`, then the plaintext profile value.
/// `None` means the backend is called unauthenticated.
pub fn resolve_api_token(profile: &Profile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    profile
        .api_token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

// ── Translation to core config ──────────────────────────────────────

pub fn items_per_page(profile: &Profile, defaults: &Defaults) -> Result<NonZeroUsize, ConfigError> {
    let raw = profile.items_per_page.unwrap_or(defaults.items_per_page);
    NonZeroUsize::new(raw).ok_or_else(|| ConfigError::Validation {
        field: "items_per_page".into(),
        reason: "must be at least 1".into(),
    })
}

/// Build a `ControllerConfig` from a profile, with no flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let backend = match profile.backend {
        BackendKind::Local => Backend::Local {
            dataset: Some(
                profile
                    .dataset
                    .clone()
                    .unwrap_or_else(default_dataset_path),
            ),
        },
        BackendKind::Remote => {
            let raw = profile
                .api_url
                .as_deref()
                .ok_or_else(|| ConfigError::Validation {
                    field: "api_url".into(),
                    reason: "required for remote profiles".into(),
                })?;
            let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("invalid URL: {raw}"),
            })?;

            Backend::Remote {
                url,
                token: resolve_api_token(profile),
                tls: tls_for(profile),
                timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
            }
        }
    };

    Ok(ControllerConfig {
        backend,
        items_per_page: items_per_page(profile, defaults)?,
    })
}

pub fn tls_for(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.items_per_page, 10);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                backend: BackendKind::Remote,
                api_url: Some("https://api.schoolbus.ma/v1".into()),
                api_token_env: Some("SCHOOLBUS_PROD_TOKEN".into()),
                ..Profile::default()
            },
        );

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.profiles, cfg.profiles);
    }

    #[test]
    fn mistyped_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profiles.prod]\nbackend = \"remote\"\nitems_per_page = \"ten\"\n")
            .unwrap();

        let err = load_config_from(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Figment(_)));
        assert!(err.to_string().contains("items_per_page"));
    }

    #[test]
    fn remote_profile_requires_url() {
        let profile = Profile {
            backend: BackendKind::Remote,
            ..Profile::default()
        };
        let err = profile_to_controller_config(&profile, &Defaults::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid api_url: required for remote profiles");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let profile = Profile {
            items_per_page: Some(0),
            ..Profile::default()
        };
        assert!(profile_to_controller_config(&profile, &Defaults::default()).is_err());
    }

    #[test]
    fn remote_profile_translates() {
        let profile = Profile {
            backend: BackendKind::Remote,
            api_url: Some("https://api.schoolbus.ma/v1".into()),
            api_token: Some("plain".into()),
            insecure: Some(true),
            timeout: Some(5),
            ..Profile::default()
        };

        let cfg = profile_to_controller_config(&profile, &Defaults::default()).unwrap();

        match cfg.backend {
            Backend::Remote {
                url,
                token,
                tls,
                timeout,
            } => {
                assert_eq!(url.as_str(), "https://api.schoolbus.ma/v1");
                assert!(token.is_some());
                assert_eq!(tls, TlsVerification::DangerAcceptInvalid);
                assert_eq!(timeout, Duration::from_secs(5));
            }
            Backend::Local { .. } => panic!("expected remote backend"),
        }
    }
}
