//! CLI configuration: thin wrapper around `schoolbus_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --data, --api-token, ...).

use secrecy::SecretString;

use schoolbus_core::{Backend, ControllerConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use schoolbus_config::{
    BackendKind, Config, Defaults, Profile, config_path, default_dataset_path, load_config,
    load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, active profile, and
/// flag overrides.
///
/// With no matching profile the CLI still works: `--api-url` selects a
/// remote backend, otherwise the local dataset at the default location
/// is used. An explicitly requested profile must exist, and a config file
/// that fails to parse is an error rather than an empty config.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    match cfg.profiles.get(&name) {
        Some(profile) => resolve_profile(profile, global, &cfg.defaults),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            name,
            available: available_profiles(&cfg),
        }),
        None => resolve_profile(&Profile::default(), global, &cfg.defaults),
    }
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<ControllerConfig, CliError> {
    let mut effective = profile.clone();

    // 1. Backend selection (flag > profile)
    if let Some(ref url) = global.api_url {
        effective.backend = BackendKind::Remote;
        effective.api_url = Some(url.clone());
    } else if let Some(ref path) = global.data {
        effective.backend = BackendKind::Local;
        effective.dataset = Some(path.clone());
    }

    // 2. Transport knobs
    if global.insecure {
        effective.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        effective.timeout = Some(timeout);
    }
    if let Some(per_page) = global.per_page {
        effective.items_per_page = Some(per_page.get());
    }

    let mut config = schoolbus_config::profile_to_controller_config(&effective, defaults)?;

    // 3. Token (flag > env var > plaintext)
    if let (Some(key), Backend::Remote { token, .. }) = (&global.api_token, &mut config.backend) {
        *token = Some(SecretString::from(key.clone()));
    }

    Ok(config)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
