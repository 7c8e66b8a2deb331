//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, BackendKind, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.api_token.is_some() {
            profile.api_token = Some(MASK.into());
        }
    }
    out
}

/// TOML-ish rendering for the table format.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "items_per_page = {}", cfg.defaults.items_per_page);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let backend = match p.backend {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        };
        let _ = writeln!(out, "backend = \"{backend}\"");
        if let Some(ref url) = p.api_url {
            let _ = writeln!(out, "api_url = \"{url}\"");
        }
        if let Some(ref token) = p.api_token {
            let _ = writeln!(out, "api_token = \"{token}\"");
        }
        if let Some(ref env) = p.api_token_env {
            let _ = writeln!(out, "api_token_env = \"{env}\"");
        }
        if let Some(ref dataset) = p.dataset {
            let _ = writeln!(out, "dataset = \"{}\"", dataset.display());
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(per_page) = p.items_per_page {
            let _ = writeln!(out, "items_per_page = {per_page}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_local_profile() -> Result<Profile, CliError> {
    let dataset: String = Input::new()
        .with_prompt("Dataset file")
        .default(config::default_dataset_path().display().to_string())
        .interact_text()
        .map_err(prompt_err)?;

    Ok(Profile {
        backend: BackendKind::Local,
        dataset: Some(PathBuf::from(dataset)),
        ..Profile::default()
    })
}

fn prompt_remote_profile() -> Result<Profile, CliError> {
    let api_url: String = Input::new()
        .with_prompt("Backend URL")
        .default("https://localhost:3000/api".into())
        .interact_text()
        .map_err(prompt_err)?;

    let token_choices = &[
        "Read from an environment variable (recommended)",
        "Save to config file (plaintext)",
        "No token",
    ];
    let selection = Select::new()
        .with_prompt("API token")
        .items(token_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let (api_token, api_token_env) = match selection {
        0 => {
            let var: String = Input::new()
                .with_prompt("Variable name")
                .default("SCHOOLBUS_TOKEN".into())
                .interact_text()
                .map_err(prompt_err)?;
            (None, Some(var))
        }
        1 => {
            let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "api_token".into(),
                    reason: "API token cannot be empty".into(),
                });
            }
            (Some(token), None)
        }
        _ => (None, None),
    };

    Ok(Profile {
        backend: BackendKind::Remote,
        api_url: Some(api_url),
        api_token,
        api_token_env,
        ..Profile::default()
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("schoolbus configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let backend_choices = &[
                "Local dataset file (works offline)",
                "Remote REST backend",
            ];
            let profile = match Select::new()
                .with_prompt("Where do the records live?")
                .items(backend_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => prompt_local_profile()?,
                _ => prompt_remote_profile()?,
            };

            // Validate before writing anything.
            schoolbus_config::profile_to_controller_config(&profile, &config::Defaults::default())?;

            let mut cfg = config::load_config()?;
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: schoolbus buses list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                let color = output::should_color(&global.color);
                eprintln!(
                    "{}",
                    output::dimmed("No profiles configured. Run: schoolbus config init", color)
                );
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
