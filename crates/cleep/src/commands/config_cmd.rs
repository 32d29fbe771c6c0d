//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if let Some(ref module) = p.module {
            let _ = writeln!(out, "module = \"{module}\"");
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
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
        if p.notify_failures {
            let _ = writeln!(out, "notify_failures = true");
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

fn prompt_password(label: &str) -> Result<String, CliError> {
    let pass = rpassword::prompt_password(format!("{label}: ")).map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

/// Offer to store the password in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored in
/// the keyring.
fn prompt_keyring_storage(
    profile_name: &str,
    password: String,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, &SecretString::from(password))?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("Cleep CLI configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("Device URL")
                .default("http://cleep.local".into())
                .interact_text()
                .map_err(prompt_err)?;
            config::parse_url(&url)?;

            let username: String = Input::new()
                .with_prompt("Username (leave empty while secured access is off)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let (username, password) = if username.is_empty() {
                (None, None)
            } else {
                let password = prompt_password("Password")?;
                (
                    Some(username),
                    prompt_keyring_storage(&profile_name, password)?,
                )
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    url,
                    username,
                    password,
                    insecure: global.insecure.then_some(true),
                    ..Profile::default()
                },
            );
            if cfg.profiles.len() == 1 || cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }
            config::save_config(&cfg)?;

            eprintln!("\n   ✓ Profile '{profile_name}' saved");
            eprintln!("   Try: cleep show");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => format_config_redacted(&cfg),
                _ => output::render_single(
                    &global.output,
                    &redacted(cfg),
                    |_| Vec::new(),
                    |c| c.default_profile.clone().unwrap_or_default(),
                ),
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            let lines: Vec<String> = names
                .into_iter()
                .map(|name| {
                    let marker = if name == default { "*" } else { " " };
                    format!("{marker} {name}  {}", cfg.profiles[name].url)
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        // ── Use ─────────────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available.join(", "),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available.join(", "),
                });
            }
            let password = prompt_password("Password")?;
            config::store_password(&profile_name, &SecretString::from(password))?;
            if !global.quiet {
                eprintln!("✓ Password stored in system keyring for '{profile_name}'");
            }
            Ok(())
        }
    }
}

/// Copy of `cfg` with plaintext passwords masked, for structured output.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_masks_plaintext_passwords() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "attic".into(),
            Profile {
                url: "http://attic.local".into(),
                username: Some("admin".into()),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg);
        assert!(text.contains("[profiles.attic]"));
        assert!(text.contains("username = \"admin\""));
        assert!(!text.contains("hunter2"));

        let masked = redacted(cfg);
        assert_eq!(masked.profiles["attic"].password.as_deref(), Some("****"));
    }
}
