//! CLI configuration, a thin wrapper around `cleep_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--url, --username, --insecure, etc.).

use std::time::Duration;

use secrecy::SecretString;

use cleep_core::{ClientConfig, Credentials, FailurePolicy, PARAMETERS_MODULE, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use cleep_config::{
    Config, Profile, config_path, load_config_or_default, parse_url, save_config, store_password,
};

/// Everything a command needs to reach the parameters module.
#[derive(Debug, Clone)]
pub struct Target {
    pub client: ClientConfig,
    pub module: String,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection target from the config file, profile, and CLI
/// overrides.
pub fn build_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global);
    }

    // An explicitly named profile must exist.
    if global.profile.is_some() && global.url.is_none() {
        let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    // No profile: build from CLI flags / env vars alone.
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let mut client = ClientConfig::new(parse_url(url_str)?);
    client.credentials = flag_credentials(global, &profile_name)?;
    client.tls = TlsVerification::DangerAcceptInvalid;
    client.timeout = Duration::from_secs(global.timeout);

    Ok(Target {
        client,
        module: global
            .module
            .clone()
            .unwrap_or_else(|| PARAMETERS_MODULE.into()),
    })
}

/// Translate a `Profile` + global flags into a [`Target`].
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Target, CliError> {
    // 1. URL (flag > env > profile)
    let url = parse_url(global.url.as_deref().unwrap_or(&profile.url))?;

    // 2. Credentials (flags > profile resolution chain)
    let credentials = if global.username.is_some() {
        flag_credentials(global, profile_name)?
    } else {
        cleep_config::resolve_credentials(profile, profile_name)?
    };

    // 3. TLS verification
    let insecure = global.insecure || profile.insecure.unwrap_or(false);
    let tls = match profile.ca_cert {
        Some(ref ca_path) if !insecure => TlsVerification::CustomCa(ca_path.clone()),
        _ => TlsVerification::DangerAcceptInvalid,
    };

    // 4. Timeout: an explicit profile value wins over the flag default
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(global.timeout));

    let mut client = ClientConfig::new(url);
    client.credentials = credentials;
    client.tls = tls;
    client.timeout = timeout;
    if profile.notify_failures {
        client.failure_policy = FailurePolicy::Notify;
    }

    let module = global
        .module
        .clone()
        .or_else(|| profile.module.clone())
        .unwrap_or_else(|| PARAMETERS_MODULE.into());

    Ok(Target { client, module })
}

fn flag_credentials(
    global: &GlobalOpts,
    profile_name: &str,
) -> Result<Option<Credentials>, CliError> {
    let Some(ref username) = global.username else {
        return Ok(None);
    };
    let password = global
        .password
        .as_deref()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;
    Ok(Some(Credentials {
        username: username.clone(),
        password,
    }))
}
