//! Flag-aware configuration resolution.
//!
//! `hassfix-config` owns the TOML file and credential chain; this module
//! layers the global CLI flags on top and produces the `ConnectionConfig`
//! and ignore rules a command runs with.

use std::time::Duration;

use regex::Regex;
use secrecy::SecretString;

use hassfix_api::{ConnectionConfig, TlsMode, TransportConfig};
use hassfix_config::{Config, Profile};
use hassfix_core::scan::IgnoreRule;

use crate::cli::GlobalOpts;
use crate::error::CliError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection config and ignore rules for a command.
///
/// A matching profile supplies the defaults with CLI flags layered on
/// top; without one the flags alone must be enough.
pub fn resolve_connection(
    global: &GlobalOpts,
) -> Result<(ConnectionConfig, Vec<IgnoreRule>), CliError> {
    let cfg = hassfix_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let connection = resolve_profile(profile, &profile_name, global)?;
        let ignore = ignore_rules(profile)?;
        return Ok((connection, ignore));
    }

    // No profile -- build from flags / env vars alone.
    let host = global.host.clone().ok_or_else(|| CliError::NoConfig {
        path: hassfix_config::config_path().display().to_string(),
    })?;
    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoToken {
            profile: profile_name,
        })?;

    Ok((
        ConnectionConfig {
            host,
            tls: global.tls,
            token,
            transport: transport(global.insecure, global.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        },
        Vec::new(),
    ))
}

/// Translate a profile + global flags into a `ConnectionConfig`.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ConnectionConfig, CliError> {
    let host = global
        .host
        .clone()
        .unwrap_or_else(|| profile.host.clone());
    if host.is_empty() {
        return Err(CliError::Validation {
            field: "host".into(),
            reason: "host must not be empty".into(),
        });
    }

    let token = match &global.token {
        Some(token) => SecretString::from(token.clone()),
        None => hassfix_config::resolve_token(profile, profile_name)?,
    };

    let insecure = global.insecure || profile.insecure.unwrap_or(false);
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(ConnectionConfig {
        host,
        tls: global.tls || profile.tls,
        token,
        transport: transport(insecure, timeout),
    })
}

fn transport(insecure: bool, timeout_secs: u64) -> TransportConfig {
    TransportConfig {
        tls: if insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: Duration::from_secs(timeout_secs),
    }
}

/// Compile the profile's ignore lists into scanner rules.
fn ignore_rules(profile: &Profile) -> Result<Vec<IgnoreRule>, CliError> {
    let mut rules: Vec<IgnoreRule> = profile
        .ignore
        .iter()
        .cloned()
        .map(IgnoreRule::Exact)
        .collect();
    for pattern in &profile.ignore_patterns {
        let re = Regex::new(pattern).map_err(|e| CliError::Validation {
            field: "ignore_patterns".into(),
            reason: format!("invalid pattern '{pattern}': {e}"),
        })?;
        rules.push(IgnoreRule::Pattern(re));
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_lists_compile_into_rules() {
        let profile = Profile {
            host: "hass.local:8123".into(),
            ignore: vec!["sensor.known_gone".into()],
            ignore_patterns: vec![r"^light\.debug_".into()],
            ..Profile::default()
        };

        let rules = ignore_rules(&profile).expect("valid patterns");
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn bad_ignore_pattern_is_rejected() {
        let profile = Profile {
            host: "hass.local:8123".into(),
            ignore_patterns: vec!["[".into()],
            ..Profile::default()
        };

        assert!(matches!(
            ignore_rules(&profile),
            Err(CliError::Validation { field, .. }) if field == "ignore_patterns"
        ));
    }
}
