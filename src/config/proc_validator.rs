//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks paths are non-empty, scopes are present and well-formed,
//!   and the logging level is one of the supported values.

use std::path::Path;

use tracing::error;

use crate::config::settings::{AuthConfig, DomainWideDefaults, ServiceConfig, SettingsConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_auth_config(&cfg.authorization, &mut errors);
    if let Some(domain_wide) = &cfg.domain_wide {
        validate_domain_wide(domain_wide, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

/// Checks the installed-flow block on its own
pub fn validate_auth_config(cfg: &AuthConfig, errors: &mut Vec<String>) {
    validate_auth_paths(cfg, errors);
    validate_auth_scopes(cfg, errors);
}

pub fn validate_auth_paths(cfg: &AuthConfig, errors: &mut Vec<String>) {
    check_path("authorization.credentials_file", &cfg.credentials_file, errors);
    check_path("authorization.token_file", &cfg.token_file, errors);
}

pub fn validate_auth_scopes(cfg: &AuthConfig, errors: &mut Vec<String>) {
    check_scopes("authorization.scopes", &cfg.scopes, errors);
}

fn validate_domain_wide(cfg: &DomainWideDefaults, errors: &mut Vec<String>) {
    check_path("domain_wide.key_file", &cfg.key_file, errors);
    // scopes may be supplied per call, but listed ones must be well-formed
    for scope in &cfg.scopes {
        if scope.trim().is_empty() || scope.contains(char::is_whitespace) {
            errors.push(format!("domain_wide.scopes: invalid scope '{}'", scope));
        }
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn check_path(field: &str, path: &Path, errors: &mut Vec<String>) {
    if path.as_os_str().is_empty() {
        errors.push(format!("{} must not be empty", field));
    }
}

fn check_scopes(field: &str, scopes: &[String], errors: &mut Vec<String>) {
    if scopes.is_empty() {
        errors.push(format!("{} is empty; at least one scope required", field));
    }
    for scope in scopes {
        if scope.trim().is_empty() || scope.contains(char::is_whitespace) {
            errors.push(format!("{}: invalid scope '{}'", field, scope));
        }
    }
}
