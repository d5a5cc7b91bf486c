use std::path::PathBuf;

use serde::Deserialize;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub authorization: AuthConfig,
    pub domain_wide: Option<DomainWideDefaults>,
}

/// ================================
/// Global settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MetricsConfig {
    #[serde(default)]
    pub is_enabled: bool,
}

/// ================================
/// Authorization
/// ================================

/// Installed-app flow configuration, fixed for the manager's lifetime.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// client-secret JSON downloaded from the API console
    pub credentials_file: PathBuf,
    /// cached token JSON, read and (over)written
    pub token_file: PathBuf,
    /// requested OAuth scopes, order preserved
    pub scopes: Vec<String>,
}

impl AuthConfig {
    pub fn new(
        credentials_file: impl Into<PathBuf>,
        token_file: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            credentials_file: credentials_file.into(),
            token_file: token_file.into(),
            scopes,
        }
    }
}

/// Per-call request for service-account impersonation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainWideSpec {
    pub key_file: PathBuf,
    pub scopes: Vec<String>,
    pub user: String,
}

impl DomainWideSpec {
    pub fn new(key_file: impl Into<PathBuf>, scopes: Vec<String>, user: impl Into<String>) -> Self {
        Self {
            key_file: key_file.into(),
            scopes,
            user: user.into(),
        }
    }
}

/// Defaults for `impersonate` when flags are omitted
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DomainWideDefaults {
    pub key_file: PathBuf,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl DomainWideDefaults {
    pub fn spec_for(&self, user: impl Into<String>) -> DomainWideSpec {
        DomainWideSpec::new(self.key_file.clone(), self.scopes.clone(), user)
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
