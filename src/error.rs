use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the authorization entry points.
///
/// None of them is retried; the caller re-invokes the entry point.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Client-secret file is missing, unreadable or not valid JSON
    #[error("Error loading client secret file {path:?}: {source}")]
    CredentialsLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Token file exists but cannot be read or parsed
    #[error("Error loading cached token from {path:?}: {source}")]
    TokenLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Operator code could not be read
    #[error("Error reading authorization code: {0}")]
    CodePrompt(#[source] std::io::Error),

    /// Authorization code rejected or the exchange request failed
    #[error("Error while trying to retrieve access token: {source}")]
    TokenExchange {
        #[source]
        source: anyhow::Error,
    },

    /// Token was exchanged (code consumed) but could not be stored
    #[error("Token was issued but could not be stored to {path:?}: {source}")]
    TokenPersist {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Service-account key file is missing or malformed
    #[error("Error loading service account key {path:?}: {source}")]
    KeyLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// JWT signing or validation failed for the impersonated user
    #[error("Could not authenticate {user}: {source}")]
    DomainAuthorization {
        user: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::CredentialsLoad { .. } => "credentials_load",
            AuthError::TokenLoad { .. } => "token_load",
            AuthError::CodePrompt(_) => "code_prompt",
            AuthError::TokenExchange { .. } => "token_exchange",
            AuthError::TokenPersist { .. } => "token_persist",
            AuthError::KeyLoad { .. } => "key_load",
            AuthError::DomainAuthorization { .. } => "domain_authorization",
            AuthError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
