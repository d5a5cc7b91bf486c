use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Client-secret document: `{ "installed": { client_id, client_secret, redirect_uris } }`
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsDocument {
    pub installed: InstalledSecret,
}

#[derive(Deserialize, Clone)]
pub struct InstalledSecret {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl InstalledSecret {
    /// First registered redirect URI is the one used for the flow
    pub fn redirect_uri(&self) -> Result<&str> {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .ok_or_else(|| anyhow!("client secret has no redirect_uris"))
    }
}

impl fmt::Debug for InstalledSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uris", &self.redirect_uris)
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Reads the client-secret file. Never cached: every attempt re-reads it.
pub async fn load_credentials(path: &Path) -> Result<CredentialsDocument> {
    info!("loading credentials from file");
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {:?}", path))?;
    let document: CredentialsDocument =
        serde_json::from_slice(&content).context("client secret is not a valid 'installed' document")?;
    // fail at load time rather than halfway through the flow
    document.installed.redirect_uri()?;
    Ok(document)
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
