use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::credentials::installed::DEFAULT_TOKEN_URI;

/// Service-account key JSON; only the fields needed for the JWT grant are kept
#[derive(Deserialize, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Reads the key file fresh on every call
pub async fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {:?}", path))?;
    serde_json::from_slice(&content).context("not a service account key document")
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
