use std::io::ErrorKind;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::cache::token::Token;

/// Reads the cached token.
///
/// `Ok(None)` when the file does not exist; any other read or parse
/// failure is an error.
pub async fn read_token(path: &Path) -> Result<Option<Token>> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no cached token at {:?}", path);
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("reading {:?}", path)),
    };

    match serde_json::from_slice::<Value>(&content).context("token file is not valid JSON")? {
        Value::Object(map) => Ok(Some(Token::from(map))),
        _ => Err(anyhow!("token file must hold a JSON object")),
    }
}

/// Overwrites the token file. On Unix the file is owner-only (`0600`)
/// before any token bytes reach it.
pub async fn store_token(path: &Path, token: &Token) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {:?}", parent))?;
    }
    let body = serde_json::to_vec(token)?;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("opening {:?}", path))?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await
            .with_context(|| format!("restricting permissions on {:?}", path))?;
    }

    file.write_all(&body)
        .await
        .with_context(|| format!("writing {:?}", path))?;
    file.flush().await?;

    info!("Token stored to {:?}", path);
    Ok(())
}
