// tests/common/mod.rs
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Url;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::prompt::CodePrompt;
use crate::cache::token::Token;
use crate::config::settings::AuthConfig;
use crate::credentials::installed::InstalledSecret;
use crate::credentials::service_account::ServiceAccountKey;
use crate::provider::{GoogleOAuth, OAuthProvider};

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/service_account_pub.pem");

/// Temp dir holding credentials / token / key files for one test
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        self.write(name, &value.to_string())
    }

    /// `{installed:{client_id:"A",client_secret:"B",redirect_uris:["C"]}}`
    pub fn credentials(&self) -> PathBuf {
        self.write_json(
            "credentials.json",
            &json!({"installed": {"client_id": "A", "client_secret": "B", "redirect_uris": ["C"]}}),
        )
    }

    pub fn credentials_with_token_uri(&self, token_uri: &str) -> PathBuf {
        self.write_json(
            "credentials.json",
            &json!({"installed": {
                "client_id": "A",
                "client_secret": "B",
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"],
                "token_uri": token_uri
            }}),
        )
    }

    pub fn service_account_key(&self, name: &str, token_uri: &str) -> PathBuf {
        self.write_json(
            name,
            &json!({
                "type": "service_account",
                "client_email": "robot@project.iam.gserviceaccount.com",
                "private_key": TEST_PRIVATE_KEY,
                "private_key_id": "test-key",
                "token_uri": token_uri
            }),
        )
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(
            self.path("credentials.json"),
            self.path("token.json"),
            vec![
                "https://www.googleapis.com/auth/admin.directory.user".to_owned(),
                "https://www.googleapis.com/auth/admin.directory.group".to_owned(),
            ],
        )
    }
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).expect("read json")).expect("parse json")
}

/// Provider double that records calls instead of talking to Google
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pub exchange_token: Option<Token>,
    pub jwt_delay: Option<Duration>,
    pub failing_users: HashSet<String>,
    pub url_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    pub jwt_calls: AtomicUsize,
    pub exchanged_codes: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn exchanging(token: Token) -> Arc<Self> {
        Arc::new(Self {
            exchange_token: Some(token),
            ..Default::default()
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl OAuthProvider for Arc<ScriptedProvider> {
    fn authorization_url(&self, secret: &InstalledSecret, scopes: &[String]) -> Result<Url> {
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        GoogleOAuth::default().authorization_url(secret, scopes)
    }

    async fn exchange_code(&self, _secret: &InstalledSecret, code: &str) -> Result<Token> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.exchanged_codes.lock().unwrap().push(code.to_owned());
        self.exchange_token
            .clone()
            .ok_or_else(|| anyhow!("invalid_grant: Malformed auth code."))
    }

    async fn authorize_jwt(
        &self,
        _key: &ServiceAccountKey,
        _scopes: &[String],
        subject: &str,
    ) -> Result<Token> {
        self.jwt_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.jwt_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_users.contains(subject) {
            return Err(anyhow!("unauthorized_client"));
        }
        Ok(Token::with_access_token(format!("jwt-{}", subject)))
    }
}

/// Prompt double returning a fixed code, or EOF when none is set
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    pub code: Option<String>,
    pub calls: AtomicUsize,
    pub shown_urls: Mutex<Vec<Url>>,
}

impl ScriptedPrompt {
    pub fn answering(code: &str) -> Arc<Self> {
        Arc::new(Self {
            code: Some(code.to_owned()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodePrompt for Arc<ScriptedPrompt> {
    async fn read_code(&self, authorization_url: &Url) -> io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.shown_urls.lock().unwrap().push(authorization_url.clone());
        self.code
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}
