use anyhow::{anyhow, Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::cache::token::Token;
use crate::credentials::installed::InstalledSecret;
use crate::credentials::service_account::ServiceAccountKey;
use crate::helpers::time::now_i64;
use crate::provider::OAuthProvider;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Google OAuth2 endpoints over `reqwest`
#[derive(Debug, Clone, Default)]
pub struct GoogleOAuth {
    client: Client,
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
    sub: &'a str,
}

impl GoogleOAuth {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn sign_assertion(key: &ServiceAccountKey, scopes: &[String], subject: &str) -> Result<String> {
        let iat = now_i64();
        let claims = JwtClaims {
            iss: &key.client_email,
            scope: scopes.join(" "),
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
            sub: subject,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id.clone();

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("private_key is not a valid RSA PEM key")?;
        encode(&header, &claims, &signing_key).context("signing JWT assertion")
    }

    async fn request_token(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<Token> {
        let response = self.client.post(token_uri).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("token request to {} failed. Status: {}, Body: {}", token_uri, status, body);
            return Err(anyhow!("token request failed with status {}: {}", status, body));
        }

        let body: Map<String, Value> = response
            .json()
            .await
            .context("token response is not a JSON object")?;
        debug!("token response received from {}", token_uri);
        Ok(Token::from_response(body))
    }
}

impl OAuthProvider for GoogleOAuth {
    fn authorization_url(&self, secret: &InstalledSecret, scopes: &[String]) -> Result<Url> {
        let scope = scopes.join(" ");
        let url = Url::parse_with_params(
            &secret.auth_uri,
            &[
                ("access_type", "offline"),
                ("scope", scope.as_str()),
                ("response_type", "code"),
                ("client_id", secret.client_id.as_str()),
                ("redirect_uri", secret.redirect_uri()?),
            ],
        )?;
        Ok(url)
    }

    async fn exchange_code(&self, secret: &InstalledSecret, code: &str) -> Result<Token> {
        let form = [
            ("code", code),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("redirect_uri", secret.redirect_uri()?),
            ("grant_type", "authorization_code"),
        ];
        self.request_token(&secret.token_uri, &form).await
    }

    async fn authorize_jwt(
        &self,
        key: &ServiceAccountKey,
        scopes: &[String],
        subject: &str,
    ) -> Result<Token> {
        let assertion = Self::sign_assertion(key, scopes, subject)?;
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        self.request_token(&key.token_uri, &form).await
    }
}
