use std::fmt;

use anyhow::{anyhow, Result};
use reqwest::RequestBuilder;

use crate::cache::token::Token;
use crate::credentials::installed::InstalledSecret;
use crate::credentials::service_account::ServiceAccountKey;

/// Whom a client acts for
#[derive(Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    /// Installed-app OAuth2 client
    Installed {
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    },
    /// Service account impersonating `subject`
    ServiceAccount {
        client_email: String,
        subject: String,
        scopes: Vec<String>,
    },
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientIdentity::Installed {
                client_id,
                redirect_uri,
                ..
            } => f
                .debug_struct("Installed")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("redirect_uri", redirect_uri)
                .finish(),
            ClientIdentity::ServiceAccount {
                client_email,
                subject,
                scopes,
            } => f
                .debug_struct("ServiceAccount")
                .field("client_email", client_email)
                .field("subject", subject)
                .field("scopes", scopes)
                .finish(),
        }
    }
}

/// Authorized handle handed to API-calling code
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    identity: ClientIdentity,
    token: Token,
}

impl AuthorizedClient {
    pub fn installed(secret: &InstalledSecret, token: Token) -> Result<Self> {
        Ok(Self {
            identity: ClientIdentity::Installed {
                client_id: secret.client_id.clone(),
                client_secret: secret.client_secret.clone(),
                redirect_uri: secret.redirect_uri()?.to_owned(),
            },
            token,
        })
    }

    pub fn service_account(
        key: &ServiceAccountKey,
        scopes: &[String],
        subject: &str,
        token: Token,
    ) -> Self {
        Self {
            identity: ClientIdentity::ServiceAccount {
                client_email: key.client_email.clone(),
                subject: subject.to_owned(),
                scopes: scopes.to_vec(),
            },
            token,
        }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token.access_token()
    }

    /// Adds `Authorization: Bearer <access_token>` to an outgoing request
    pub fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let access_token = self
            .access_token()
            .ok_or_else(|| anyhow!("token carries no access_token"))?;
        Ok(request.bearer_auth(access_token))
    }
}
