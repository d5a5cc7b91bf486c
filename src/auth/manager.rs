use std::sync::Arc;

use tracing::{error, info};

use crate::auth::client::AuthorizedClient;
use crate::auth::prompt::{CodePrompt, StdinPrompt};
use crate::cache::domain_cache::{DomainAuthorisations, Lookup};
use crate::cache::token::Token;
use crate::cache::token_file::{read_token, store_token};
use crate::config::proc_validator::{validate_auth_paths, validate_auth_scopes};
use crate::config::settings::{AuthConfig, DomainWideSpec};
use crate::credentials::installed::{load_credentials, InstalledSecret};
use crate::credentials::service_account::load_service_account_key;
use crate::error::{AuthError, Result};
use crate::observability::metrics::{
    get_metrics, FLOW_DOMAIN_WIDE, FLOW_INTERACTIVE, OUTCOME_ACQUIRED, OUTCOME_CACHED,
};
use crate::provider::{GoogleOAuth, OAuthProvider};

/// Acquires authorized clients for the installed-app flow and for
/// service-account impersonation.
///
/// Configuration is fixed at construction. The per-user domain cache is
/// owned by the instance, so share the manager itself (e.g. behind an
/// `Arc`) rather than creating one per call site.
#[derive(Debug)]
pub struct AuthorizationManager<P = GoogleOAuth, C = StdinPrompt> {
    config: AuthConfig,
    provider: P,
    prompt: C,
    domain_authorisations: DomainAuthorisations,
}

impl AuthorizationManager {
    /// Manager talking to Google endpoints and prompting on stdin
    pub fn new(config: AuthConfig) -> Result<Self> {
        Self::with_provider(config, GoogleOAuth::default(), StdinPrompt)
    }
}

impl<P: OAuthProvider, C: CodePrompt> AuthorizationManager<P, C> {
    /// Scopes are only needed by the installed-app flow and are checked
    /// when it runs.
    pub fn with_provider(config: AuthConfig, provider: P, prompt: C) -> Result<Self> {
        let mut errors = Vec::new();
        validate_auth_paths(&config, &mut errors);
        if !errors.is_empty() {
            return Err(AuthError::Config(errors.join("; ")));
        }

        Ok(Self {
            config,
            provider,
            prompt,
            domain_authorisations: DomainAuthorisations::new(),
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn domain_authorisations(&self) -> &DomainAuthorisations {
        &self.domain_authorisations
    }

    // -------------------------------
    // Installed-app flow
    // -------------------------------

    /// Client for the configured user account.
    ///
    /// Reuses the cached token file when present, otherwise runs the
    /// interactive consent flow and stores the new token.
    pub async fn get_authorisation(&self) -> Result<AuthorizedClient> {
        let metrics = get_metrics().await;
        let result = self.authorise_interactive().await;
        match &result {
            Ok((_, lookup)) => {
                info!("Authorized user");
                metrics
                    .authorizations
                    .with_label_values(&[FLOW_INTERACTIVE, outcome_label(*lookup)])
                    .inc();
            }
            Err(err) => {
                error!("authorization failed: {}", err);
                metrics
                    .authorization_failures
                    .with_label_values(&[FLOW_INTERACTIVE, err.kind()])
                    .inc();
            }
        }
        result.map(|(client, _)| client)
    }

    async fn authorise_interactive(&self) -> Result<(AuthorizedClient, Lookup)> {
        let mut errors = Vec::new();
        validate_auth_scopes(&self.config, &mut errors);
        if !errors.is_empty() {
            return Err(AuthError::Config(errors.join("; ")));
        }

        let secret = self.load_credentials().await?;

        if let Some(token) = self.load_cached_token().await? {
            let client = self.client_for(&secret, token)?;
            return Ok((client, Lookup::Cached));
        }

        let token = self.acquire_token(&secret).await?;
        let client = self.client_for(&secret, token)?;
        Ok((client, Lookup::Acquired))
    }

    async fn load_credentials(&self) -> Result<InstalledSecret> {
        let path = &self.config.credentials_file;
        load_credentials(path)
            .await
            .map(|document| document.installed)
            .map_err(|source| AuthError::CredentialsLoad {
                path: path.clone(),
                source,
            })
    }

    async fn load_cached_token(&self) -> Result<Option<Token>> {
        let path = &self.config.token_file;
        read_token(path).await.map_err(|source| AuthError::TokenLoad {
            path: path.clone(),
            source,
        })
    }

    /// Prompt, exchange and persist. The code is single-use, so a store
    /// failure after a successful exchange still fails the whole call.
    async fn acquire_token(&self, secret: &InstalledSecret) -> Result<Token> {
        let url = self
            .provider
            .authorization_url(secret, &self.config.scopes)
            .map_err(|source| AuthError::CredentialsLoad {
                path: self.config.credentials_file.clone(),
                source,
            })?;

        let code = self
            .prompt
            .read_code(&url)
            .await
            .map_err(AuthError::CodePrompt)?;

        let token = self
            .provider
            .exchange_code(secret, &code)
            .await
            .map_err(|source| AuthError::TokenExchange { source })?;
        get_metrics().await.token_exchanges.inc();

        let path = &self.config.token_file;
        store_token(path, &token)
            .await
            .map_err(|source| AuthError::TokenPersist {
                path: path.clone(),
                source,
            })?;
        Ok(token)
    }

    fn client_for(&self, secret: &InstalledSecret, token: Token) -> Result<AuthorizedClient> {
        AuthorizedClient::installed(secret, token).map_err(|source| AuthError::CredentialsLoad {
            path: self.config.credentials_file.clone(),
            source,
        })
    }

    // -------------------------------
    // Domain-wide delegation
    // -------------------------------

    /// Client impersonating `spec.user` through a service account.
    ///
    /// The first successful call per user is cached for the manager's
    /// lifetime; later calls return the same handle without touching the
    /// key file or the identity provider.
    pub async fn get_domain_wide_authorisation(
        &self,
        spec: &DomainWideSpec,
    ) -> Result<Arc<AuthorizedClient>> {
        let metrics = get_metrics().await;
        let result = self
            .domain_authorisations
            .get_or_try_authorize(&spec.user, || self.authorise_service_account(spec))
            .await;

        match &result {
            Ok((_, lookup)) => {
                metrics
                    .authorizations
                    .with_label_values(&[FLOW_DOMAIN_WIDE, outcome_label(*lookup)])
                    .inc();
            }
            Err(err) => {
                error!("{}", err);
                metrics
                    .authorization_failures
                    .with_label_values(&[FLOW_DOMAIN_WIDE, err.kind()])
                    .inc();
            }
        }
        result.map(|(client, _)| client)
    }

    async fn authorise_service_account(&self, spec: &DomainWideSpec) -> Result<AuthorizedClient> {
        let key = load_service_account_key(&spec.key_file)
            .await
            .map_err(|source| AuthError::KeyLoad {
                path: spec.key_file.clone(),
                source,
            })?;

        let token = self
            .provider
            .authorize_jwt(&key, &spec.scopes, &spec.user)
            .await
            .map_err(|source| AuthError::DomainAuthorization {
                user: spec.user.clone(),
                source,
            })?;

        info!("Authorized {} as a service account user", spec.user);
        Ok(AuthorizedClient::service_account(
            &key,
            &spec.scopes,
            &spec.user,
            token,
        ))
    }
}

fn outcome_label(lookup: Lookup) -> &'static str {
    match lookup {
        Lookup::Cached => OUTCOME_CACHED,
        Lookup::Acquired => OUTCOME_ACQUIRED,
    }
}
