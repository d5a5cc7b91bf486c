//! Identity provider seam
//!
//! Everything that speaks OAuth2/JWT to the identity provider sits behind
//! `OAuthProvider`; the coordinators only sequence calls to it.

use anyhow::Result;
use reqwest::Url;

use crate::cache::token::Token;
use crate::credentials::installed::InstalledSecret;
use crate::credentials::service_account::ServiceAccountKey;

pub mod google;

pub use google::GoogleOAuth;

pub trait OAuthProvider: Send + Sync {
    /// Consent URL for the installed-app flow, requesting offline access
    fn authorization_url(&self, secret: &InstalledSecret, scopes: &[String]) -> Result<Url>;

    /// Trades a one-time authorization code for a token
    fn exchange_code(
        &self,
        secret: &InstalledSecret,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Token>> + Send;

    /// Signs a JWT for `subject` and trades it for a token
    fn authorize_jwt(
        &self,
        key: &ServiceAccountKey,
        scopes: &[String],
        subject: &str,
    ) -> impl std::future::Future<Output = Result<Token>> + Send;
}
