//! # G Suite OAuth Library
//!
//! Acquires authorized clients for G Suite API calls:
//! installed-app OAuth2 with an on-disk token cache, and service-account
//! domain-wide delegation with a per-user in-memory cache.
//!
//! Modules:
//! - `config` — configuration types, YAML loading and validation
//! - `credentials` — client-secret and service-account key documents
//! - `cache` — token type, token file, domain authorisation cache
//! - `provider` — identity provider seam and the Google implementation
//! - `auth` — authorized client handle, code prompt, `AuthorizationManager`

pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod provider;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::{AuthorizationManager, AuthorizedClient};
pub use crate::config::settings::{AuthConfig, DomainWideSpec};
pub use crate::error::AuthError;
