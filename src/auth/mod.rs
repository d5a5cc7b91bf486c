pub mod client;
pub mod manager;
pub mod prompt;

pub use client::{AuthorizedClient, ClientIdentity};
pub use manager::AuthorizationManager;
pub use prompt::{CodePrompt, StdinPrompt};
