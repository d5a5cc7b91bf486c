pub mod installed;
pub mod service_account;
