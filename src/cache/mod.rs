pub mod domain_cache;
pub mod token;
pub mod token_file;
