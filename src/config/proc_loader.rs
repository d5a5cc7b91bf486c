use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::error;

use crate::config::proc_validator;
use crate::config::settings::{LoggingConfig, ServiceConfig};
use crate::observability::metrics::get_metrics;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {:?}", path))?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

/// Runs before logging is installed, so the success path stays silent.
pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let result = build_config(&content);
    if result.is_err() {
        get_metrics().await.config_errors.inc();
    }
    result
}

fn build_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content).inspect_err(|e| {
        error!("parse config error: {}", e);
    })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }

    proc_validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
