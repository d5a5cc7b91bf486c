use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tokio::sync::OnceCell;
use tracing::info;

pub const FLOW_INTERACTIVE: &str = "interactive";
pub const FLOW_DOMAIN_WIDE: &str = "domain_wide";
pub const OUTCOME_CACHED: &str = "cached";
pub const OUTCOME_ACQUIRED: &str = "acquired";

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Authorization metrics
    pub authorizations: IntCounterVec,
    pub authorization_failures: IntCounterVec,
    pub token_exchanges: IntCounter,

    // Config
    pub config_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("gsuite_auth".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            authorizations: IntCounterVec::new(Opts::new("authorizations_total", "Successful authorizations by flow and outcome"), &["flow", "outcome"]).unwrap(),
            authorization_failures: IntCounterVec::new(Opts::new("authorization_failures_total", "Failed authorizations by flow and reason"), &["flow", "reason"]).unwrap(),
            token_exchanges: IntCounter::new("token_exchanges_total", "Authorization codes exchanged for tokens").unwrap(),
            config_errors: IntCounter::new("config_errors_total", "Config parse or validation errors").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.authorizations.clone())).unwrap();
        reg.register(Box::new(metrics.authorization_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_exchanges.clone())).unwrap();
        reg.register(Box::new(metrics.config_errors.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition of the registry
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
