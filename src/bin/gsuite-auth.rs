use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use gsuite_oauth::auth::{AuthorizationManager, AuthorizedClient};
use gsuite_oauth::config::settings::DomainWideSpec;
use gsuite_oauth::observability::metrics::get_metrics;
use gsuite_oauth::utils::config_loader;
use gsuite_oauth::utils::logging;
use gsuite_oauth::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "gsuite-auth.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authorize the configured user account (installed-app flow)
    Authorize {
        /// Print the access token to stdout
        #[arg(long)]
        print_token: bool,
    },
    /// Authorize a service account impersonating a domain user
    Impersonate {
        #[arg(short, long)]
        user: String,
        /// Service-account key file; defaults to `domain_wide.key_file`
        #[arg(long)]
        key_file: Option<PathBuf>,
        /// Scope to request, repeatable; defaults to `domain_wide.scopes`
        #[arg(long = "scope")]
        scopes: Vec<String>,
        #[arg(long)]
        print_token: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);
    info!("config loaded from {}", args.config);

    // -------------------------------
    // 2. Build manager
    // -------------------------------

    let manager = AuthorizationManager::new(service_config.authorization.clone())?;

    // -------------------------------
    // 3. Run requested flow
    // -------------------------------

    match args.command {
        Command::Authorize { print_token } => {
            let client = manager.get_authorisation().await?;
            report(&client, print_token)?;
        }
        Command::Impersonate {
            user,
            key_file,
            scopes,
            print_token,
        } => {
            let defaults = service_config.domain_wide.as_ref();
            let key_file = key_file
                .or_else(|| defaults.map(|d| d.key_file.clone()))
                .ok_or_else(|| anyhow!("--key-file is required when the config has no 'domain_wide' block"))?;
            let scopes = if scopes.is_empty() {
                defaults.map(|d| d.scopes.clone()).unwrap_or_default()
            } else {
                scopes
            };
            if scopes.is_empty() {
                return Err(anyhow!("at least one --scope is required"));
            }

            let spec = DomainWideSpec::new(key_file, scopes, user);
            let client = manager.get_domain_wide_authorisation(&spec).await?;
            report(&client, print_token)?;
        }
    }

    // -------------------------------
    // 4. Dump metrics
    // -------------------------------

    if service_config.settings.metrics.is_enabled {
        eprintln!("{}", get_metrics().await.render()?);
    }
    Ok(())
}

fn report(client: &AuthorizedClient, print_token: bool) -> Result<()> {
    info!("authorized client: {:?}", client.identity());
    if print_token {
        let token = client
            .access_token()
            .ok_or_else(|| anyhow!("token carries no access_token"))?;
        println!("{}", token);
    }
    Ok(())
}
