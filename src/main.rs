//! Edu-Supply: capital ledger and decision scoring for educational institutions.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the authenticator, session registry and optional remote sync,
//! then serves the dashboard API until Ctrl+C.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use edusupply::auth::SharedSecretAuthenticator;
use edusupply::config;
use edusupply::dashboard::{self, routes::DashboardState};
use edusupply::session::SessionRegistry;
use edusupply::sync::webhook::WebhookSink;
use edusupply::sync::{RemoteSink, SyncDispatcher};

const BANNER: &str = r#"
  _____    _          ____                    _
 | ____|__| |_   _   / ___| _   _ _ __  _ __ | |_   _
 |  _| / _` | | | |  \___ \| | | | '_ \| '_ \| | | | |
 | |__| (_| | |_| |   ___) | |_| | |_) | |_) | | |_| |
 |_____\__,_|\__,_|  |____/ \__,_| .__/| .__/|_|\__, |
                                 |_|   |_|      |___/
  Decision Master: capital ledger & profit scoring
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("EDUSUPPLY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        app = %cfg.app.name,
        currency = %cfg.app.currency,
        market_delta = ?cfg.scoring.market_selection,
        build_vs_buy_delta = ?cfg.scoring.build_vs_buy,
        "Edu-Supply starting up"
    );

    // -- Authentication --------------------------------------------------

    let license_key = cfg.license_key()?;
    let authenticator = Arc::new(SharedSecretAuthenticator::new(license_key));
    let registry = SessionRegistry::new(authenticator, cfg.scoring.clone());

    // -- Remote sync -----------------------------------------------------

    let sync = match cfg.webhook_url() {
        Some(url) => {
            let sink: Box<dyn RemoteSink> = Box::new(WebhookSink::new(url, cfg.sync.timeout_secs)?);
            info!("Remote sync enabled (webhook)");
            Some(SyncDispatcher::new(vec![sink]))
        }
        None => {
            if cfg.sync.enabled {
                warn!("Remote sync enabled but no webhook URL set, sync disabled");
            }
            None
        }
    };

    // -- Serve -----------------------------------------------------------

    let state = Arc::new(DashboardState::new(
        registry,
        sync,
        PathBuf::from(&cfg.storage.backup_dir),
    ));

    dashboard::serve(state, &cfg.dashboard.host, cfg.dashboard.port).await?;

    info!("Edu-Supply shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("edusupply=info"));

    let json_logging = std::env::var("EDUSUPPLY_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
