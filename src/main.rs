//! PIN dispatch server.

use std::sync::Arc;

use pin_dispatch::PinDispatcher;
use pin_dispatch::config::{DispatchConfig, SMS_KEY_VAR, TELEMETRY_KEY_VAR, bind_addr_from_env};
use pin_dispatch::logging::init_logging;
use pin_dispatch::server::{AppState, SEND_PIN_PATH, router};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DispatchConfig::from_env()?;
    init_logging(config.debug);

    let addr = bind_addr_from_env()?;
    let dispatcher = PinDispatcher::from_config(&config)?;
    info!(
        telemetry_configured = config.telemetry_key.is_some(),
        sms_configured = config.sms_key.is_some(),
        dialing_rules = config.dialing_rules.len(),
        allowed_origin = %config.allowed_origin,
        "configuration loaded"
    );
    if config.telemetry_key.is_none() {
        warn!("{TELEMETRY_KEY_VAR} not set, every dispatch will answer 500");
    }
    if config.sms_key.is_none() {
        info!("{SMS_KEY_VAR} not set, SMS relay disabled");
    }

    let app = router(AppState {
        dispatcher,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, path = SEND_PIN_PATH, "PIN dispatch server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("PIN dispatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
