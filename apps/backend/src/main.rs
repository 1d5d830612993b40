use std::sync::Arc;

use landlord_backend::services::{spawn_timer_driver, GameFlowService};
use landlord_backend::telemetry;
use landlord_backend::EngineConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Settings come from LANDLORD_* variables set by the runtime environment.
    let cfg = match EngineConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let flow = Arc::new(GameFlowService::from_config(&cfg));
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let driver = spawn_timer_driver(flow.clone(), Arc::new(tx), cfg.sweep_interval, cancel.clone());

    // The transport layer plugs in here; until then timer events are logged.
    let drain = tokio::spawn(async move {
        while let Some(out) = rx.recv().await {
            let payload = serde_json::to_string(&out.event).unwrap_or_default();
            info!(audience = ?out.audience, event = %payload, "[MAIN] timer event");
        }
    });

    println!("🚀 Landlord engine running (turn timeout {:?})", cfg.turn_timeout);

    tokio::signal::ctrl_c().await?;
    info!("[MAIN] shutdown requested");
    cancel.cancel();

    if let Err(e) = driver.await {
        error!(error = %e, "[MAIN] timer driver panicked");
    }
    if let Err(e) = drain.await {
        error!(error = %e, "[MAIN] event drain panicked");
    }
    Ok(())
}
