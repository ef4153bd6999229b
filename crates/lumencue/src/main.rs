//! Lumencue - networked lighting cue dispatcher
//!
//! Receives timestamped cues over a websocket, schedules them against the
//! local clock and plays them on the wall-light controller, the LED strip and
//! the pass-through patch.
//!
//! Usage: `lumencue [config.toml]`

#![warn(missing_docs)]

mod logging_setup;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::unbounded;
use lumencue_control::{CueServer, OpcClient, OpcConnection, UdpSender};
use lumencue_core::{
    InstrumentRegistry, LumencueConfig, Passthrough, PixelAnimator, ShowEngine, SystemClock,
    WallLight, PASSTHROUGH_KEY, PIXEL_ANIMATOR_KEY, WALL_LIGHT_KEY,
};
use tracing::{info, warn};

/// Register the three instruments in dispatch order
fn build_instruments(config: &LumencueConfig) -> Result<InstrumentRegistry> {
    let mut registry = InstrumentRegistry::new();

    let wall_light = WallLight::new(
        Box::new(UdpSender::new()?),
        config.wall_light.target_addr()?,
    );
    registry.register(WALL_LIGHT_KEY, Box::new(wall_light))?;

    let opc = OpcClient::spawn(
        OpcConnection::new(config.pixels.opc_addr()?, config.pixels.channel)
            .with_min_interval(config.pixels.min_interval()),
    )?;
    let animator = PixelAnimator::new(Box::new(opc), config.pixels.strip_length);
    registry.register(PIXEL_ANIMATOR_KEY, Box::new(animator))?;

    let passthrough = Passthrough::new(
        Box::new(UdpSender::new()?),
        config.puredata.target_addr()?,
    );
    registry.register(PASSTHROUGH_KEY, Box::new(passthrough))?;

    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => LumencueConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => LumencueConfig::default(),
    };

    let _log_guard = logging_setup::init(&config.logging)?;

    info!("==========================================");
    info!("===      Lumencue Session Started      ===");
    info!("==========================================");

    let (cue_tx, cue_rx) = unbounded();
    let engine = ShowEngine::new(build_instruments(&config)?, cue_rx)
        .with_idle_backoff(config.engine.idle_backoff());

    let shutdown = Arc::new(AtomicBool::new(false));
    let dispatch = {
        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name("dispatch".to_string())
            .spawn(move || {
                let mut engine = engine;
                engine.run(&SystemClock, &shutdown);
            })
            .context("Failed to spawn dispatch thread")?
    };

    let server = CueServer::new(config.transport.clone(), cue_tx);
    let served = server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C, serving until killed: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await;

    shutdown.store(true, Ordering::Relaxed);
    dispatch
        .join()
        .map_err(|_| anyhow!("Dispatch thread panicked"))?;

    served?;
    info!("Lumencue stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruments_registered_in_order() {
        let mut config = LumencueConfig::default();
        config.wall_light.target = "127.0.0.1:9".to_string();
        config.puredata.target = "127.0.0.1:9".to_string();

        let registry = build_instruments(&config).unwrap();
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            vec![WALL_LIGHT_KEY, PIXEL_ANIMATOR_KEY, PASSTHROUGH_KEY]
        );
    }
}
