//! # Stock Guard Demo
//!
//! Runs the module against the in-memory shop:
//!
//! 1. Seeds a few products, one of them already sold out.
//! 2. Installs the module, which scans the catalog and clears caches.
//! 3. Sells out another product so the stock hook fires.
//!
//! An optional first argument names a JSON config file. `STOCK_GUARD_CACHE_DIR` overrides
//! the cache directory; by default the demo uses a directory under the system temp dir.
//!
//! ```bash
//! RUST_LOG=info cargo run -p stock-guard
//! RUST_LOG=debug cargo run -p stock-guard -- guard.json
//! ```

use shop_host::{setup_tracing, ProductId, SeedProduct, ShopId, TracingLogSink};
use std::sync::Arc;
use stock_guard::{GuardConfig, GuardedShop, HandlerOutcome};
use tracing::{info, warn, Instrument};

fn product(raw: u32) -> Result<ProductId, String> {
    ProductId::new(raw).map_err(|e| e.to_string())
}

fn load_config() -> Result<GuardConfig, String> {
    let config = match std::env::args().nth(1) {
        Some(path) => GuardConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => GuardConfig::default()
            .with_cache_dir(std::env::temp_dir().join("stock-guard-demo").join("cache")),
    };
    Ok(config.with_env_overrides())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = load_config()?;
    info!(version = %config.version, cache_dir = %config.cache_dir.display(), "Starting stock guard demo");

    let system = GuardedShop::start(config, Arc::new(TracingLogSink));
    let shop = ShopId::DEFAULT;

    system
        .seed([
            SeedProduct::simple(product(1)?, shop, "Canvas Tote", 12),
            SeedProduct::simple(product(2)?, shop, "Enamel Mug", 0),
            SeedProduct::simple(product(3)?, shop, "Hoodie", 0)
                .with_combination(31, 2)
                .with_combination(32, 1),
            SeedProduct::simple(product(4)?, shop, "Poster", 0).inactive(),
        ])
        .await
        .map_err(|e| e.to_string())?;

    let report = system
        .install(shop)
        .instrument(tracing::info_span!("install"))
        .await;
    if !report.installed {
        warn!("Install failed, stopping");
        return system.shutdown().await;
    }
    if let Some(scan) = &report.scan {
        info!(scanned = scan.scanned, disabled = scan.disabled, "Install scan finished");
    }

    let span = tracing::info_span!("sales");
    async {
        for (combination, quantity) in [(31, 0), (32, 0)] {
            let outcome = system
                .update_quantity(product(3)?, shop, combination, quantity)
                .await
                .map_err(|e| e.to_string())?;
            match outcome {
                Some(HandlerOutcome::Checked(rule)) if rule.disabled() => {
                    info!(combination, "Hoodie sold out and hidden")
                }
                Some(outcome) => info!(combination, ?outcome, "Hook handled"),
                None => warn!(combination, "Hook did not fire"),
            }
        }
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    system.module.on_uninstall().await;
    system.shutdown().await?;

    info!("Demo completed");
    Ok(())
}
