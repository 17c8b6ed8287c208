use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::market_data::fetcher::TickerSource;
use crate::metrics::prometheus as telemetry;
use crate::state::market_cache::MarketCache;

/// Startup fetch. Without an initial snapshot there is nothing to serve, so any
/// failure is returned to the caller.
pub async fn load_initial(source: &dyn TickerSource, symbols: &[String]) -> anyhow::Result<MarketCache> {
    let initial = source
        .fetch(symbols)
        .await
        .context("fetching initial markets")?;

    telemetry::set_snapshot_size(initial.len());
    info!(symbols = initial.len(), "initial markets loaded");

    Ok(MarketCache::new(initial))
}

/// Fetches once and swaps the result into the cache.
/// On failure the current snapshot is left untouched. Returns whether a swap happened.
pub async fn refresh_once(source: &dyn TickerSource, cache: &MarketCache, symbols: &[String]) -> bool {
    match source.fetch(symbols).await {
        Ok(snapshot) => {
            let len = cache.replace(snapshot).await;
            telemetry::record_refresh(true);
            telemetry::set_snapshot_size(len);
            debug!(symbols = len, "market snapshot replaced");
            true
        }
        Err(err) => {
            telemetry::record_refresh(false);
            warn!(error = %err, "market refresh failed, keeping previous snapshot");
            false
        }
    }
}

/// Refreshes the cache every `period` until `stop` fires (or its sender goes away).
/// The first refresh happens one full period after start.
pub async fn run_refresher(
    source: Arc<dyn TickerSource>,
    cache: MarketCache,
    symbols: Vec<String>,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) {
    if *stop.borrow() {
        return;
    }

    let Some(first_tick) = Instant::now().checked_add(period) else {
        warn!(period_secs = period.as_secs(), "refresh period cannot be scheduled, refresher not started");
        return;
    };

    let mut ticker = interval_at(first_tick, period);
    // A slow upstream pushes the schedule back instead of firing a burst afterwards
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_ms = period.as_millis() as u64, "market refresher started");

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {}
        }

        info!("updating markets");

        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = refresh_once(source.as_ref(), &cache, &symbols) => {}
        }
    }

    info!("market refresher stopped");
}
