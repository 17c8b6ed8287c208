mod api;
mod config;
mod market_data;
mod metrics;
mod state;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

use config::{CONFIG_PATH, Config};
use market_data::fetcher::{HttpTickerSource, TickerSource};
use market_data::refresher::{load_initial, run_refresher};
use crate::metrics::prometheus as telemetry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    init_tracing();

    info!("currency-ticker-service starting");

    let config = Config::load(CONFIG_PATH).context("loading configuration")?;
    info!(symbols = ?config.symbols, upstream = %config.upstream_url, "configuration loaded");

    if let Some(addr) = config.metrics_addr {
        telemetry::init_metrics_server(addr).context("starting metrics exporter")?;
        info!(%addr, "metrics exporter listening");
    }

    let source: Arc<dyn TickerSource> = Arc::new(HttpTickerSource::new(config.upstream_url.clone()));

    // Cheap to clone — the refresher writes, the HTTP handlers read
    let cache = load_initial(source.as_ref(), &config.symbols).await?;
    let (stop_tx, stop_rx) = watch::channel(false);

    let (addr, server) = api::server::bind(config.listen_addr, cache.clone(), stop_rx.clone())
        .context("binding HTTP listener")?;
    info!(%addr, "currency api listening");

    let mut refresher_handle = tokio::spawn(run_refresher(
        source,
        cache,
        config.symbols.clone(),
        config.refresh_interval(),
        stop_rx,
    ));
    let mut server_handle = tokio::spawn(server);

    tokio::select! {
        res = &mut server_handle => {
            match res {
                Ok(Ok(())) => warn!("http server exited"),
                Ok(Err(err)) => warn!(error = %err, "http server returned error"),
                Err(err) => warn!(error = %err, "http server task panicked"),
            }
        }
        res = &mut refresher_handle => {
            if let Err(err) = res {
                warn!(error = %err, "refresher task panicked");
            } else {
                warn!("refresher task exited");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl-C, shutting down");
        }
    }

    let _ = stop_tx.send(true);

    if !server_handle.is_finished() {
        if let Err(err) = server_handle.await {
            warn!(error = %err, "http server task panicked during shutdown");
        }
    }
    if !refresher_handle.is_finished() {
        if let Err(err) = refresher_handle.await {
            warn!(error = %err, "refresher task panicked during shutdown");
        }
    }

    info!("currency-ticker-service stopped");
    Ok(())
}
