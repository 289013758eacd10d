// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:     YAML configuration and metric group switches
// - schema:     Typed node RPC payloads
// - rpc:        Transport seam, HTTPS client and query primitive
// - translate:  Payload -> gauge sample mapping
// - metrics:    Sample type and the per-scrape sink
// - collector:  Per-coin collectors, registry and scrape fan-out
// - exposition: Prometheus text rendering
// - server:     HTTP listener
// - util:       Shared helpers (URLs, env expansion, sync scalar)
//
mod collector;
mod config;
mod exposition;
mod metrics;
mod rpc;
mod schema;
mod server;
mod translate;
mod util;

// ------------------------------------------------------------
// External dependencies
// ------------------------------------------------------------

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use rustls::crypto::{ring, CryptoProvider};

use collector::registry::CoinRegistry;
use collector::runner::ScrapeOrchestrator;
use config::load_config;

/// Prometheus exporter for Chia-style nodes and their forks.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize logging and the rustls crypto backend
// - Load configuration (any error here is fatal)
// - Build the coin registry once and probe every node
// - Serve /metrics until Ctrl-C
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("nforks-exporter version {}", server::VERSION);

    // --------------------------------------------------------
    // rustls >= 0.23 requires an explicit CryptoProvider when
    // more than one backend is compiled in. Must run once,
    // before the first client is built.
    // --------------------------------------------------------
    CryptoProvider::install_default(ring::default_provider())
        .map_err(|_| anyhow::anyhow!("failed to install rustls CryptoProvider"))?;

    let cfg = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // --------------------------------------------------------
    // Registry: built once, shared read-only by every scrape
    // --------------------------------------------------------
    let registry = Arc::new(CoinRegistry::from_config(&cfg)?);
    if registry.is_empty() {
        warn!("no coins configured; /metrics will be empty");
    }
    registry.probe_all().await;

    let orchestrator = ScrapeOrchestrator::new(registry);
    let families = orchestrator.describe().await;
    info!(
        "{} coins registered, {} metric families on first collection",
        orchestrator.registry().len(),
        families.len()
    );
    for f in &families {
        debug!("family {} {:?}: {}", f.name, f.label_names, f.help);
    }

    let addr: SocketAddr = format!("{}:{}", cfg.listen_host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.listen_host, cfg.port))?;

    server::run(addr, orchestrator, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
