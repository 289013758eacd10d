//! Payload -> sample mapping
//!
//! One pure function per metric group (the wallet group has one per
//! sub-query). They perform no I/O; the collector decides when each
//! runs and what happens on failure.
//!
//! Every family is prefixed with the coin name.

use log::{debug, warn};

use crate::metrics::MetricSample;
use crate::schema::{
    BlockchainStateResponse, Connections, FarmedAmount, PlotFiles, PoolStateEntry,
    PoolStateResponse, WalletBalanceResponse, WalletHeightInfo, WalletPublicKeys,
    WalletSyncStatus,
};
use crate::util::sync_status;

/// Number of peer node types reported by `get_connections`.
pub const NUM_NODE_TYPES: usize = 6;

const SYNC_HELP: &str = "Sync status, 0=not synced, 1=syncing, 2=synced";

/// A wallet as seen during one scrape.
///
/// The fingerprint is resolved again on every scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub id: u32,
    pub string_id: String,
    pub fingerprint: String,
}

impl Wallet {
    pub fn new(id: u32, fingerprint: String) -> Self {
        Self {
            id,
            string_id: id.to_string(),
            fingerprint,
        }
    }

    fn sample(&self, coin: &str, suffix: &str, help: &'static str, value: f64) -> MetricSample {
        MetricSample::gauge(coin, suffix, help, value)
            .with_label("wallet_id", self.string_id.clone())
            .with_label("wallet_fingerprint", self.fingerprint.clone())
    }
}

// ------------------------------------------------------------
// Full node
// ------------------------------------------------------------

/// Peer counts per node type, always exactly six samples.
pub fn connections(coin: &str, conns: &Connections) -> Vec<MetricSample> {
    let mut peers = [0u32; NUM_NODE_TYPES];
    for c in &conns.connections {
        match (c.node_type as usize).checked_sub(1) {
            Some(idx) if idx < NUM_NODE_TYPES => peers[idx] += 1,
            _ => debug!("[{}] ignoring peer of unknown type {}", coin, c.node_type),
        }
    }

    peers
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            MetricSample::gauge(
                coin,
                "peers_count",
                "Number of peers currently connected.",
                count as f64,
            )
            .with_label("type", (i + 1).to_string())
        })
        .collect()
}

pub fn blockchain_state(coin: &str, resp: &BlockchainStateResponse) -> Vec<MetricSample> {
    let bs = &resp.blockchain_state;
    let peak = bs.peak.unwrap_or_default();

    vec![
        MetricSample::gauge(
            coin,
            "blockchain_sync_status",
            SYNC_HELP,
            sync_status(bs.sync.sync_mode, bs.sync.synced),
        ),
        MetricSample::gauge(coin, "blockchain_height", "Current height", peak.height as f64),
        MetricSample::gauge(
            coin,
            "blockchain_difficulty",
            "Current difficulty",
            bs.difficulty as f64,
        ),
        MetricSample::gauge(
            coin,
            "blockchain_space_bytes",
            "Estimated current netspace",
            bs.space,
        ),
        MetricSample::gauge(
            coin,
            "blockchain_total_iters",
            "Current total iterations",
            peak.total_iters as f64,
        ),
    ]
}

// ------------------------------------------------------------
// Wallet
// ------------------------------------------------------------

/// First fingerprint of a wallet, or "" when it has none.
pub fn first_fingerprint(coin: &str, wallet_id: u32, keys: &WalletPublicKeys) -> String {
    match keys.public_key_fingerprints.as_slice() {
        [] => {
            warn!("[{}] wallet {} has no public key", coin, wallet_id);
            String::new()
        }
        [first] => first.to_string(),
        [first, ..] => {
            warn!(
                "[{}] wallet {} has more than one public key; using the first",
                coin, wallet_id
            );
            first.to_string()
        }
    }
}

pub fn wallet_balance(coin: &str, w: &Wallet, resp: &WalletBalanceResponse) -> Vec<MetricSample> {
    let b = &resp.wallet_balance;
    vec![
        w.sample(
            coin,
            "wallet_confirmed_balance_mojo",
            "Confirmed wallet balance.",
            b.confirmed_wallet_balance as f64,
        ),
        w.sample(
            coin,
            "wallet_unconfirmed_balance_mojo",
            "Unconfirmed wallet balance.",
            b.unconfirmed_wallet_balance as f64,
        ),
        w.sample(
            coin,
            "wallet_spendable_balance_mojo",
            "Spendable wallet balance.",
            b.spendable_balance as f64,
        ),
        w.sample(
            coin,
            "wallet_max_send_mojo",
            "Maximum sendable amount.",
            b.max_send_amount as f64,
        ),
        w.sample(
            coin,
            "wallet_pending_change_mojo",
            "Pending change amount.",
            b.pending_change as f64,
        ),
    ]
}

pub fn wallet_sync_status(coin: &str, w: &Wallet, s: &WalletSyncStatus) -> MetricSample {
    w.sample(coin, "wallet_sync_status", SYNC_HELP, sync_status(s.syncing, s.synced))
}

pub fn wallet_height(coin: &str, w: &Wallet, h: &WalletHeightInfo) -> MetricSample {
    w.sample(coin, "wallet_height", "Wallet synced height.", h.height as f64)
}

pub fn farmed_amount(coin: &str, w: &Wallet, f: &FarmedAmount) -> Vec<MetricSample> {
    vec![
        w.sample(coin, "wallet_farmed_amount", "Farmed amount", f.farmed_amount as f64),
        w.sample(coin, "wallet_reward_amount", "Reward amount", f.reward_amount as f64),
        w.sample(coin, "wallet_fee_amount", "Fee amount", f.fee_amount as f64),
        w.sample(
            coin,
            "wallet_last_height_farmed",
            "Last height farmed",
            f.last_height_farmed as f64,
        ),
        w.sample(
            coin,
            "wallet_pool_reward_amount",
            "Pool reward amount",
            f.pool_reward_amount as f64,
        ),
    ]
}

// ------------------------------------------------------------
// Farmer
// ------------------------------------------------------------

/// Four samples per pool entry.
///
/// The 24h metrics are the number of entries in each list; the
/// entries themselves are not inspected.
pub fn pool_state(coin: &str, resp: &PoolStateResponse) -> Vec<MetricSample> {
    resp.pool_state
        .iter()
        .flat_map(|p| pool_entry(coin, p))
        .collect()
}

fn pool_entry(coin: &str, p: &PoolStateEntry) -> [MetricSample; 4] {
    let labeled = |suffix: &str, help: &'static str, value: f64| {
        MetricSample::gauge(coin, suffix, help, value)
            .with_label("launcher_id", p.pool_config.launcher_id.clone())
            .with_label("pool_url", p.pool_config.pool_url.clone())
    };

    [
        labeled(
            "pool_current_difficulty",
            "Current difficulty on pool.",
            p.current_difficulty.unwrap_or_default() as f64,
        ),
        labeled("pool_current_points", "Current points on pool.", p.current_points as f64),
        labeled(
            "pool_points_acknowledged_24h",
            "Points acknowledged last 24h on pool.",
            p.points_acknowledged_24h.len() as f64,
        ),
        labeled(
            "pool_points_found_24h",
            "Points found last 24h on pool.",
            p.points_found_24h.len() as f64,
        ),
    ]
}

// ------------------------------------------------------------
// Harvester
// ------------------------------------------------------------

pub fn plots(coin: &str, p: &PlotFiles) -> Vec<MetricSample> {
    vec![
        MetricSample::gauge(
            coin,
            "plots_failed_to_open",
            "Number of plots files failed to open.",
            p.failed_to_open.len() as f64,
        ),
        MetricSample::gauge(
            coin,
            "plots_not_found",
            "Number of plots files not found.",
            p.not_found.len() as f64,
        ),
        MetricSample::gauge(
            coin,
            "plots",
            "Number of plots currently using.",
            p.plots.len() as f64,
        ),
    ]
}
