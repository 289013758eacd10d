use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::task::JoinSet;

use crate::{
    config::{CoinConfig, ConfigError, MetricGroup, PullSwitches},
    metrics::SampleSink,
    rpc::{self, empty_body, HttpsTransport, RpcError, RpcTransport},
    schema::{
        BlockchainStateResponse, Connections, FarmedAmount, NetworkInfo, PlotFiles,
        PoolStateResponse, WalletBalanceResponse, WalletHeightInfo, WalletIdQuery,
        WalletPublicKeys, WalletSyncStatus, Wallets,
    },
    translate::{self, Wallet},
    util,
};

/// Base URLs of the four services of one coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub full_node: String,
    pub wallet: String,
    pub farmer: String,
    pub harvester: String,
}

impl Endpoints {
    pub fn from_config(cfg: &CoinConfig) -> Self {
        Self {
            full_node: util::endpoint_url(&cfg.host, cfg.full_node_port),
            wallet: util::endpoint_url(&cfg.host, cfg.wallet_port),
            farmer: util::endpoint_url(&cfg.host, cfg.farmer_port),
            harvester: util::endpoint_url(&cfg.host, cfg.harvester_port),
        }
    }
}

/// The independent units of work run for a coin on every scrape.
///
/// The wallet task covers the balance, sync and farmed-amount
/// groups; it runs when at least one of them is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectTask {
    Connections,
    BlockchainState,
    Wallets,
    PoolState,
    Plots,
}

impl CollectTask {
    pub const ALL: [CollectTask; 5] = [
        CollectTask::Connections,
        CollectTask::BlockchainState,
        CollectTask::Wallets,
        CollectTask::PoolState,
        CollectTask::Plots,
    ];

    pub fn is_enabled(self, switches: &PullSwitches) -> bool {
        match self {
            CollectTask::Connections => switches.is_enabled(MetricGroup::Connections),
            CollectTask::BlockchainState => switches.is_enabled(MetricGroup::BlockchainState),
            CollectTask::Wallets => switches.any_wallet_group(),
            CollectTask::PoolState => switches.is_enabled(MetricGroup::PoolState),
            CollectTask::Plots => switches.is_enabled(MetricGroup::Plots),
        }
    }
}

/// Collector for one coin (fork).
///
/// Owns the coin's transport, endpoints and switches. Built once at
/// startup; every scrape dispatches its enabled tasks concurrently.
///
/// FAILURE MODEL:
/// - A failed query is logged with coin, endpoint and method
/// - It stops the remaining emissions of the unit that issued it
/// - Samples already emitted stay in the scrape
///
pub struct CoinCollector {
    name: String,
    endpoints: Endpoints,
    switches: PullSwitches,
    transport: Arc<dyn RpcTransport>,
}

impl CoinCollector {
    pub fn new(
        name: impl Into<String>,
        endpoints: Endpoints,
        switches: PullSwitches,
        transport: Arc<dyn RpcTransport>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoints,
            switches,
            transport,
        }
    }

    /// Builds the collector and its mutually authenticated transport.
    pub fn from_config(name: &str, cfg: &CoinConfig) -> Result<Self, ConfigError> {
        let transport = HttpsTransport::new(name, cfg)?;
        Ok(Self::new(
            name,
            Endpoints::from_config(cfg),
            cfg.pull_switcher,
            Arc::new(transport),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn enabled_tasks(&self) -> impl Iterator<Item = CollectTask> + '_ {
        CollectTask::ALL
            .into_iter()
            .filter(|t| t.is_enabled(&self.switches))
    }

    /// Spawns one task per enabled unit into `tasks`.
    ///
    /// Returns the number of tasks spawned. Disabled units issue no
    /// query and emit nothing.
    pub fn dispatch(self: &Arc<Self>, tasks: &mut JoinSet<()>, sink: &SampleSink) -> usize {
        let mut spawned = 0;
        for task in self.enabled_tasks() {
            let coin = Arc::clone(self);
            let sink = sink.clone();
            tasks.spawn(async move { coin.run(task, &sink).await });
            spawned += 1;
        }
        spawned
    }

    /// Runs one unit to completion.
    ///
    /// The failing query was already logged at warn with its endpoint;
    /// this only records which unit stopped early.
    pub async fn run(&self, task: CollectTask, sink: &SampleSink) {
        let result = match task {
            CollectTask::Connections => self.collect_connections(sink).await,
            CollectTask::BlockchainState => self.collect_blockchain_state(sink).await,
            CollectTask::Wallets => self.collect_wallets(sink).await,
            CollectTask::PoolState => self.collect_pool_state(sink).await,
            CollectTask::Plots => self.collect_plots(sink).await,
        };
        if let Err(e) = result {
            debug!("[{}] {:?} skipped this scrape: {}", self.name, task, e);
        }
    }

    /// Startup connectivity check against the full node.
    pub async fn probe(&self) -> Result<NetworkInfo, RpcError> {
        self.query(&self.endpoints.full_node, "get_network_info", empty_body())
            .await
    }

    async fn query<T: DeserializeOwned>(
        &self,
        base: &str,
        method: &str,
        body: Value,
    ) -> Result<T, RpcError> {
        rpc::query(self.transport.as_ref(), base, method, body)
            .await
            .inspect_err(|e| warn!("[{}] {}/{} failed: {}", self.name, base, method, e))
    }

    // --------------------------------------------------------
    // Full node
    // --------------------------------------------------------

    async fn collect_connections(&self, sink: &SampleSink) -> Result<(), RpcError> {
        let conns: Connections = self
            .query(&self.endpoints.full_node, "get_connections", empty_body())
            .await?;
        sink.emit_all(translate::connections(&self.name, &conns)).await;
        Ok(())
    }

    async fn collect_blockchain_state(&self, sink: &SampleSink) -> Result<(), RpcError> {
        let state: BlockchainStateResponse = self
            .query(&self.endpoints.full_node, "get_blockchain_state", empty_body())
            .await?;
        sink.emit_all(translate::blockchain_state(&self.name, &state)).await;
        Ok(())
    }

    // --------------------------------------------------------
    // Wallet
    // --------------------------------------------------------
    //
    // Wallets are walked one after another. Each sub-collection of
    // each wallet is its own failure unit: a failed balance query
    // does not stop the sync or farmed-amount queries, nor the next
    // wallet.
    //

    async fn collect_wallets(&self, sink: &SampleSink) -> Result<(), RpcError> {
        let wallets: Wallets = self
            .query(&self.endpoints.wallet, "get_wallets", empty_body())
            .await?;

        for entry in wallets.wallets {
            let wallet = Wallet::new(entry.id, self.wallet_fingerprint(entry.id).await);

            if self.switches.is_enabled(MetricGroup::WalletBalance) {
                if let Err(e) = self.collect_wallet_balance(&wallet, sink).await {
                    debug!("[{}] wallet {} balance skipped: {}", self.name, wallet.id, e);
                }
            }
            if self.switches.is_enabled(MetricGroup::WalletSync) {
                if let Err(e) = self.collect_wallet_sync(&wallet, sink).await {
                    debug!("[{}] wallet {} sync skipped: {}", self.name, wallet.id, e);
                }
            }
            if self.switches.is_enabled(MetricGroup::FarmedAmount) {
                if let Err(e) = self.collect_farmed_amount(&wallet, sink).await {
                    debug!("[{}] wallet {} farmed amount skipped: {}", self.name, wallet.id, e);
                }
            }
        }
        Ok(())
    }

    /// First public-key fingerprint of the wallet, "" on any failure.
    async fn wallet_fingerprint(&self, wallet_id: u32) -> String {
        let keys: Result<WalletPublicKeys, _> = self
            .query(&self.endpoints.wallet, "get_public_keys", wallet_body(wallet_id))
            .await;
        match keys {
            Ok(keys) => translate::first_fingerprint(&self.name, wallet_id, &keys),
            Err(e) => {
                debug!("[{}] wallet {} fingerprint unresolved: {}", self.name, wallet_id, e);
                String::new()
            }
        }
    }

    async fn collect_wallet_balance(&self, w: &Wallet, sink: &SampleSink) -> Result<(), RpcError> {
        let balance: WalletBalanceResponse = self
            .query(&self.endpoints.wallet, "get_wallet_balance", wallet_body(w.id))
            .await?;
        sink.emit_all(translate::wallet_balance(&self.name, w, &balance)).await;
        Ok(())
    }

    async fn collect_wallet_sync(&self, w: &Wallet, sink: &SampleSink) -> Result<(), RpcError> {
        let status: WalletSyncStatus = self
            .query(&self.endpoints.wallet, "get_sync_status", wallet_body(w.id))
            .await?;
        sink.emit(translate::wallet_sync_status(&self.name, w, &status)).await;

        let height: WalletHeightInfo = self
            .query(&self.endpoints.wallet, "get_height_info", wallet_body(w.id))
            .await?;
        sink.emit(translate::wallet_height(&self.name, w, &height)).await;
        Ok(())
    }

    async fn collect_farmed_amount(&self, w: &Wallet, sink: &SampleSink) -> Result<(), RpcError> {
        let farmed: FarmedAmount = self
            .query(&self.endpoints.wallet, "get_farmed_amount", wallet_body(w.id))
            .await?;
        sink.emit_all(translate::farmed_amount(&self.name, w, &farmed)).await;
        Ok(())
    }

    // --------------------------------------------------------
    // Farmer / harvester
    // --------------------------------------------------------

    async fn collect_pool_state(&self, sink: &SampleSink) -> Result<(), RpcError> {
        let pools: PoolStateResponse = self
            .query(&self.endpoints.farmer, "get_pool_state", empty_body())
            .await?;
        sink.emit_all(translate::pool_state(&self.name, &pools)).await;
        Ok(())
    }

    async fn collect_plots(&self, sink: &SampleSink) -> Result<(), RpcError> {
        let plots: PlotFiles = self
            .query(&self.endpoints.harvester, "get_plots", empty_body())
            .await?;
        sink.emit_all(translate::plots(&self.name, &plots)).await;
        Ok(())
    }
}

fn wallet_body(wallet_id: u32) -> Value {
    json!(WalletIdQuery { wallet_id })
}
