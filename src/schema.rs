use serde::{Deserialize, Serialize};
use serde_json::Value;

// ------------------------------------------------------------
// RPC payload definitions
// ------------------------------------------------------------
//
// Typed views of the node RPC responses consumed by the
// translators. Only the fields that feed a metric are declared;
// everything else in the response is ignored by serde.
//
// List payloads whose *length* is the metric keep their elements
// as opaque `Value`s.
//

/// Request body carrying only a wallet id.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct WalletIdQuery {
    pub wallet_id: u32,
}

// ------------------------------------------------------------
// Full node
// ------------------------------------------------------------

/// `get_connections`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Connections {
    #[serde(default)]
    pub connections: Vec<NodeConnection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NodeConnection {
    /// 1=FULL_NODE 2=HARVESTER 3=FARMER 4=TIMELORD 5=INTRODUCER 6=WALLET
    #[serde(rename = "type")]
    pub node_type: u8,
}

/// `get_blockchain_state`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BlockchainStateResponse {
    pub blockchain_state: BlockchainState,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BlockchainState {
    #[serde(default)]
    pub sync: SyncState,

    /// Absent on a node that has not seen any block yet.
    #[serde(default)]
    pub peak: Option<Peak>,

    #[serde(default)]
    pub difficulty: u64,

    /// Estimated netspace in bytes
    #[serde(default)]
    pub space: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct SyncState {
    #[serde(default)]
    pub sync_mode: bool,
    #[serde(default)]
    pub synced: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct Peak {
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub total_iters: u64,
}

/// `get_network_info`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NetworkInfo {
    #[serde(default)]
    pub network_name: String,
    #[serde(default)]
    pub network_prefix: String,
}

// ------------------------------------------------------------
// Wallet
// ------------------------------------------------------------

/// `get_wallets`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Wallets {
    #[serde(default)]
    pub wallets: Vec<WalletEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalletEntry {
    pub id: u32,
}

/// `get_public_keys`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WalletPublicKeys {
    #[serde(default)]
    pub public_key_fingerprints: Vec<u64>,
}

/// `get_wallet_balance`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WalletBalanceResponse {
    pub wallet_balance: WalletBalance,
}

/// All amounts in mojo.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct WalletBalance {
    #[serde(default)]
    pub confirmed_wallet_balance: u64,
    #[serde(default)]
    pub unconfirmed_wallet_balance: u64,
    #[serde(default)]
    pub spendable_balance: u64,
    #[serde(default)]
    pub max_send_amount: u64,
    #[serde(default)]
    pub pending_change: u64,
}

/// `get_sync_status`
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct WalletSyncStatus {
    #[serde(default)]
    pub syncing: bool,
    #[serde(default)]
    pub synced: bool,
}

/// `get_height_info`
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct WalletHeightInfo {
    #[serde(default)]
    pub height: u64,
}

/// `get_farmed_amount`
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct FarmedAmount {
    #[serde(default)]
    pub farmed_amount: u64,
    #[serde(default)]
    pub reward_amount: u64,
    #[serde(default)]
    pub fee_amount: u64,
    #[serde(default)]
    pub last_height_farmed: u64,
    #[serde(default)]
    pub pool_reward_amount: u64,
}

// ------------------------------------------------------------
// Farmer
// ------------------------------------------------------------

/// `get_pool_state`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PoolStateResponse {
    #[serde(default)]
    pub pool_state: Vec<PoolStateEntry>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PoolStateEntry {
    /// Null while the pool has not answered yet.
    #[serde(default)]
    pub current_difficulty: Option<u64>,
    #[serde(default)]
    pub current_points: u64,
    #[serde(default)]
    pub points_acknowledged_24h: Vec<Value>,
    #[serde(default)]
    pub points_found_24h: Vec<Value>,
    pub pool_config: PoolConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PoolConfig {
    #[serde(default)]
    pub launcher_id: String,
    #[serde(default)]
    pub pool_url: String,
}

// ------------------------------------------------------------
// Harvester
// ------------------------------------------------------------

/// `get_plots`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlotFiles {
    #[serde(default)]
    pub plots: Vec<Value>,
    #[serde(default, rename = "failed_to_open_filenames")]
    pub failed_to_open: Vec<Value>,
    #[serde(default, rename = "not_found_filenames")]
    pub not_found: Vec<Value>,
}
