//! In-memory node used by the collector tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::task::JoinSet;

use crate::config::PullSwitches;
use crate::metrics::{MetricSample, SampleSink};
use crate::rpc::{RpcError, RpcTransport};

use super::coin::{CoinCollector, Endpoints};

/// Canned responses keyed by method, optionally narrowed to a wallet id.
#[derive(Default)]
struct FakeTransport {
    responses: Mutex<HashMap<String, Value>>,
    down: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl RpcTransport for FakeTransport {
    async fn post(&self, base: &str, method: &str, body: Value) -> Result<Value, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.down.lock().unwrap().contains(base) {
            return Err(RpcError::Connectivity("connection refused".into()));
        }
        if self.failing.lock().unwrap().contains(method) {
            return Err(RpcError::Timeout);
        }

        let responses = self.responses.lock().unwrap();
        let narrowed = body
            .get("wallet_id")
            .and_then(Value::as_u64)
            .and_then(|id| responses.get(&format!("{}#{}", method, id)));

        narrowed
            .or_else(|| responses.get(method))
            .cloned()
            .ok_or_else(|| RpcError::Decode(format!("no canned response for {}", method)))
    }
}

pub struct FakeNode {
    transport: Arc<FakeTransport>,
}

impl FakeNode {
    /// A node answering every method the exporter uses.
    ///
    /// Two wallets (ids 1 and 7), peers of types [1, 1, 3], one pool.
    pub fn healthy() -> Self {
        let node = Self {
            transport: Arc::new(FakeTransport::default()),
        };

        node.respond("get_network_info", json!({
            "network_name": "mainnet",
            "network_prefix": "xch",
            "success": true
        }));
        node.respond("get_connections", json!({
            "connections": [{"type": 1}, {"type": 1}, {"type": 3}],
            "success": true
        }));
        node.respond("get_blockchain_state", json!({
            "blockchain_state": {
                "sync": {"sync_mode": false, "synced": true},
                "peak": {"height": 2500000, "total_iters": 8000000000000u64},
                "difficulty": 3000,
                "space": 2.1e19
            },
            "success": true
        }));
        node.respond("get_wallets", json!({"wallets": [{"id": 1}, {"id": 7}], "success": true}));
        node.respond("get_public_keys", json!({
            "public_key_fingerprints": [1234567],
            "success": true
        }));
        node.respond("get_wallet_balance", json!({
            "wallet_balance": {
                "confirmed_wallet_balance": 1750000000000u64,
                "unconfirmed_wallet_balance": 1750000000000u64,
                "spendable_balance": 1750000000000u64,
                "max_send_amount": 1750000000000u64,
                "pending_change": 0
            },
            "success": true
        }));
        node.respond("get_sync_status", json!({"syncing": false, "synced": true, "success": true}));
        node.respond("get_height_info", json!({"height": 2499990, "success": true}));
        node.respond("get_farmed_amount", json!({
            "farmed_amount": 500000000000u64,
            "reward_amount": 250000000000u64,
            "fee_amount": 0,
            "last_height_farmed": 2400000,
            "pool_reward_amount": 1750000000000u64,
            "success": true
        }));
        node.respond("get_pool_state", json!({
            "pool_state": [{
                "current_difficulty": 10,
                "current_points": 420,
                "points_acknowledged_24h": [[1, 10], [2, 10], [3, 10]],
                "points_found_24h": [[1, 10], [2, 10], [3, 10], [4, 10], [5, 10]],
                "pool_config": {"launcher_id": "0xfeed", "pool_url": "https://pool.example"}
            }],
            "success": true
        }));
        node.respond("get_plots", json!({
            "plots": [{}, {}],
            "failed_to_open_filenames": [],
            "not_found_filenames": ["/mnt/gone.plot"],
            "success": true
        }));

        node
    }

    pub fn endpoints() -> Endpoints {
        Endpoints {
            full_node: "https://node:8555".into(),
            wallet: "https://node:9256".into(),
            farmer: "https://node:8559".into(),
            harvester: "https://node:8560".into(),
        }
    }

    pub fn respond(&self, method: &str, body: Value) {
        self.transport.responses.lock().unwrap().insert(method.to_string(), body);
    }

    pub fn respond_for_wallet(&self, method: &str, wallet_id: u32, body: Value) {
        self.transport
            .responses
            .lock()
            .unwrap()
            .insert(format!("{}#{}", method, wallet_id), body);
    }

    pub fn unreachable(&self, base: &str) {
        self.transport.down.lock().unwrap().insert(base.to_string());
    }

    pub fn fail_method(&self, method: &str) {
        self.transport.failing.lock().unwrap().insert(method.to_string());
    }

    pub fn calls(&self) -> usize {
        self.transport.calls.load(Ordering::SeqCst)
    }

    pub fn collector(&self, name: &str, switches: PullSwitches) -> Arc<CoinCollector> {
        Arc::new(CoinCollector::new(
            name,
            Self::endpoints(),
            switches,
            self.transport.clone(),
        ))
    }
}

/// Runs every enabled task of one coin and gathers its samples.
pub async fn collect(coin: &Arc<CoinCollector>) -> Vec<MetricSample> {
    let (sink, mut rx) = SampleSink::bounded(8);
    let mut tasks = JoinSet::new();
    coin.dispatch(&mut tasks, &sink);
    drop(sink);

    let mut out = Vec::new();
    while let Some(s) = rx.recv().await {
        out.push(s);
    }
    while tasks.join_next().await.is_some() {}
    out
}
