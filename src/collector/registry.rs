use std::collections::HashSet;
use std::sync::Arc;

use log::{info, warn};

use crate::config::{Config, ConfigError};

use super::coin::CoinCollector;

/// Every configured coin, built once at startup.
///
/// Immutable for the lifetime of the process: handlers receive it
/// behind an `Arc` and only read it.
pub struct CoinRegistry {
    coins: Vec<Arc<CoinCollector>>,
}

impl CoinRegistry {
    /// Validates names and wraps the collectors.
    ///
    /// Names become metric prefixes, so they must be unique and
    /// match `[a-zA-Z_][a-zA-Z0-9_]*`.
    pub fn new(coins: Vec<CoinCollector>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for coin in &coins {
            if !is_metric_prefix(coin.name()) {
                return Err(ConfigError::InvalidCoinName(coin.name().to_string()));
            }
            if !seen.insert(coin.name().to_string()) {
                return Err(ConfigError::DuplicateCoin(coin.name().to_string()));
            }
        }

        Ok(Self {
            coins: coins.into_iter().map(Arc::new).collect(),
        })
    }

    /// Builds one HTTPS-backed collector per configured coin.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let coins = cfg
            .coins
            .iter()
            .map(|(name, coin)| CoinCollector::from_config(name, coin))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(coins)
    }

    /// Probes every coin's full node. Failures are only logged.
    pub async fn probe_all(&self) {
        for coin in &self.coins {
            let base = &coin.endpoints().full_node;
            match coin.probe().await {
                Ok(info) => info!(
                    "[{}] Connected to node at {} on {} ({})",
                    coin.name(),
                    base,
                    info.network_name,
                    info.network_prefix
                ),
                Err(e) => warn!("[{}] node at {} not reachable yet: {}", coin.name(), base, e),
            }
        }
    }

    pub fn coins(&self) -> &[Arc<CoinCollector>] {
        &self.coins
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

fn is_metric_prefix(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::coin::Endpoints;
    use crate::collector::testutil::FakeNode;
    use crate::config::{parse_config, PullSwitches};

    fn coin(node: &FakeNode, name: &str) -> CoinCollector {
        // Unwrap the Arc the fake hands out; nothing else holds it yet.
        Arc::try_unwrap(node.collector(name, PullSwitches::default()))
            .unwrap_or_else(|_| panic!("collector shared"))
    }

    #[test]
    fn rejects_duplicate_names() {
        let node = FakeNode::healthy();
        let err = CoinRegistry::new(vec![coin(&node, "chia"), coin(&node, "chia")])
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::DuplicateCoin(name) if name == "chia"));
    }

    #[test]
    fn rejects_names_that_cannot_prefix_metrics() {
        let node = FakeNode::healthy();
        for bad in ["flax-network", "1chia", ""] {
            let err = CoinRegistry::new(vec![coin(&node, bad)]).err().unwrap();
            assert!(matches!(err, ConfigError::InvalidCoinName(_)));
        }
    }

    #[test]
    fn accepts_distinct_valid_names() {
        let node = FakeNode::healthy();
        let reg = CoinRegistry::new(vec![coin(&node, "chia"), coin(&node, "flax_v2")]).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(!reg.is_empty());
    }

    #[test]
    fn from_config_fails_on_unreadable_identity() {
        let cfg = parse_config(
            r#"
port: 9133
coins:
  chia:
    cert: /nonexistent/a.crt
    key: /nonexistent/a.key
    host: localhost
    full-node-port: 8555
    wallet-port: 9256
    farmer-port: 8559
    harvester-port: 8560
"#,
        )
        .unwrap();
        assert!(matches!(
            CoinRegistry::from_config(&cfg),
            Err(ConfigError::Identity { .. })
        ));
        assert_eq!(
            Endpoints::from_config(&cfg.coins["chia"]).wallet,
            "https://localhost:9256"
        );
    }

    #[tokio::test]
    async fn probe_failures_do_not_panic() {
        let node = FakeNode::healthy();
        node.unreachable(&FakeNode::endpoints().full_node);
        let reg = CoinRegistry::new(vec![coin(&node, "chia")]).unwrap();
        reg.probe_all().await;
    }
}
