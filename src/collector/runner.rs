use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, error};
use tokio::task::JoinSet;

use crate::metrics::{FamilyDesc, MetricSample, SampleSink};

use super::coin::CollectTask;
use super::registry::CoinRegistry;

/// Sink slots reserved per task; producers wait when it fills up.
const SINK_SLOTS_PER_TASK: usize = 16;

/// Runs scrapes across every registered coin.
///
/// DESIGN:
/// - One task per enabled unit per coin, all spawned up front
/// - All tasks write into one bounded sink drained by the caller
/// - The scrape completes only after every task has finished
///
/// There is no scrape-level deadline. Each query carries its own
/// timeout, so the slowest task bounds the scrape.
///
/// No ordering is guaranteed among coins, groups or samples.
#[derive(Clone)]
pub struct ScrapeOrchestrator {
    registry: Arc<CoinRegistry>,
}

impl ScrapeOrchestrator {
    pub fn new(registry: Arc<CoinRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CoinRegistry {
        &self.registry
    }

    /// Collects one fresh sample set from every coin.
    pub async fn scrape(&self) -> Vec<MetricSample> {
        let capacity = self.registry.len() * CollectTask::ALL.len() * SINK_SLOTS_PER_TASK;
        let (sink, mut rx) = SampleSink::bounded(capacity);

        let mut tasks = JoinSet::new();
        let mut spawned = 0;
        for coin in self.registry.coins() {
            spawned += coin.dispatch(&mut tasks, &sink);
        }

        // Only the tasks hold senders now; the drain ends when they do.
        drop(sink);

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }

        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!("collector task failed: {}", e);
            }
        }

        debug!("scrape finished: {} tasks, {} samples", spawned, samples.len());
        samples
    }

    /// Declares the metric families by replaying one collection.
    ///
    /// Families whose group failed during the replay are missing
    /// from the result, exactly as they would be from that scrape.
    pub async fn describe(&self) -> Vec<FamilyDesc> {
        let mut seen = HashSet::new();
        self.scrape()
            .await
            .into_iter()
            .filter(|s| seen.insert(s.name.clone()))
            .map(|s| FamilyDesc {
                label_names: s.label_names(),
                name: s.name,
                help: s.help,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::coin::CoinCollector;
    use crate::collector::testutil::FakeNode;
    use crate::config::PullSwitches;

    fn registry(coins: Vec<Arc<CoinCollector>>) -> Arc<CoinRegistry> {
        let owned = coins
            .into_iter()
            .map(|c| Arc::try_unwrap(c).unwrap_or_else(|_| panic!("collector shared")))
            .collect();
        Arc::new(CoinRegistry::new(owned).unwrap())
    }

    fn sorted_values(samples: &[MetricSample]) -> Vec<(String, Vec<(&'static str, String)>, u64)> {
        let mut v: Vec<_> = samples
            .iter()
            .map(|s| (s.name.clone(), s.labels.clone(), s.value.to_bits()))
            .collect();
        v.sort();
        v
    }

    #[tokio::test]
    async fn one_coin_outage_leaves_other_coins_intact() {
        let healthy = FakeNode::healthy();
        let broken = FakeNode::healthy();
        broken.unreachable(&FakeNode::endpoints().full_node);

        let orch = ScrapeOrchestrator::new(registry(vec![
            healthy.collector("chia", PullSwitches::all()),
            broken.collector("flax", PullSwitches::all()),
        ]));

        let samples = orch.scrape().await;
        let chia = samples.iter().filter(|s| s.name.starts_with("chia_")).count();
        let flax: Vec<_> = samples.iter().filter(|s| s.name.starts_with("flax_")).collect();

        assert_eq!(chia, 42);
        assert_eq!(flax.len(), 42 - 11);
        assert!(!flax.iter().any(|s| s.name.starts_with("flax_peers")));
        assert!(!flax.iter().any(|s| s.name.starts_with("flax_blockchain")));
    }

    #[tokio::test]
    async fn disabled_coin_contributes_nothing() {
        let a = FakeNode::healthy();
        let b = FakeNode::healthy();
        let orch = ScrapeOrchestrator::new(registry(vec![
            a.collector("chia", PullSwitches::all()),
            b.collector("idle", PullSwitches::default()),
        ]));

        let samples = orch.scrape().await;
        assert!(samples.iter().all(|s| s.name.starts_with("chia_")));
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_scrapes_are_identical() {
        let node = FakeNode::healthy();
        let chia = node.collector("chia", PullSwitches::all());
        let orch = ScrapeOrchestrator::new(registry(vec![chia]));

        let first = orch.scrape().await;
        let second = orch.scrape().await;
        assert_eq!(sorted_values(&first), sorted_values(&second));
    }

    #[tokio::test]
    async fn describe_lists_each_family_once() {
        let node = FakeNode::healthy();
        let chia = node.collector("chia", PullSwitches::all());
        let orch = ScrapeOrchestrator::new(registry(vec![chia]));

        let families = orch.describe().await;
        // peers, 5 chain, 12 wallet, 4 pool, 3 plots
        assert_eq!(families.len(), 1 + 5 + 12 + 4 + 3);

        let peers = families.iter().find(|f| f.name == "chia_peers_count").unwrap();
        assert_eq!(peers.label_names, vec!["type"]);
        let balance = families
            .iter()
            .find(|f| f.name == "chia_wallet_confirmed_balance_mojo")
            .unwrap();
        assert_eq!(balance.label_names, vec!["wallet_id", "wallet_fingerprint"]);
    }

    #[tokio::test]
    async fn empty_registry_scrapes_nothing() {
        let orch = ScrapeOrchestrator::new(Arc::new(CoinRegistry::new(Vec::new()).unwrap()));
        assert!(orch.scrape().await.is_empty());
    }
}
