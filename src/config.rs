use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Top-level structure loaded from the YAML file passed via
// `--config`.
//
// It defines:
// - The HTTP listen address for the /metrics endpoint
// - One entry per coin (fork) to poll
//
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Port the exporter listens on
    #[serde(deserialize_with = "port_from_str_or_int")]
    pub port: u16,

    /// Interface the exporter binds to
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// Coin name -> coin configuration.
    ///
    /// The name becomes the metric-name prefix of every family
    /// exported for that coin.
    #[serde(default)]
    pub coins: BTreeMap<String, CoinConfig>,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

// ------------------------------------------------------------
// Coin configuration
// ------------------------------------------------------------
//
// Connection parameters for one fork. All four services share
// the host and the client certificate; each has its own port.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct CoinConfig {
    /// Client certificate (PEM). `$VAR` / `${VAR}` are expanded.
    pub cert: String,

    /// Client private key (PEM). `$VAR` / `${VAR}` are expanded.
    pub key: String,

    /// Host, optionally with scheme (e.g. "https://localhost")
    pub host: String,

    #[serde(deserialize_with = "port_from_str_or_int")]
    pub full_node_port: u16,

    #[serde(deserialize_with = "port_from_str_or_int")]
    pub wallet_port: u16,

    #[serde(deserialize_with = "port_from_str_or_int")]
    pub farmer_port: u16,

    #[serde(deserialize_with = "port_from_str_or_int")]
    pub harvester_port: u16,

    /// Verify the node's server certificate.
    ///
    /// Off by default: fork nodes serve certificates signed by a
    /// per-install private CA. Set together with `ca-cert` to pin it.
    #[serde(default)]
    pub verify_server_cert: bool,

    /// Extra CA trusted when `verify-server-cert` is on
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Metric groups to collect for this coin
    #[serde(default)]
    pub pull_switcher: PullSwitches,
}

// ------------------------------------------------------------
// Metric group switches
// ------------------------------------------------------------
//
// Closed set of named flags. An unknown key fails parsing
// instead of silently disabling a group; an omitted key is off.
//
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct PullSwitches {
    pub conn: bool,
    pub state: bool,
    pub wallet_balance: bool,
    pub wallet_sync: bool,
    pub farmed_amount: bool,
    pub pool: bool,
    pub plots: bool,
}

/// One switchable metric group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    Connections,
    BlockchainState,
    WalletBalance,
    WalletSync,
    FarmedAmount,
    PoolState,
    Plots,
}

impl PullSwitches {
    /// Every group switched on.
    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            conn: true,
            state: true,
            wallet_balance: true,
            wallet_sync: true,
            farmed_amount: true,
            pool: true,
            plots: true,
        }
    }

    pub fn is_enabled(&self, group: MetricGroup) -> bool {
        match group {
            MetricGroup::Connections => self.conn,
            MetricGroup::BlockchainState => self.state,
            MetricGroup::WalletBalance => self.wallet_balance,
            MetricGroup::WalletSync => self.wallet_sync,
            MetricGroup::FarmedAmount => self.farmed_amount,
            MetricGroup::PoolState => self.pool,
            MetricGroup::Plots => self.plots,
        }
    }

    /// True when at least one of the per-wallet groups is on.
    pub fn any_wallet_group(&self) -> bool {
        self.wallet_balance || self.wallet_sync || self.farmed_amount
    }
}

// ------------------------------------------------------------
// Configuration errors
// ------------------------------------------------------------
//
// The only fatal error class: any of these stops the process
// before the listener is bound.
//
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("coin '{0}' is configured more than once")]
    DuplicateCoin(String),

    #[error("coin name '{0}' is not a valid metric prefix")]
    InvalidCoinName(String),

    #[error("[{coin}] cannot load client identity from {path}: {reason}")]
    Identity {
        coin: String,
        path: String,
        reason: String,
    },

    #[error("[{coin}] cannot build RPC client: {source}")]
    Client {
        coin: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Reads and parses the YAML configuration at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&data)
}

pub fn parse_config(data: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(data)?)
}

/// Ports were historically written as quoted strings; accept both.
fn port_from_str_or_int<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Int(u16),
        Str(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Int(p) => Ok(p),
        Port::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{}'", s))),
    }
}
