use std::fs;
use std::time::Duration;

use reqwest::{Certificate, Client, Identity};
use serde_json::Value;

use crate::config::{CoinConfig, ConfigError};
use crate::util;

use super::error::RpcError;
use super::transport::RpcTransport;

/// Deadline for one whole request/response exchange, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for dialing plus the TLS handshake of a new connection.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
pub const POOL_MAX_IDLE: usize = 100;

/// Mutually authenticated HTTPS transport for one coin.
///
/// The inner client owns a connection pool; it is built once at
/// startup and reused by every scrape, so the handshake is paid
/// only when a pooled connection has expired.
pub struct HttpsTransport {
    client: Client,
    request_timeout: Duration,
}

impl HttpsTransport {
    pub fn new(coin: &str, cfg: &CoinConfig) -> Result<Self, ConfigError> {
        let identity = load_identity(coin, cfg)?;

        let mut builder = Client::builder()
            .identity(identity)
            .connect_timeout(HANDSHAKE_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE);

        if cfg.verify_server_cert {
            if let Some(ca) = &cfg.ca_cert {
                builder = builder.add_root_certificate(load_ca(coin, ca)?);
            }
        } else {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|source| ConfigError::Client {
            coin: coin.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            request_timeout: REQUEST_TIMEOUT,
        })
    }
}

#[async_trait::async_trait]
impl RpcTransport for HttpsTransport {
    async fn post(&self, base: &str, method: &str, body: Value) -> Result<Value, RpcError> {
        let url = format!("{}/{}", base, method);
        exchange(&self.client, url, body, self.request_timeout).await
    }
}

/// Sends one request and reads the full response within `limit`.
///
/// The deadline covers the send, the headers and every body read. A
/// peer that keeps trickling bytes is cut off like a silent one.
async fn exchange(
    client: &Client,
    url: String,
    body: Value,
    limit: Duration,
) -> Result<Value, RpcError> {
    let round_trip = async {
        let resp = client
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let bytes = resp.bytes().await?;
        Ok::<Value, RpcError>(serde_json::from_slice(&bytes)?)
    };

    tokio::time::timeout(limit, round_trip)
        .await
        .map_err(|_| RpcError::Timeout)?
}

/// Builds the client identity from the PEM cert and key files.
fn load_identity(coin: &str, cfg: &CoinConfig) -> Result<Identity, ConfigError> {
    let cert_path = util::expand_env(&cfg.cert);
    let key_path = util::expand_env(&cfg.key);

    let mut pem = read_pem(coin, &cert_path)?;
    pem.push(b'\n');
    pem.extend(read_pem(coin, &key_path)?);

    Identity::from_pem(&pem).map_err(|e| ConfigError::Identity {
        coin: coin.to_string(),
        path: cert_path,
        reason: e.to_string(),
    })
}

fn load_ca(coin: &str, path: &str) -> Result<Certificate, ConfigError> {
    let path = util::expand_env(path);
    let pem = read_pem(coin, &path)?;
    Certificate::from_pem(&pem).map_err(|e| ConfigError::Identity {
        coin: coin.to_string(),
        path,
        reason: e.to_string(),
    })
}

fn read_pem(coin: &str, path: &str) -> Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|e| ConfigError::Identity {
        coin: coin.to_string(),
        path: path.to_string(),
        reason: e.to_string(),
    })
}
