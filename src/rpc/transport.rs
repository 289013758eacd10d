use serde_json::Value;

use super::error::RpcError;

/// RpcTransport is the seam between the collectors and the wire.
///
/// One implementation talks HTTPS to real nodes; tests plug in an
/// in-memory fake. Instances are shared by all tasks of a coin.
///
/// CONTRACT:
/// - `base` is the endpoint base URL (scheme, host, port)
/// - The request is a POST of `body` to `{base}/{method}`
/// - The returned value is the raw decoded JSON response
///
#[async_trait::async_trait]
pub trait RpcTransport: Send + Sync {
    async fn post(&self, base: &str, method: &str, body: Value) -> Result<Value, RpcError>;
}
