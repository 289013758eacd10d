//! Node RPC access
//!
//! This module provides:
//! - The `RpcTransport` seam and its HTTPS implementation
//! - The typed `query` primitive used by every collector task
//! - The per-query error taxonomy
//!
//! No retries happen here. A failed query fails only the metric
//! group that issued it.

pub mod error;
pub mod https;
pub mod transport;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub use error::RpcError;
pub use https::HttpsTransport;
pub use transport::RpcTransport;

/// Placeholder body for parameterless methods.
pub fn empty_body() -> Value {
    json!({})
}

/// Performs one request/response exchange and decodes the result.
///
/// A response carrying `"success": false` is reported as
/// `RpcError::Rejected` with the node's error message.
pub async fn query<T: DeserializeOwned>(
    transport: &dyn RpcTransport,
    base: &str,
    method: &str,
    body: Value,
) -> Result<T, RpcError> {
    let value = transport.post(base, method, body).await?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(RpcError::Rejected(reason));
    }

    Ok(serde_json::from_value(value)?)
}
