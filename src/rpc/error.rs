use thiserror::Error;

/// Failures of a single RPC exchange.
///
/// None of these is fatal: the issuing metric group logs it and
/// stops emitting for the current scrape.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Dial failed or the connection dropped mid-exchange.
    #[error("connection error: {0}")]
    Connectivity(String),

    /// TLS handshake or certificate failure.
    #[error("tls error: {0}")]
    Tls(String),

    /// Connect or read deadline exceeded.
    #[error("timeout")]
    Timeout,

    /// Response body is not the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Non-2xx HTTP status.
    #[error("http status {0}")]
    Status(u16),

    /// Node answered with `"success": false`.
    #[error("rejected by node: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return RpcError::Timeout;
        }
        if let Some(status) = e.status() {
            return RpcError::Status(status.as_u16());
        }
        if e.is_decode() {
            return RpcError::Decode(e.to_string());
        }
        if let Some(tls) = find_tls_cause(&e) {
            return RpcError::Tls(tls);
        }
        RpcError::Connectivity(error_chain(&e))
    }
}

/// Walks the source chain looking for a rustls failure.
///
/// hyper wraps it in an `io::Error`, whose `source()` skips the
/// wrapped value, so `get_ref()` is checked explicitly.
fn find_tls_cause(e: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut cur = Some(e);
    while let Some(err) = cur {
        if let Some(tls) = err.downcast_ref::<rustls::Error>() {
            return Some(tls.to_string());
        }
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if let Some(tls) = io.get_ref().and_then(|i| i.downcast_ref::<rustls::Error>()) {
                return Some(tls.to_string());
            }
        }
        cur = err.source();
    }
    None
}

fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut out = e.to_string();
    let mut cur = e.source();
    while let Some(err) = cur {
        out.push_str(": ");
        out.push_str(&err.to_string());
        cur = err.source();
    }
    out
}
