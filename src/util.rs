/// Utility helpers shared by configuration and collectors.
///
/// This module contains:
/// - Endpoint URL construction
/// - Environment expansion for configured paths
/// - The tri-state sync scalar
///
/// IMPORTANT:
/// - No RPC or metric-group logic should live here.
///
use std::env;

/// Builds an endpoint base URL from the configured host and a port.
///
/// Examples:
/// - ("https://localhost", 8555) -> "https://localhost:8555"
/// - ("10.0.0.5", 9256)          -> "https://10.0.0.5:9256"
/// - ("https://node/", 8559)     -> "https://node:8559"
///
pub fn endpoint_url(host: &str, port: u16) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        format!("{}:{}", host, port)
    } else {
        format!("https://{}:{}", host, port)
    }
}

/// Expands `$VAR` and `${VAR}` from the process environment.
///
/// Unset variables expand to the empty string. A `$` that does not
/// start a variable name is kept as is.
pub fn expand_env(raw: &str) -> String {
    expand_with(raw, |name| env::var(name).ok())
}

fn expand_with<F>(raw: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => {
                    out.push_str(&lookup(&braced[..end]).unwrap_or_default());
                    rest = &braced[end + 1..];
                }
                None => {
                    out.push_str(&rest[pos..]);
                    rest = "";
                }
            }
            continue;
        }

        let len = after
            .char_indices()
            .take_while(|&(i, c)| {
                c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())
            })
            .count();
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(&lookup(&after[..len]).unwrap_or_default());
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

/// Sync scalar: 0 = not synced, 1 = syncing, 2 = synced.
///
/// "syncing" wins when both flags are set.
pub fn sync_status(syncing: bool, synced: bool) -> f64 {
    if syncing {
        1.0
    } else if synced {
        2.0
    } else {
        0.0
    }
}
