pub mod gas;
pub mod labels;
pub mod price;

use serde_json::{json, Value};

use crate::error::{AppError, Result};

/// Fire one JSON-RPC call and return the `result` field. Callers decide
/// whether a failure is fatal; for the lookup paths it never is.
pub(crate) async fn rpc_call(
    client: &reqwest::Client,
    rpc_url: &str,
    method: &str,
    params: Value,
) -> Result<Value> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let resp: Value = client.post(rpc_url).json(&body).send().await?.json().await?;

    if let Some(err) = resp.get("error") {
        return Err(AppError::Source(format!("RPC {method} error: {err}")));
    }
    Ok(resp.get("result").cloned().unwrap_or(Value::Null))
}

/// Parse a quantity field from a JSON-RPC result (`"0x5208"` style).
pub(crate) fn parse_hex_quantity(v: &Value) -> Option<u64> {
    let s = v.as_str()?;
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).ok()
}
