use std::time::Duration;

use serde_json::{json, Value};
use tracing::warn;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::RawSwap;

#[derive(Debug, Default)]
pub struct SourceStats {
    pub api_total: usize,
    pub missing_log_index: usize,
    pub empty_tx_hash: usize,
    pub empty_sender: usize,
}

/// Bulk-read raw swaps for the configured pool set from the GraphQL source.
///
/// An empty result is a valid "no swaps" outcome. A transport failure, a
/// GraphQL errors payload, or a response that is not the expected shape is
/// batch-fatal — without the raw set there is nothing to enrich.
pub async fn fetch_raw_swaps(cfg: &Config) -> Result<(Vec<RawSwap>, SourceStats)> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let pools = serde_json::to_string(&cfg.pool_addresses)?;
    let query = format!(
        r#"query GetSwaps {{
          raw_swaps(where: {{ pool_address: {{_in: {pools} }} }}) {{
            block_time
            tx_hash
            log_index
            pool_address
            token0
            token1
            amount0
            amount1
            sender
          }}
        }}"#
    );

    let resp: Value = client
        .post(&cfg.hasura_url)
        .json(&json!({ "query": query }))
        .send()
        .await?
        .json()
        .await?;

    if let Some(errors) = resp.get("errors") {
        return Err(AppError::Source(format!("GraphQL errors: {errors}")));
    }

    let items = resp
        .get("data")
        .and_then(|d| d.get("raw_swaps"))
        .and_then(|s| s.as_array())
        .ok_or_else(|| AppError::Source("response missing data.raw_swaps array".to_string()))?;

    let mut stats = SourceStats { api_total: items.len(), ..Default::default() };
    let swaps: Vec<RawSwap> = items.iter().map(|v| parse_raw_swap(v, &mut stats)).collect();

    if stats.missing_log_index > 0 || stats.empty_tx_hash > 0 {
        warn!(
            "[SOURCE] malformed fields: missing log_index={} empty tx_hash={} empty sender={}",
            stats.missing_log_index, stats.empty_tx_hash, stats.empty_sender,
        );
    }

    Ok((swaps, stats))
}

/// Parse one source row leniently: a missing or mistyped field becomes its
/// empty/None default and only degrades the enrichment dimensions that need
/// it. The row itself is always kept — parsing never drops swaps.
fn parse_raw_swap(v: &Value, stats: &mut SourceStats) -> RawSwap {
    let text = |key: &str| -> String {
        match v.get(key) {
            Some(Value::String(s)) => s.clone(),
            // Numeric amounts arrive as JSON numbers from some sources.
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    };

    let log_index = v.get("log_index").and_then(|l| l.as_i64()).filter(|l| *l >= 0);
    if log_index.is_none() {
        stats.missing_log_index += 1;
    }

    let tx_hash = text("tx_hash");
    if tx_hash.is_empty() {
        stats.empty_tx_hash += 1;
    }
    let sender = text("sender");
    if sender.is_empty() {
        stats.empty_sender += 1;
    }

    RawSwap {
        block_time: text("block_time"),
        tx_hash,
        log_index,
        pool_address: text("pool_address"),
        token0: text("token0"),
        token1: text("token1"),
        amount0: text("amount0"),
        amount1: text("amount1"),
        sender,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_row() {
        let mut stats = SourceStats::default();
        let v = json!({
            "block_time": "2026-08-29T12:00:00",
            "tx_hash": "\\xab12",
            "log_index": 3,
            "pool_address": "0x410723",
            "token0": "0xt0",
            "token1": "0xt1",
            "amount0": "100",
            "amount1": -200,
            "sender": "0xSENDER"
        });
        let swap = parse_raw_swap(&v, &mut stats);
        assert_eq!(swap.tx_hash, "\\xab12");
        assert_eq!(swap.log_index, Some(3));
        assert_eq!(swap.amount0, "100");
        assert_eq!(swap.amount1, "-200");
        assert_eq!(stats.missing_log_index, 0);
    }

    #[test]
    fn malformed_fields_default_but_row_survives() {
        let mut stats = SourceStats::default();
        let v = json!({
            "block_time": 12345,
            "tx_hash": {"unexpected": "object"},
            "log_index": "not-a-number",
            "sender": null
        });
        let swap = parse_raw_swap(&v, &mut stats);
        assert_eq!(swap.block_time, "12345");
        assert_eq!(swap.tx_hash, "");
        assert_eq!(swap.log_index, None);
        assert_eq!(swap.sender, "");
        assert_eq!(stats.missing_log_index, 1);
        assert_eq!(stats.empty_tx_hash, 1);
        assert_eq!(stats.empty_sender, 1);
    }

    #[test]
    fn negative_log_index_counts_as_missing() {
        let mut stats = SourceStats::default();
        let v = json!({ "tx_hash": "0xab12", "log_index": -1 });
        let swap = parse_raw_swap(&v, &mut stats);
        assert_eq!(swap.log_index, None);
        assert_eq!(stats.missing_log_index, 1);
    }
}
