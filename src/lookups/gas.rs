use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::config::RECEIPT_FETCH_LIMIT;
use crate::error::Result;
use crate::lookups::{parse_hex_quantity, rpc_call};

/// Build the gas map for a batch of distinct canonical transaction hashes.
///
/// Resolution order: the `tx_gas` cache table first, then
/// `eth_getTransactionReceipt` for hashes still missing (capped per run);
/// fetched receipts are upserted back into `tx_gas` so later runs hit the
/// cache. No RPC configured, or any individual fetch failing, leaves those
/// hashes absent from the map — the enrichment stage defaults them to 0.
pub async fn build_gas_map(
    pool: &sqlx::SqlitePool,
    rpc_url: Option<&str>,
    tx_hashes: &[String],
) -> Result<HashMap<String, u64>> {
    let mut gas_map = HashMap::new();

    for hash in tx_hashes {
        let row = sqlx::query("SELECT gas_used FROM tx_gas WHERE tx_hash = ?")
            .bind(hash)
            .fetch_optional(pool)
            .await?;
        if let Some(row) = row {
            let gas: i64 = row.get("gas_used");
            gas_map.insert(hash.clone(), gas.max(0) as u64);
        }
    }

    let missing: Vec<&String> = tx_hashes.iter().filter(|h| !gas_map.contains_key(*h)).collect();
    info!(
        "[GAS] {} distinct txs | {} cached | {} to fetch",
        tx_hashes.len(),
        gas_map.len(),
        missing.len(),
    );

    let Some(rpc_url) = rpc_url else {
        if !missing.is_empty() {
            warn!("[GAS] no RPC configured, {} txs default to gas_used=0", missing.len());
        }
        return Ok(gas_map);
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut fetched = 0usize;
    let mut failed = 0usize;
    for hash in missing.into_iter().take(RECEIPT_FETCH_LIMIT) {
        match fetch_receipt_gas(&client, rpc_url, hash).await {
            Ok(Some((gas_used, gas_price))) => {
                upsert_tx_gas(pool, hash, gas_used, gas_price).await?;
                gas_map.insert(hash.clone(), gas_used);
                fetched += 1;
            }
            Ok(None) => {
                debug!("[GAS] no receipt for {hash}");
                failed += 1;
            }
            Err(e) => {
                warn!("[GAS] receipt fetch failed for {hash}: {e}");
                failed += 1;
            }
        }
    }

    if fetched > 0 || failed > 0 {
        info!("[GAS] fetched {fetched} receipts, {failed} unresolved");
    }
    Ok(gas_map)
}

/// Fetch one transaction receipt and pull out (gas_used, gas_price).
/// Returns Ok(None) when the node has no receipt for the hash.
async fn fetch_receipt_gas(
    client: &reqwest::Client,
    rpc_url: &str,
    tx_hash: &str,
) -> Result<Option<(u64, Option<u64>)>> {
    let result = rpc_call(client, rpc_url, "eth_getTransactionReceipt", json!([tx_hash])).await?;
    if result.is_null() {
        return Ok(None);
    }
    let Some(gas_used) = result.get("gasUsed").and_then(parse_hex_quantity) else {
        return Ok(None);
    };
    let gas_price = result.get("effectiveGasPrice").and_then(parse_hex_quantity);
    Ok(Some((gas_used, gas_price)))
}

async fn upsert_tx_gas(
    pool: &sqlx::SqlitePool,
    tx_hash: &str,
    gas_used: u64,
    gas_price: Option<u64>,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        r#"
        INSERT INTO tx_gas (tx_hash, gas_used, gas_price, fetched_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(tx_hash) DO NOTHING
        "#,
    )
    .bind(tx_hash)
    .bind(gas_used as i64)
    .bind(gas_price.map(|p| p as i64))
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
