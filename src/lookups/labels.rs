use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use sqlx::Row;
use tracing::{info, warn};

use crate::config::CODE_PROBE_LIMIT;
use crate::error::Result;
use crate::lookups::rpc_call;
use crate::types::{canonical_hex, LabelEntry};

/// Load the address label table from CSV: `address,flow_source,is_contract`.
/// Keys are stored in canonical `0x…` hex (lowercased as-is when not valid
/// hex), the same keying mark_contracts uses, so the enrichment join sees one
/// consistent key space. A read failure degrades to an empty map — every swap
/// then carries the default label and the run still completes.
pub fn load_labels(path: impl AsRef<Path>) -> HashMap<String, LabelEntry> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("[LABELS] failed to read {}: {e} — all rows will use the default label", path.display());
            return HashMap::new();
        }
    };

    let mut labels = HashMap::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line_no == 0 && line.to_lowercase().starts_with("address") {
            continue;
        }
        let mut parts = line.splitn(3, ',');
        let raw_address = parts.next().unwrap_or("").trim();
        let address = canonical_hex(raw_address).unwrap_or_else(|| raw_address.to_lowercase());
        let flow_source = parts.next().unwrap_or("").trim().to_string();
        let is_contract = matches!(
            parts.next().map(|s| s.trim().to_lowercase()).as_deref(),
            Some("true") | Some("1") | Some("t")
        );
        if address.is_empty() || flow_source.is_empty() {
            continue;
        }
        labels.insert(address, LabelEntry { flow_source, is_contract });
    }

    info!("[LABELS] loaded {} address labels from {}", labels.len(), path.display());
    labels
}

/// Sync the CSV-sourced labels into the address_labels table so the validator
/// sees the same snapshot the run used.
pub async fn persist_labels(
    pool: &sqlx::SqlitePool,
    labels: &HashMap<String, LabelEntry>,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    for (address, entry) in labels {
        sqlx::query(
            r#"
            INSERT INTO address_labels (address, flow_source, is_contract, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(address) DO UPDATE SET
                flow_source = excluded.flow_source,
                is_contract = excluded.is_contract,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(address)
        .bind(&entry.flow_source)
        .bind(entry.is_contract)
        .bind(now)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Probe unlabeled sender addresses with eth_getCode and mark them
/// Contract/EOA, both in the returned map additions and the address_labels
/// table. Skipped entirely when no RPC is configured; individual probe
/// failures leave the address on the default label.
pub async fn mark_contracts(
    pool: &sqlx::SqlitePool,
    rpc_url: Option<&str>,
    senders: &[String],
    labels: &mut HashMap<String, LabelEntry>,
) -> Result<()> {
    let Some(rpc_url) = rpc_url else {
        return Ok(());
    };

    let mut seen = std::collections::HashSet::new();
    let unlabeled: Vec<String> = senders
        .iter()
        .filter_map(|s| canonical_hex(s))
        .filter(|a| !labels.contains_key(a))
        .filter(|a| seen.insert(a.clone()))
        .collect();
    if unlabeled.is_empty() {
        return Ok(());
    }

    // Known from an earlier run but not in the CSV.
    let mut to_probe = Vec::new();
    for address in unlabeled.iter().take(CODE_PROBE_LIMIT) {
        let row = sqlx::query("SELECT flow_source, is_contract FROM address_labels WHERE address = ?")
            .bind(address)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => {
                labels.insert(
                    address.clone(),
                    LabelEntry {
                        flow_source: row.get("flow_source"),
                        is_contract: row.get("is_contract"),
                    },
                );
            }
            None => to_probe.push(address.clone()),
        }
    }

    if to_probe.is_empty() {
        return Ok(());
    }
    info!("[LABELS] probing {} addresses for contract code", to_probe.len());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let now = chrono::Utc::now().timestamp();
    let mut marked = 0usize;

    for address in &to_probe {
        let code = match rpc_call(&client, rpc_url, "eth_getCode", json!([address, "latest"])).await
        {
            Ok(c) => c,
            Err(e) => {
                warn!("[LABELS] eth_getCode failed for {address}: {e}");
                continue;
            }
        };
        // Anything beyond the bare "0x" means deployed code.
        let is_contract = code.as_str().map(|s| s.len() > 2).unwrap_or(false);
        let flow_source = if is_contract { "Contract" } else { "EOA" };

        sqlx::query(
            r#"
            INSERT INTO address_labels (address, flow_source, is_contract, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(address) DO UPDATE SET
                is_contract = excluded.is_contract,
                flow_source = CASE
                    WHEN excluded.is_contract THEN 'Contract'
                    ELSE address_labels.flow_source
                END,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(address)
        .bind(flow_source)
        .bind(is_contract)
        .bind(now)
        .execute(pool)
        .await?;

        labels.insert(
            address.clone(),
            LabelEntry { flow_source: flow_source.to_string(), is_contract },
        );
        marked += 1;
    }

    info!("[LABELS] marked {marked} addresses via eth_getCode");
    Ok(())
}
