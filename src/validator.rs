use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;
use tracing::{info, warn};

use crate::config::{Config, FRESHNESS_MAX_AGE_HOURS};
use crate::db::models::{HopRow, LabelDistRow};
use crate::error::Result;
use crate::export::{export_filename, EXPORT_COLUMNS};

/// One named check: pass/fail plus whatever summary it logged.
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
}

/// Run the full audit over persisted data and the CSV export. The checks are
/// independent — one failing never stops the rest.
pub async fn run_all(pool: &sqlx::SqlitePool, cfg: &Config) -> Result<Vec<Check>> {
    let mut results = Vec::new();
    results.push(Check { name: "swap counts", passed: check_swap_counts(pool).await? });
    results.push(Check { name: "data freshness", passed: check_data_freshness(pool).await? });
    results.push(Check { name: "pool coverage", passed: check_pool_coverage(pool, cfg).await? });
    results.push(Check {
        name: "enrichment quality",
        passed: check_enrichment_quality(pool).await?,
    });
    results.push(Check { name: "hop indices", passed: check_hop_indices(pool).await? });
    results.push(Check { name: "csv export", passed: check_csv_export(pool, cfg).await? });
    Ok(results)
}

/// Non-zero raw and fact counts; fact count below raw is a soft warning only.
async fn check_swap_counts(pool: &sqlx::SqlitePool) -> Result<bool> {
    let (raw_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM raw_swaps").fetch_one(pool).await?;
    let (fact_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM swap_facts").fetch_one(pool).await?;

    info!("[VALIDATE] raw swaps: {raw_count} | enriched facts: {fact_count}");

    if raw_count == 0 {
        warn!("[VALIDATE] no raw swaps found, source may not have run");
        return Ok(false);
    }
    if fact_count == 0 {
        warn!("[VALIDATE] no enriched facts found, enrichment may not have run");
        return Ok(false);
    }
    if fact_count < raw_count {
        warn!("[VALIDATE] enriched facts ({fact_count}) < raw swaps ({raw_count})");
    }
    Ok(true)
}

/// Latest raw block_time must be younger than FRESHNESS_MAX_AGE_HOURS.
async fn check_data_freshness(pool: &sqlx::SqlitePool) -> Result<bool> {
    let latest: Option<(Option<String>,)> =
        sqlx::query_as("SELECT MAX(block_time) FROM raw_swaps").fetch_optional(pool).await?;
    let Some((Some(latest),)) = latest else {
        warn!("[VALIDATE] no swaps found for freshness check");
        return Ok(false);
    };

    let Some(latest_ts) = parse_block_time(&latest) else {
        warn!("[VALIDATE] unparsable latest block_time: {latest}");
        return Ok(false);
    };

    let age_hours = (Utc::now() - latest_ts).num_seconds() as f64 / 3600.0;
    info!("[VALIDATE] latest swap: {latest} ({age_hours:.1} hours ago)");
    if age_hours > FRESHNESS_MAX_AGE_HOURS {
        warn!("[VALIDATE] data older than {FRESHNESS_MAX_AGE_HOURS:.0}h, indexer may be behind");
        return Ok(false);
    }
    Ok(true)
}

/// Every configured pool address must have at least one raw swap.
async fn check_pool_coverage(pool: &sqlx::SqlitePool, cfg: &Config) -> Result<bool> {
    let rows = sqlx::query("SELECT pool_address, COUNT(*) as count FROM raw_swaps GROUP BY pool_address")
        .fetch_all(pool)
        .await?;

    let mut counts: HashMap<String, i64> = HashMap::new();
    for row in rows {
        let address: String = row.get("pool_address");
        counts.insert(address.to_lowercase(), row.get("count"));
    }

    let mut covered = 0usize;
    for expected in &cfg.pool_addresses {
        match counts.get(&expected.to_lowercase()) {
            Some(count) => {
                info!("[VALIDATE] pool {expected}: {count} swaps");
                covered += 1;
            }
            None => warn!("[VALIDATE] pool {expected}: no swaps"),
        }
    }
    Ok(covered == cfg.pool_addresses.len())
}

/// Report fractions of fact rows carrying non-default price/gas, plus the
/// flow-source distribution. Fails only when there is nothing to measure.
async fn check_enrichment_quality(pool: &sqlx::SqlitePool) -> Result<bool> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) as total,
            SUM(CASE WHEN price0_usd > 0 THEN 1 ELSE 0 END) as with_price0,
            SUM(CASE WHEN price1_usd > 0 THEN 1 ELSE 0 END) as with_price1,
            SUM(CASE WHEN gas_used > 0 THEN 1 ELSE 0 END) as with_gas
        FROM swap_facts
        "#,
    )
    .fetch_one(pool)
    .await?;

    let total: i64 = row.get("total");
    if total == 0 {
        warn!("[VALIDATE] no enriched facts to measure");
        return Ok(false);
    }
    let with_price0: i64 = row.get::<Option<i64>, _>("with_price0").unwrap_or(0);
    let with_price1: i64 = row.get::<Option<i64>, _>("with_price1").unwrap_or(0);
    let with_gas: i64 = row.get::<Option<i64>, _>("with_gas").unwrap_or(0);

    let pct = |n: i64| 100.0 * n as f64 / total as f64;
    info!(
        "[VALIDATE] enrichment quality of {total} facts: price0={with_price0} ({:.1}%) price1={with_price1} ({:.1}%) gas={with_gas} ({:.1}%)",
        pct(with_price0),
        pct(with_price1),
        pct(with_gas),
    );

    let labels: Vec<LabelDistRow> = sqlx::query_as(
        r#"
        SELECT
            flow_source,
            COUNT(*) as count,
            SUM(CASE WHEN is_contract THEN 1 ELSE 0 END) as contracts
        FROM swap_facts
        GROUP BY flow_source
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    for l in &labels {
        info!(
            "[VALIDATE]   {}: {} swaps ({} from contracts)",
            l.flow_source, l.count, l.contracts
        );
    }
    Ok(true)
}

/// Re-verify hop contiguity against persisted facts for every transaction
/// that has more than one swap.
async fn check_hop_indices(pool: &sqlx::SqlitePool) -> Result<bool> {
    let rows: Vec<HopRow> = sqlx::query_as(
        r#"
        SELECT tx_hash, log_index, hop_index
        FROM swap_facts
        WHERE tx_hash IN (
            SELECT tx_hash FROM swap_facts GROUP BY tx_hash HAVING COUNT(*) > 1
        )
        ORDER BY tx_hash, log_index
        "#,
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        info!("[VALIDATE] no multi-hop transactions found");
        return Ok(true);
    }

    let bad = find_bad_hop_groups(&rows);
    let group_count = rows
        .iter()
        .map(|r| r.tx_hash.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    if bad.is_empty() {
        info!("[VALIDATE] hop indices correct across {group_count} multi-hop txs");
        Ok(true)
    } else {
        for tx in &bad {
            warn!("[VALIDATE] hop indices not contiguous for tx {tx}");
        }
        Ok(false)
    }
}

/// Pure contiguity check over rows pre-sorted by (tx_hash, log_index):
/// hop indices within each tx must be exactly 1..k in that order.
pub fn find_bad_hop_groups(rows: &[HopRow]) -> Vec<String> {
    let mut bad = Vec::new();
    let mut prev_tx: Option<&str> = None;
    let mut expected = 1i64;
    for row in rows {
        if prev_tx != Some(row.tx_hash.as_str()) {
            prev_tx = Some(row.tx_hash.as_str());
            expected = 1;
        }
        if row.hop_index != expected {
            if bad.last().map(|t: &String| t.as_str()) != Some(row.tx_hash.as_str()) {
                bad.push(row.tx_hash.clone());
            }
        }
        expected += 1;
    }
    bad
}

/// Today's export file must exist, carry the exact 15-column header, and hold
/// one line per persisted fact.
async fn check_csv_export(pool: &sqlx::SqlitePool, cfg: &Config) -> Result<bool> {
    let path = Path::new(&cfg.export_dir).join(export_filename(Utc::now().date_naive()));
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!("[VALIDATE] CSV export not readable at {}: {e}", path.display());
            return Ok(false);
        }
    };

    let expected_header = EXPORT_COLUMNS.join(",");
    let mut lines = contents.lines();
    match lines.next() {
        Some(header) if header == expected_header => {}
        Some(header) => {
            warn!("[VALIDATE] CSV header mismatch: {header}");
            return Ok(false);
        }
        None => {
            warn!("[VALIDATE] CSV export is empty");
            return Ok(false);
        }
    }

    let row_count = lines.count() as i64;
    let (fact_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM swap_facts").fetch_one(pool).await?;
    info!("[VALIDATE] CSV export {}: {row_count} rows", path.display());
    if row_count != fact_count {
        warn!("[VALIDATE] CSV rows ({row_count}) != fact rows ({fact_count})");
        return Ok(false);
    }
    Ok(true)
}

/// Parse a raw block_time string: RFC 3339 first, then the bare
/// `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS` forms the source emits.
pub fn parse_block_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
