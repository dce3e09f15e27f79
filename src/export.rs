use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AppError, Result};
use crate::types::EnrichedFact;

/// The export column contract. Order and presence are load-bearing for
/// downstream consumers; never reorder or drop a column.
pub const EXPORT_COLUMNS: [&str; 15] = [
    "block_time",
    "tx_hash",
    "log_index",
    "pool_address",
    "token0",
    "token1",
    "amount0",
    "amount1",
    "price0_usd",
    "price1_usd",
    "trader",
    "is_contract",
    "flow_source",
    "hop_index",
    "gas_used",
];

/// Filename for a run dated `date` (UTC), e.g. `swap_facts_20260830.csv`.
pub fn export_filename(date: chrono::NaiveDate) -> String {
    format!("swap_facts_{}.csv", date.format("%Y%m%d"))
}

/// Write the fact set to a dated CSV in `export_dir`. Always emits the full
/// header even for zero rows. A write failure here is batch-fatal.
pub fn export_csv(facts: &[EnrichedFact], export_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = export_dir
        .as_ref()
        .join(export_filename(chrono::Utc::now().date_naive()));
    write_csv(facts, &path)?;
    info!("[EXPORT] wrote {} facts to {}", facts.len(), path.display());
    Ok(path)
}

pub fn write_csv(facts: &[EnrichedFact], path: &Path) -> Result<()> {
    let mut out = String::with_capacity(facts.len() * 256 + 256);
    out.push_str(&EXPORT_COLUMNS.join(","));
    out.push('\n');

    for fact in facts {
        let fields = [
            csv_field(&fact.block_time),
            csv_field(&fact.tx_hash),
            fact.log_index.map(|l| l.to_string()).unwrap_or_default(),
            csv_field(&fact.pool_address),
            csv_field(&fact.token0),
            csv_field(&fact.token1),
            csv_field(&fact.amount0),
            csv_field(&fact.amount1),
            fact.price0_usd.to_string(),
            fact.price1_usd.to_string(),
            csv_field(&fact.trader),
            fact.is_contract.to_string(),
            csv_field(&fact.flow_source),
            fact.hop_index.to_string(),
            fact.gas_used.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    let mut file = std::fs::File::create(path)
        .map_err(|e| AppError::Export(format!("cannot create {}: {e}", path.display())))?;
    file.write_all(out.as_bytes())
        .map_err(|e| AppError::Export(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

/// Quote a text field when it contains a delimiter, quote, or newline.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
