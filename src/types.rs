// ---------------------------------------------------------------------------
// Raw swap
// ---------------------------------------------------------------------------

/// One DEX swap event as returned by the raw swap source.
///
/// String fields hold the source text verbatim: amounts are signed decimal
/// text the pipeline never does arithmetic on, and tx_hash keeps whatever
/// encoding the source used (`0x…`, bare hex, or postgres `\x…` text).
/// Canonical forms are derived only at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSwap {
    pub block_time: String,
    pub tx_hash: String,
    /// None when the source row was missing the field; triggers the whole-set
    /// hop fallback (see enrich::hops).
    pub log_index: Option<i64>,
    pub pool_address: String,
    pub token0: String,
    pub token1: String,
    pub amount0: String,
    pub amount1: String,
    pub sender: String,
}

// ---------------------------------------------------------------------------
// Lookup entries
// ---------------------------------------------------------------------------

/// Label for one trader address. Absence from the label map resolves to
/// `LabelEntry::default()` rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub flow_source: String,
    pub is_contract: bool,
}

impl Default for LabelEntry {
    fn default() -> Self {
        Self {
            flow_source: crate::config::DEFAULT_FLOW_SOURCE.to_string(),
            is_contract: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Enriched fact
// ---------------------------------------------------------------------------

/// Output row: the raw swap plus every enrichment dimension. Exactly one fact
/// per raw swap — enrichment never drops or duplicates rows.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedFact {
    pub block_time: String,
    pub tx_hash: String,
    pub log_index: Option<i64>,
    pub pool_address: String,
    pub token0: String,
    pub token1: String,
    pub amount0: String,
    pub amount1: String,
    pub price0_usd: f64,
    pub price1_usd: f64,
    pub trader: String,
    pub is_contract: bool,
    pub flow_source: String,
    pub hop_index: i64,
    pub gas_used: u64,
}

// ---------------------------------------------------------------------------
// Canonicalization helpers
// ---------------------------------------------------------------------------

/// Canonicalize a transaction hash or address to lowercase `0x`-prefixed hex.
/// Accepts `0x…`, bare hex, and postgres `\x…` text. Returns None for
/// malformed input (odd length, non-hex bytes, empty) — callers treat that as
/// unresolvable for the dimension in question, never as a row failure.
pub fn canonical_hex(raw: &str) -> Option<String> {
    let s = raw.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix("\\x"))
        .unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    let bytes = hex::decode(s).ok()?;
    Some(format!("0x{}", hex::encode(bytes)))
}
