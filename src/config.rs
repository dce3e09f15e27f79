use crate::error::{AppError, Result};

pub const HASURA_URL: &str = "http://localhost:8080/v1/graphql";

/// Default pool addresses tracked when POOL_ADDRESSES is unset (hooked + static pool).
pub const DEFAULT_POOLS: &[&str] = &[
    "0x410723c1949069324d0f6013dba28829c4a0562f7c81d0f7cb79ded668691e1f",
    "0x51f9d63dda41107d6513047f7ed18133346ce4f3f4c4faf899151d8939b3496e",
];

/// Flow-source label assigned when an address has no entry in the label table.
pub const DEFAULT_FLOW_SOURCE: &str = "Other";

/// Max receipts fetched from the RPC per run. Remaining transactions keep
/// gas_used = 0 until a later run picks them up from the tx_gas cache.
pub const RECEIPT_FETCH_LIMIT: usize = 100;

/// Max addresses probed with eth_getCode per run.
pub const CODE_PROBE_LIMIT: usize = 100;

/// Raw swaps older than this fail the freshness validation check.
pub const FRESHNESS_MAX_AGE_HOURS: f64 = 24.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub hasura_url: String,
    /// JSON-RPC endpoint for receipt/code lookups. None disables gas fetching
    /// and contract marking — the pipeline still runs with defaults.
    pub rpc_url: Option<String>,
    pub log_level: String,
    pub db_path: String,
    /// Pool addresses the raw swap query filters on (POOL_ADDRESSES, comma-separated).
    pub pool_addresses: Vec<String>,
    /// Path to the address label CSV (LABELS_PATH).
    pub labels_path: String,
    /// Path to the token price CSV (PRICES_PATH).
    pub prices_path: String,
    /// Directory the dated fact CSV is written into (EXPORT_DIR).
    pub export_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let pool_addresses: Vec<String> = std::env::var("POOL_ADDRESSES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let pool_addresses = if pool_addresses.is_empty() {
            DEFAULT_POOLS.iter().map(|s| s.to_string()).collect()
        } else {
            pool_addresses
        };

        // Placeholder keys from the sample env file count as unconfigured.
        let rpc_url = std::env::var("RPC_URL")
            .ok()
            .filter(|u| !u.is_empty() && !u.contains("<YOUR_ALCHEMY_KEY>"));

        let export_dir = std::env::var("EXPORT_DIR").unwrap_or_else(|_| ".".to_string());
        if export_dir.is_empty() {
            return Err(AppError::Config("EXPORT_DIR must not be empty".to_string()));
        }

        Ok(Self {
            hasura_url: std::env::var("HASURA_URL").unwrap_or_else(|_| HASURA_URL.to_string()),
            rpc_url,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "swap_facts.db".to_string()),
            pool_addresses,
            labels_path: std::env::var("LABELS_PATH")
                .unwrap_or_else(|_| "address_labels.csv".to_string()),
            prices_path: std::env::var("PRICES_PATH")
                .unwrap_or_else(|_| "token_prices.csv".to_string()),
            export_dir,
        })
    }
}
