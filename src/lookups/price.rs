use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

/// Pluggable price feed: lowercase token address in, USD unit price out.
/// None means "unknown" — the enrichment stage turns that into its 0.0
/// sentinel, so implementations never need an error path per key.
pub trait PriceSource {
    fn price_usd(&self, token: &str) -> Option<f64>;
}

/// File-backed price table: `token_address,usd_price` CSV, keys lowercased at
/// load. An unreadable or malformed file degrades to an empty table so the
/// run completes with every row unpriced.
#[derive(Debug, Default)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    pub fn from_entries(entries: Vec<(String, f64)>) -> Self {
        let prices = entries
            .into_iter()
            .map(|(token, price)| (token.to_lowercase(), price))
            .collect();
        Self { prices }
    }

    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("[PRICES] failed to read {}: {e} — all rows will be unpriced", path.display());
                return Self::default();
            }
        };

        let mut prices = HashMap::new();
        let mut skipped = 0usize;
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Header row from the original table format.
            if line_no == 0 && line.to_lowercase().starts_with("token_address") {
                continue;
            }
            let mut parts = line.splitn(2, ',');
            let token = parts.next().unwrap_or("").trim().to_lowercase();
            let price = parts.next().and_then(|p| p.trim().parse::<f64>().ok());
            match price {
                Some(p) if !token.is_empty() && p >= 0.0 => {
                    prices.insert(token, p);
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("[PRICES] skipped {skipped} malformed lines in {}", path.display());
        }
        info!("[PRICES] loaded {} token prices from {}", prices.len(), path.display());
        Self { prices }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for PriceTable {
    fn price_usd(&self, token: &str) -> Option<f64> {
        self.prices.get(token).copied()
    }
}
