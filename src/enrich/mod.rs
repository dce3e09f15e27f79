pub mod gas;
pub mod hops;
pub mod labels;
pub mod price;

use std::collections::HashMap;

use tracing::{info, warn};

use crate::lookups::price::PriceSource;
use crate::types::{EnrichedFact, LabelEntry, RawSwap};

/// Per-stage default counts for one run, logged as the stage summaries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnrichStats {
    pub rows: usize,
    pub gas_defaulted: usize,
    pub price0_defaulted: usize,
    pub price1_defaulted: usize,
    pub label_defaulted: usize,
    pub hop_fallback: bool,
}

/// The enrichment pipeline: a pure transform from raw swaps plus three lookup
/// snapshots to fact rows. Stage order is fixed (gas, price, label, hop
/// ordering); each stage consults only its own lookup and falls back to its
/// stage default on a miss. Cardinality-preserving: one fact per raw swap.
pub fn enrich(
    swaps: &[RawSwap],
    gas_map: &HashMap<String, u64>,
    prices: &dyn PriceSource,
    labels: &HashMap<String, LabelEntry>,
) -> (Vec<EnrichedFact>, EnrichStats) {
    let mut stats = EnrichStats { rows: swaps.len(), ..Default::default() };

    let (hop_indices, hop_fallback) = hops::assign_hop_indices(swaps);
    stats.hop_fallback = hop_fallback;
    if hop_fallback && !swaps.is_empty() {
        warn!("[HOPS] log_index or tx_hash unavailable, all rows assigned hop_index=1");
    }

    let mut facts = Vec::with_capacity(swaps.len());
    for (swap, hop_index) in swaps.iter().zip(hop_indices) {
        let (gas_used, gas_defaulted) = gas::gas_for(&swap.tx_hash, gas_map);
        let (price0_usd, p0_defaulted) = price::price_for(&swap.token0, prices);
        let (price1_usd, p1_defaulted) = price::price_for(&swap.token1, prices);
        let (trader, label, label_defaulted) = labels::label_for(&swap.sender, labels);

        stats.gas_defaulted += gas_defaulted as usize;
        stats.price0_defaulted += p0_defaulted as usize;
        stats.price1_defaulted += p1_defaulted as usize;
        stats.label_defaulted += label_defaulted as usize;

        facts.push(EnrichedFact {
            block_time: swap.block_time.clone(),
            tx_hash: swap.tx_hash.clone(),
            log_index: swap.log_index,
            pool_address: swap.pool_address.clone(),
            token0: swap.token0.clone(),
            token1: swap.token1.clone(),
            amount0: swap.amount0.clone(),
            amount1: swap.amount1.clone(),
            price0_usd,
            price1_usd,
            trader,
            is_contract: label.is_contract,
            flow_source: label.flow_source,
            hop_index,
            gas_used,
        });
    }

    (facts, stats)
}

pub fn log_stats(stats: &EnrichStats) {
    info!(
        "[ENRICH] {} rows | defaulted: gas={} price0={} price1={} label={}{}",
        stats.rows,
        stats.gas_defaulted,
        stats.price0_defaulted,
        stats.price1_defaulted,
        stats.label_defaulted,
        if stats.hop_fallback { " | hop fallback active" } else { "" },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookups::price::PriceTable;
    use crate::types::RawSwap;

    const WBTC: &str = "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599";
    const UNKNOWN: &str = "0x0000000000000000000000000000000000000001";

    fn swap(tx: &str, log_index: i64, token0: &str, token1: &str, sender: &str) -> RawSwap {
        RawSwap {
            block_time: "2026-08-29T12:00:00".to_string(),
            tx_hash: tx.to_string(),
            log_index: Some(log_index),
            pool_address: "0x410723".to_string(),
            token0: token0.to_string(),
            token1: token1.to_string(),
            amount0: "100".to_string(),
            amount1: "-200".to_string(),
            sender: sender.to_string(),
        }
    }

    fn prices() -> PriceTable {
        PriceTable::from_entries(vec![(WBTC.to_string(), 95000.0)])
    }

    #[test]
    fn cardinality_preserved() {
        let swaps = vec![
            swap("0xaa", 0, WBTC, UNKNOWN, "0x01"),
            swap("0xaa", 2, WBTC, UNKNOWN, "0x01"),
            swap("0xbb", 0, UNKNOWN, WBTC, "0x02"),
        ];
        let (facts, stats) = enrich(&swaps, &HashMap::new(), &prices(), &HashMap::new());
        assert_eq!(facts.len(), swaps.len());
        assert_eq!(stats.rows, 3);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let (facts, stats) = enrich(&[], &HashMap::new(), &prices(), &HashMap::new());
        assert!(facts.is_empty());
        assert_eq!(stats, EnrichStats::default());
    }

    #[test]
    fn priced_and_unpriced_tokens() {
        let swaps = vec![swap("0xaa", 0, WBTC, UNKNOWN, "0x01")];
        let (facts, _) = enrich(&swaps, &HashMap::new(), &prices(), &HashMap::new());
        assert_eq!(facts[0].price0_usd, 95000.0);
        assert_eq!(facts[0].price1_usd, 0.0);
    }

    #[test]
    fn default_fallback_totality() {
        let swaps = vec![swap("0xaa", 0, UNKNOWN, UNKNOWN, "0xUnLabeled")];
        let (facts, stats) = enrich(&swaps, &HashMap::new(), &prices(), &HashMap::new());
        let f = &facts[0];
        assert_eq!(f.gas_used, 0);
        assert_eq!(f.price0_usd, 0.0);
        assert_eq!(f.price1_usd, 0.0);
        assert_eq!(f.flow_source, "Other");
        assert!(!f.is_contract);
        assert_eq!(f.trader, "0xunlabeled");
        assert_eq!(stats.gas_defaulted, 1);
        assert_eq!(stats.label_defaulted, 1);
    }

    #[test]
    fn labels_join_regardless_of_sender_encoding() {
        let mut labels = HashMap::new();
        labels.insert(
            "0x01ab".to_string(),
            LabelEntry { flow_source: "Contract".to_string(), is_contract: true },
        );
        let swaps = vec![swap("0xaa", 0, WBTC, WBTC, "\\x01AB")];
        let (facts, stats) = enrich(&swaps, &HashMap::new(), &prices(), &labels);
        assert_eq!(facts[0].trader, "\\x01ab");
        assert_eq!(facts[0].flow_source, "Contract");
        assert!(facts[0].is_contract);
        assert_eq!(stats.label_defaulted, 0);
    }

    #[test]
    fn gas_joins_by_canonical_hash() {
        let mut gas_map = HashMap::new();
        gas_map.insert("0xaa".to_string(), 150_000u64);
        // Source delivered the hash in postgres \x form.
        let swaps = vec![swap("\\xAA", 0, WBTC, WBTC, "0x01")];
        let (facts, stats) = enrich(&swaps, &gas_map, &prices(), &HashMap::new());
        assert_eq!(facts[0].gas_used, 150_000);
        assert_eq!(stats.gas_defaulted, 0);
    }

    #[test]
    fn hop_ordering_example_scenario() {
        let swaps = vec![
            swap("0xaa", 2, WBTC, WBTC, "0x01"),
            swap("0xaa", 0, WBTC, WBTC, "0x01"),
            swap("0xbb", 0, WBTC, WBTC, "0x01"),
        ];
        let (facts, _) = enrich(&swaps, &HashMap::new(), &prices(), &HashMap::new());
        assert_eq!(facts[0].hop_index, 2);
        assert_eq!(facts[1].hop_index, 1);
        assert_eq!(facts[2].hop_index, 1);
    }

    #[test]
    fn idempotent_across_runs() {
        let swaps = vec![
            swap("0xbb", 7, WBTC, UNKNOWN, "0x03"),
            swap("0xaa", 1, UNKNOWN, WBTC, "0x01"),
            swap("0xaa", 5, WBTC, WBTC, "0x02"),
        ];
        let mut gas_map = HashMap::new();
        gas_map.insert("0xaa".to_string(), 90_000u64);
        let mut labels = HashMap::new();
        labels.insert(
            "0x01".to_string(),
            LabelEntry { flow_source: "Retail".to_string(), is_contract: false },
        );

        let first = enrich(&swaps, &gas_map, &prices(), &labels);
        let second = enrich(&swaps, &gas_map, &prices(), &labels);
        assert_eq!(first, second);
    }
}
