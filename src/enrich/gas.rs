use std::collections::HashMap;

use crate::types::canonical_hex;

/// Resolve gas_used for one swap from the gas map, keyed by canonical hash.
/// Unresolvable hashes and absent keys both land on the 0 default — a single
/// unknown transaction never fails the row, let alone the batch.
/// Returns (gas_used, defaulted).
pub fn gas_for(tx_hash: &str, gas_map: &HashMap<String, u64>) -> (u64, bool) {
    let Some(canonical) = canonical_hex(tx_hash) else {
        return (0, true);
    };
    match gas_map.get(&canonical) {
        Some(&gas) => (gas, false),
        None => (0, true),
    }
}

/// Distinct canonical transaction hashes for a batch, in first-seen order.
/// Bounds external receipt work by the number of transactions, not rows.
/// Malformed hashes are skipped — they can never resolve anyway.
pub fn distinct_tx_hashes<'a, I>(hashes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for raw in hashes {
        if let Some(canonical) = canonical_hex(raw) {
            if seen.insert(canonical.clone()) {
                out.push(canonical);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_hash_resolves() {
        let mut map = HashMap::new();
        map.insert("0xab12".to_string(), 21000u64);
        assert_eq!(gas_for("0xAB12", &map), (21000, false));
        assert_eq!(gas_for("ab12", &map), (21000, false));
        assert_eq!(gas_for("\\xab12", &map), (21000, false));
    }

    #[test]
    fn unknown_hash_defaults_to_zero() {
        let map = HashMap::new();
        assert_eq!(gas_for("0xab12", &map), (0, true));
    }

    #[test]
    fn malformed_hash_defaults_to_zero() {
        let mut map = HashMap::new();
        map.insert("0xab12".to_string(), 21000u64);
        assert_eq!(gas_for("not-hex", &map), (0, true));
        assert_eq!(gas_for("", &map), (0, true));
    }

    #[test]
    fn distinct_hashes_dedupe_across_encodings() {
        let hashes = ["0xAB12", "ab12", "\\xab12", "0xcd34", "garbage"];
        let distinct = distinct_tx_hashes(hashes);
        assert_eq!(distinct, vec!["0xab12".to_string(), "0xcd34".to_string()]);
    }
}
