use std::collections::HashMap;

use crate::types::{canonical_hex, LabelEntry};

/// Derive the trader identity and label for one swap. The trader is always
/// the lowercased sender; the join against the label map is left with respect
/// to swaps, so a missing entry resolves to the default label (Other, not a
/// contract). Returns (trader, label, defaulted).
///
/// The map is keyed by canonical `0x…` hex (see lookups::labels), so a raw
/// trader that misses is retried under its canonical form. Senders arriving
/// as `\x…` or bare hex otherwise could never join the labels probed for
/// them.
pub fn label_for(sender: &str, labels: &HashMap<String, LabelEntry>) -> (String, LabelEntry, bool) {
    let trader = sender.trim().to_lowercase();
    if let Some(entry) = labels.get(&trader) {
        return (trader, entry.clone(), false);
    }
    if let Some(canonical) = canonical_hex(&trader) {
        if let Some(entry) = labels.get(&canonical) {
            return (trader, entry.clone(), false);
        }
    }
    (trader, LabelEntry::default(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> HashMap<String, LabelEntry> {
        let mut map = HashMap::new();
        map.insert(
            "0xaaaa".to_string(),
            LabelEntry { flow_source: "MEV Bot".to_string(), is_contract: true },
        );
        map
    }

    #[test]
    fn labeled_sender_resolves() {
        let (trader, label, defaulted) = label_for("0xAAAA", &labels());
        assert_eq!(trader, "0xaaaa");
        assert_eq!(label.flow_source, "MEV Bot");
        assert!(label.is_contract);
        assert!(!defaulted);
    }

    #[test]
    fn unlabeled_sender_gets_default() {
        let (trader, label, defaulted) = label_for("0xBBBB", &labels());
        assert_eq!(trader, "0xbbbb");
        assert_eq!(label.flow_source, "Other");
        assert!(!label.is_contract);
        assert!(defaulted);
    }

    #[test]
    fn empty_label_map_still_yields_trader() {
        let (trader, label, _) = label_for("0xCCCC", &HashMap::new());
        assert_eq!(trader, "0xcccc");
        assert_eq!(label, LabelEntry::default());
    }

    #[test]
    fn postgres_form_sender_joins_canonical_entry() {
        // A label stored under the canonical key, e.g. by the contract-code
        // probe, must join for every sender encoding the pipeline accepts.
        let mut map = HashMap::new();
        map.insert(
            "0xab12".to_string(),
            LabelEntry { flow_source: "Contract".to_string(), is_contract: true },
        );

        for sender in ["\\xAB12", "AB12", "0xAB12"] {
            let (trader, label, defaulted) = label_for(sender, &map);
            assert_eq!(trader, sender.to_lowercase());
            assert_eq!(label.flow_source, "Contract", "sender encoding: {sender}");
            assert!(label.is_contract);
            assert!(!defaulted);
        }
    }

    #[test]
    fn malformed_sender_still_defaults() {
        let (trader, label, defaulted) = label_for("not-hex", &labels());
        assert_eq!(trader, "not-hex");
        assert_eq!(label, LabelEntry::default());
        assert!(defaulted);
    }
}
