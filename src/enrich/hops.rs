use crate::types::RawSwap;

/// Assign the 1-based hop index for every swap: its rank by ascending
/// `log_index` within its transaction. Returned vec is aligned with the input
/// slice. The second element is true when the whole set fell back to 1.
///
/// The ranking uses an explicit sort on `(tx_hash, log_index)` plus a counter
/// reset at every tx_hash boundary, so the result depends only on those two
/// fields and never on arrival order.
///
/// Fallback: if any row is missing `log_index` or its tx_hash is empty, the
/// grouping key is unusable and every row gets `hop_index = 1`.
pub fn assign_hop_indices(swaps: &[RawSwap]) -> (Vec<i64>, bool) {
    let degraded = swaps
        .iter()
        .any(|s| s.log_index.is_none() || s.tx_hash.is_empty());
    if degraded {
        return (vec![1; swaps.len()], true);
    }

    let mut order: Vec<usize> = (0..swaps.len()).collect();
    order.sort_by(|&a, &b| {
        let ka = (&swaps[a].tx_hash, swaps[a].log_index);
        let kb = (&swaps[b].tx_hash, swaps[b].log_index);
        ka.cmp(&kb)
    });

    let mut hops = vec![0i64; swaps.len()];
    let mut prev_tx: Option<&str> = None;
    let mut counter = 0i64;
    for &idx in &order {
        let tx = swaps[idx].tx_hash.as_str();
        if prev_tx != Some(tx) {
            prev_tx = Some(tx);
            counter = 0;
        }
        counter += 1;
        hops[idx] = counter;
    }

    (hops, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawSwap;
    use std::collections::HashMap;

    fn swap(tx: &str, log_index: Option<i64>) -> RawSwap {
        RawSwap {
            block_time: "2026-08-30T00:00:00".to_string(),
            tx_hash: tx.to_string(),
            log_index,
            pool_address: "0xpool".to_string(),
            token0: "0xt0".to_string(),
            token1: "0xt1".to_string(),
            amount0: "1".to_string(),
            amount1: "-1".to_string(),
            sender: "0xsender".to_string(),
        }
    }

    #[test]
    fn ranks_by_log_index_within_tx() {
        // Input arrival order is deliberately shuffled.
        let swaps = vec![
            swap("0xaa", Some(2)),
            swap("0xaa", Some(0)),
            swap("0xbb", Some(0)),
        ];
        let (hops, degraded) = assign_hop_indices(&swaps);
        assert!(!degraded);
        assert_eq!(hops, vec![2, 1, 1]);
    }

    #[test]
    fn single_swap_tx_gets_hop_one() {
        let swaps = vec![swap("0xaa", Some(57))];
        let (hops, _) = assign_hop_indices(&swaps);
        assert_eq!(hops, vec![1]);
    }

    #[test]
    fn contiguous_within_each_group() {
        let swaps = vec![
            swap("0xcc", Some(9)),
            swap("0xaa", Some(40)),
            swap("0xaa", Some(12)),
            swap("0xcc", Some(3)),
            swap("0xaa", Some(25)),
        ];
        let (hops, _) = assign_hop_indices(&swaps);

        let mut groups: HashMap<&str, Vec<i64>> = HashMap::new();
        for (s, &h) in swaps.iter().zip(&hops) {
            groups.entry(s.tx_hash.as_str()).or_default().push(h);
        }
        for (_, mut hs) in groups {
            hs.sort_unstable();
            let expected: Vec<i64> = (1..=hs.len() as i64).collect();
            assert_eq!(hs, expected);
        }
    }

    #[test]
    fn stable_under_arrival_order() {
        let a = vec![swap("0xaa", Some(2)), swap("0xaa", Some(0)), swap("0xbb", Some(0))];
        let mut b = a.clone();
        b.reverse();

        let (hops_a, _) = assign_hop_indices(&a);
        let (hops_b, _) = assign_hop_indices(&b);

        // Same (tx_hash, log_index) pair gets the same hop regardless of position.
        let key = |s: &RawSwap| (s.tx_hash.clone(), s.log_index);
        let map_a: HashMap<_, _> = a.iter().map(key).zip(hops_a).collect();
        let map_b: HashMap<_, _> = b.iter().map(key).zip(hops_b).collect();
        assert_eq!(map_a, map_b);
    }

    #[test]
    fn missing_log_index_degrades_whole_set() {
        let swaps = vec![
            swap("0xaa", Some(0)),
            swap("0xaa", None),
            swap("0xbb", Some(4)),
        ];
        let (hops, degraded) = assign_hop_indices(&swaps);
        assert!(degraded);
        assert_eq!(hops, vec![1, 1, 1]);
    }

    #[test]
    fn empty_tx_hash_degrades_whole_set() {
        let swaps = vec![swap("", Some(0)), swap("0xbb", Some(1))];
        let (hops, degraded) = assign_hop_indices(&swaps);
        assert!(degraded);
        assert_eq!(hops, vec![1, 1]);
    }

    #[test]
    fn empty_input_is_fine() {
        let (hops, degraded) = assign_hop_indices(&[]);
        assert!(hops.is_empty());
        assert!(!degraded);
    }
}
