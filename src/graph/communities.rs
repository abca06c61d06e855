//! Greedy modularity community detection (Clauset-Newman-Moore style).
//!
//! Every node starts in its own community. Each step merges the pair of
//! connected communities whose merger yields the largest modularity gain,
//! stopping when no merge improves modularity. Only connected pairs are
//! considered: merging disconnected communities always loses modularity.
//!
//! Modularity bookkeeping, for m undirected edges:
//! - `e_ij` = (edges between communities i and j) / m
//! - `a_i`  = (total degree inside community i) / 2m
//! - merge gain `dQ = e_ij - 2 * a_i * a_j`
//!
//! Pair scanning walks a `BTreeMap`, so ties resolve to the smallest pair
//! and the whole procedure is deterministic.

use std::collections::{BTreeMap, HashMap};

/// Gains below this are treated as "no improvement".
const MIN_GAIN: f64 = 1e-12;

/// Partition `n` nodes given unique undirected edges (a < b, no
/// self-loops). Returns one community label per node, labels assigned in
/// detection order starting at 0.
pub(crate) fn greedy_modularity(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    if edges.is_empty() {
        // No structure to exploit: every node is its own community.
        return (0..n).collect();
    }

    let m = edges.len() as f64;
    let mut degree = vec![0usize; n];
    for &(a, b) in edges {
        degree[a] += 1;
        degree[b] += 1;
    }

    // Community state, keyed by representative node index.
    let mut rep: Vec<usize> = (0..n).collect();
    let mut deg_sum: HashMap<usize, usize> = (0..n).map(|i| (i, degree[i])).collect();
    let mut between: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for &(a, b) in edges {
        *between.entry((a, b)).or_insert(0) += 1;
    }

    loop {
        let mut best: Option<((usize, usize), f64)> = None;
        for (&pair, &count) in &between {
            let (i, j) = pair;
            let a_i = deg_sum[&i] as f64 / (2.0 * m);
            let a_j = deg_sum[&j] as f64 / (2.0 * m);
            let gain = count as f64 / m - 2.0 * a_i * a_j;
            if best.map_or(true, |(_, b)| gain > b) {
                best = Some((pair, gain));
            }
        }

        let Some(((keep, absorb), gain)) = best else {
            break;
        };
        if gain < MIN_GAIN {
            break;
        }

        // Fold `absorb` into `keep`.
        for r in rep.iter_mut() {
            if *r == absorb {
                *r = keep;
            }
        }
        let absorbed_degree = deg_sum.remove(&absorb).expect("absorbed community degree");
        *deg_sum.get_mut(&keep).expect("kept community degree") += absorbed_degree;

        let stale: Vec<((usize, usize), usize)> = between
            .iter()
            .filter(|((a, b), _)| *a == absorb || *b == absorb)
            .map(|(&pair, &count)| (pair, count))
            .collect();
        for (pair, count) in stale {
            between.remove(&pair);
            let other = if pair.0 == absorb { pair.1 } else { pair.0 };
            if other == keep {
                // Now internal to the merged community.
                continue;
            }
            let key = (keep.min(other), keep.max(other));
            *between.entry(key).or_insert(0) += count;
        }
    }

    // Number communities by detection order over node insertion order.
    let mut labels = vec![0usize; n];
    let mut assigned: HashMap<usize, usize> = HashMap::new();
    for node in 0..n {
        let next = assigned.len();
        let label = *assigned.entry(rep[node]).or_insert(next);
        labels[node] = label;
    }
    labels
}
