//! PageRank power iteration over the follow graph.
//!
//! Computes the stationary distribution of a random walk that follows
//! outgoing edges with probability `DAMPING` and teleports uniformly
//! otherwise. Dangling nodes (no outgoing edges) redistribute their mass
//! uniformly each step, which keeps the result a probability distribution.
//!
//! Convergence test matches the usual power-iteration contract: the L1
//! change between iterations must drop below `N * TOLERANCE` within
//! `MAX_ITERATIONS`, otherwise the caller falls back to a uniform
//! distribution.

use petgraph::graph::DiGraph;
use petgraph::Direction;

/// Random-walk damping factor.
const DAMPING: f64 = 0.85;
/// Per-node convergence tolerance (L1 error threshold is `N * TOLERANCE`).
const TOLERANCE: f64 = 1e-6;
const MAX_ITERATIONS: usize = 100;

/// Run power iteration. Returns ranks indexed by node index, or `None` if
/// the iteration did not converge.
pub(crate) fn power_iteration(graph: &DiGraph<(), ()>) -> Option<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return Some(Vec::new());
    }
    let n_f = n as f64;

    // Out-degrees, computed once.
    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.neighbors_directed(node, Direction::Outgoing).count())
        .collect();

    let mut ranks = vec![1.0 / n_f; n];
    let mut next = vec![0.0; n];

    for iteration in 0..MAX_ITERATIONS {
        let dangling_sum: f64 = (0..n)
            .filter(|&i| out_degree[i] == 0)
            .map(|i| ranks[i])
            .sum();

        for node in graph.node_indices() {
            let incoming: f64 = graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|pred| ranks[pred.index()] / out_degree[pred.index()] as f64)
                .sum();

            next[node.index()] =
                (1.0 - DAMPING) / n_f + DAMPING * (incoming + dangling_sum / n_f);
        }

        let err: f64 = ranks
            .iter()
            .zip(&next)
            .map(|(old, new)| (new - old).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut next);

        if err < n_f * TOLERANCE {
            tracing::debug!(iterations = iteration + 1, "pagerank converged");
            return Some(ranks);
        }
    }

    None
}
