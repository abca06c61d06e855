//! Follow-graph analytics: centrality and community structure.
//!
//! Builds a directed graph (one node per account, one edge per follow
//! record) and derives the two structural signals the scorer consumes:
//! - PageRank centrality over the directed graph
//! - A community partition via greedy modularity maximization over the
//!   undirected projection
//!
//! Both computations run once per pipeline execution and their results are
//! frozen into the persisted state.

mod communities;
mod pagerank;

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::types::{Account, Centrality, CommunityPartition, FollowEdge};

/// The directed follow graph for one pipeline run.
///
/// Nodes cover every loaded account, including zero-degree ones. Edge
/// records referencing ids absent from the account table still create
/// nodes, so centrality and communities are defined over the full id space
/// the edges mention. Parallel follow records collapse to a single edge
/// (simple-digraph semantics); self-loops are kept.
pub struct FollowGraph {
    graph: DiGraph<(), ()>,
    /// Node index -> account id, in insertion order.
    ids: Vec<String>,
    index: HashMap<String, NodeIndex>,
}

impl FollowGraph {
    /// Build the graph from the loaded account and edge tables.
    pub fn build(accounts: &[Account], edges: &[FollowEdge]) -> Self {
        let mut fg = Self {
            graph: DiGraph::new(),
            ids: Vec::new(),
            index: HashMap::new(),
        };

        for account in accounts {
            fg.ensure_node(&account.id);
        }

        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        for edge in edges {
            let src = fg.ensure_node(&edge.src_id);
            let dst = fg.ensure_node(&edge.dst_id);
            if seen.insert((src, dst)) {
                fg.graph.add_edge(src, dst, ());
            }
        }

        tracing::debug!(
            nodes = fg.graph.node_count(),
            edges = fg.graph.edge_count(),
            "built follow graph"
        );
        fg
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(());
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// PageRank over the directed graph (damping 0.85).
    ///
    /// Empty graph yields an empty map. If power iteration fails to
    /// converge the result degrades to the uniform distribution `1/N`;
    /// that is logged, not surfaced as an error.
    pub fn compute_centrality(&self) -> Centrality {
        let n = self.graph.node_count();
        if n == 0 {
            return Centrality::new();
        }

        let ranks = match pagerank::power_iteration(&self.graph) {
            Some(ranks) => ranks,
            None => {
                tracing::warn!(
                    nodes = n,
                    "pagerank failed to converge; falling back to uniform distribution"
                );
                vec![1.0 / n as f64; n]
            }
        };

        self.ids
            .iter()
            .zip(ranks)
            .map(|(id, rank)| (id.clone(), rank))
            .collect()
    }

    /// Community partition of the undirected projection.
    ///
    /// Parallel directed edges (u->v plus v->u) collapse to one undirected
    /// edge and self-loops are dropped before modularity maximization.
    /// Every node lands in exactly one community; ids follow detection
    /// order starting at 0. Empty graph yields an empty map.
    pub fn compute_communities(&self) -> CommunityPartition {
        let n = self.graph.node_count();
        if n == 0 {
            return CommunityPartition::new();
        }

        let mut undirected: BTreeSet<(usize, usize)> = BTreeSet::new();
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                let (a, b) = (a.index(), b.index());
                if a != b {
                    undirected.insert((a.min(b), a.max(b)));
                }
            }
        }
        let edges: Vec<(usize, usize)> = undirected.into_iter().collect();

        let labels = communities::greedy_modularity(n, &edges);
        self.ids
            .iter()
            .zip(labels)
            .map(|(id, label)| (id.clone(), label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> Account {
        Account {
            id: id.into(),
            handle: format!("@{id}"),
            followers: 0,
            following: 0,
            geo: String::new(),
            lang: String::new(),
            profession: String::new(),
        }
    }

    fn edge(src: &str, dst: &str) -> FollowEdge {
        FollowEdge {
            src_id: src.into(),
            dst_id: dst.into(),
        }
    }

    #[test]
    fn test_zero_degree_accounts_become_nodes() {
        let accounts = vec![account("a"), account("b"), account("c")];
        let graph = FollowGraph::build(&accounts, &[edge("a", "b")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_edges_create_missing_nodes() {
        let graph = FollowGraph::build(&[account("a")], &[edge("a", "ghost")]);
        assert_eq!(graph.node_count(), 2);
        let centrality = graph.compute_centrality();
        assert!(centrality.contains_key("ghost"));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let accounts = vec![account("a"), account("b")];
        let edges = vec![edge("a", "b"), edge("a", "b"), edge("a", "b")];
        let graph = FollowGraph::build(&accounts, &edges);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_empty_graph_empty_maps() {
        let graph = FollowGraph::build(&[], &[]);
        assert!(graph.compute_centrality().is_empty());
        assert!(graph.compute_communities().is_empty());
    }

    #[test]
    fn test_centrality_sums_to_one() {
        let accounts: Vec<Account> = ["a", "b", "c", "d"].iter().map(|i| account(i)).collect();
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "a"), edge("d", "a")];
        let graph = FollowGraph::build(&accounts, &edges);
        let centrality = graph.compute_centrality();
        let total: f64 = centrality.values().sum();
        assert!((total - 1.0).abs() < 1e-6, "centrality sum {total}");
    }

    #[test]
    fn test_isolated_nodes_get_uniform_centrality() {
        // All-isolated graph: no edges at all, every node dangling.
        let accounts: Vec<Account> = ["a", "b", "c"].iter().map(|i| account(i)).collect();
        let graph = FollowGraph::build(&accounts, &[]);
        let centrality = graph.compute_centrality();
        for value in centrality.values() {
            assert!((value - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_followed_account_ranks_higher() {
        let accounts: Vec<Account> = ["hub", "f1", "f2", "f3"].iter().map(|i| account(i)).collect();
        let edges = vec![edge("f1", "hub"), edge("f2", "hub"), edge("f3", "hub")];
        let graph = FollowGraph::build(&accounts, &edges);
        let centrality = graph.compute_centrality();
        assert!(centrality["hub"] > centrality["f1"]);
        assert!(centrality["hub"] > centrality["f2"]);
    }

    #[test]
    fn test_communities_form_true_partition() {
        let accounts: Vec<Account> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|i| account(i))
            .collect();
        // Two triangles plus one isolated node
        let edges = vec![
            edge("a", "b"),
            edge("b", "c"),
            edge("c", "a"),
            edge("d", "e"),
            edge("e", "f"),
            edge("f", "d"),
        ];
        let graph = FollowGraph::build(&accounts, &edges);
        let partition = graph.compute_communities();

        // Every account appears exactly once
        assert_eq!(partition.len(), 7);
        for acct in &accounts {
            assert!(partition.contains_key(&acct.id));
        }
        // Triangles stay together, and apart from each other
        assert_eq!(partition["a"], partition["b"]);
        assert_eq!(partition["b"], partition["c"]);
        assert_eq!(partition["d"], partition["e"]);
        assert_eq!(partition["e"], partition["f"]);
        assert_ne!(partition["a"], partition["d"]);
        assert_ne!(partition["g"], partition["a"]);
        assert_ne!(partition["g"], partition["d"]);
    }

    #[test]
    fn test_community_ids_start_at_zero_and_are_dense() {
        let accounts: Vec<Account> = ["a", "b", "c", "d"].iter().map(|i| account(i)).collect();
        let edges = vec![edge("a", "b"), edge("c", "d")];
        let graph = FollowGraph::build(&accounts, &edges);
        let partition = graph.compute_communities();
        let mut ids: Vec<usize> = partition.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_self_loop_does_not_crash_communities() {
        let accounts = vec![account("a"), account("b")];
        let edges = vec![edge("a", "a"), edge("a", "b")];
        let graph = FollowGraph::build(&accounts, &edges);
        let partition = graph.compute_communities();
        assert_eq!(partition.len(), 2);
    }
}
