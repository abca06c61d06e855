//! Audience expansion from a selected seed set.
//!
//! The downstream use of the seed set: the audience is every account that
//! follows at least one seed. Deduplicated, preserving first-seen order
//! over the edge table so output is stable across runs.

use std::collections::HashSet;

use crate::types::{FollowEdge, IssueScore};

/// Distinct follower ids of any seed account.
pub fn build_audience(seeds: &[IssueScore], edges: &[FollowEdge]) -> Vec<String> {
    let seed_ids: HashSet<&str> = seeds.iter().map(|s| s.account_id.as_str()).collect();
    let mut seen = HashSet::new();
    let mut audience = Vec::new();
    for edge in edges {
        if seed_ids.contains(edge.dst_id.as_str()) && seen.insert(edge.src_id.as_str()) {
            audience.push(edge.src_id.clone());
        }
    }
    audience
}
