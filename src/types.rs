//! Core data model for seedrank.
//!
//! These are the read-only inputs for one pipeline run (accounts, follow
//! edges, content items, taxonomy) and the scored output row. Derived
//! artifacts (centrality, communities, engagement stats) live with the
//! modules that compute them.
//!
//! Key design decisions:
//! - Plain owned `String` ids; the tables are small enough that interning
//!   buys nothing over clarity.
//! - Inputs are frozen once loaded - every transform downstream is a pure
//!   function over borrowed slices.
//! - `BTreeMap` for derived id-keyed maps so the persisted state document
//!   serializes deterministically.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A social-graph account as loaded from the accounts table.
///
/// Optional attributes default to zero/empty at load time so the core
/// never deals with missing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub geo: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub profession: String,
}

/// One "source follows destination" record from the edge table.
///
/// Duplicates and self-loops are accepted as given; the graph layer decides
/// what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub src_id: String,
    pub dst_id: String,
}

/// A single piece of authored content with its engagement counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub author_id: String,
    pub text: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    /// Opaque to the pipeline; carried through for downstream consumers.
    #[serde(default)]
    pub timestamp: String,
}

impl ContentItem {
    /// Total engagement across all counters.
    pub fn engagement(&self) -> u64 {
        self.likes + self.shares + self.comments
    }
}

/// Issue name -> ordered lowercase keyword list.
///
/// Insertion order is significant: the tagger matches issues in taxonomy
/// order and that order is preserved in per-item match lists.
pub type Taxonomy = IndexMap<String, Vec<String>>;

/// Content item id -> matched issue names (possibly empty, taxonomy order).
pub type PostIssueMap = BTreeMap<String, Vec<String>>;

/// Account id -> PageRank value. Over a non-empty graph the values form a
/// probability distribution (sum ~= 1).
pub type Centrality = BTreeMap<String, f64>;

/// Account id -> community id, assigned in detection order starting at 0.
pub type CommunityPartition = BTreeMap<String, usize>;

/// One scored row per (account, issue) pair.
///
/// The four component scores are each min-max normalized to [0,1]; `score`
/// is their weighted combination. `community` is `None` for accounts absent
/// from the detected partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueScore {
    pub account_id: String,
    pub handle: String,
    pub issue: String,
    pub reach: f64,
    pub engagement: f64,
    pub centrality: f64,
    pub salience: f64,
    pub score: f64,
    pub community: Option<usize>,
}
