//! seedrank - issue-relevance ranking and diverse seed selection over a
//! social follow graph.
//!
//! # Architecture
//!
//! ```text
//! Ingestion → Tagging → Aggregation → Graph Analytics → Scoring → Selection
//!     ↓          ↓           ↓              ↓              ↓          ↓
//!    csv      keyword     typed        petgraph         min-max   community
//!   yaml     substring   (acct,issue)  PageRank +      normalized round-robin
//!                         table        modularity      composite   top-K
//! ```
//!
//! The expensive phase (graph analytics, tagging, aggregation) runs once
//! per snapshot and freezes into a persisted `PipelineState`; scoring and
//! selection re-run cheaply against that snapshot for any (issue, k,
//! diversity) choice. A compliance gate on the issue taxonomy runs before
//! anything is written.

pub mod aggregate;
pub mod audience;
pub mod compliance;
pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod pipeline;
pub mod scoring;
pub mod selection;
pub mod server;
pub mod tagging;
pub mod types;

// Re-export core types
pub use aggregate::{EngagementTable, IssueStat};
pub use config::{AppConfig, ScoringSpec, Weights};
pub use error::PipelineError;
pub use graph::FollowGraph;
pub use pipeline::{PipelineOutput, PipelineState};
pub use types::{
    Account, Centrality, CommunityPartition, ContentItem, FollowEdge, IssueScore, PostIssueMap,
    Taxonomy,
};
