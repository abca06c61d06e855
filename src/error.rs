//! Error conditions callers need to tell apart.
//!
//! Most failures in this crate are plumbing (file I/O, malformed CSV) and
//! flow through `anyhow` with context. The variants here are the ones with
//! distinct handling downstream: input validation failures abort before any
//! computation, compliance violations abort the whole run, and an unknown
//! issue at re-rank time maps to "not found" rather than a server error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required column is absent from an input table. Raised before any
    /// graph or scoring work starts; nothing partial is written.
    #[error("{table} table missing required columns: {columns:?}")]
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },

    /// An issue name in the taxonomy matched a deny-listed keyword. The run
    /// aborts with no score table or state document written.
    #[error("disallowed targeting keyword detected in issue names: '{keyword}'")]
    ComplianceViolation { keyword: String },

    /// A re-rank request named an issue absent from the persisted state.
    #[error("issue '{0}' not found in pipeline state")]
    IssueNotFound(String),
}
