//! Taxonomy compliance gate.
//!
//! Issue names are scanned against a deny list of politically-sensitive
//! keywords before any pipeline output is persisted. A hit aborts the whole
//! run; nothing partial is written. Matching is case-insensitive on word
//! boundaries so "election" flags "Election Reform" but not "selection".

use anyhow::Result;
use regex::Regex;

use crate::error::PipelineError;

/// Check that no deny-listed keyword appears in any of the given issue
/// names. Returns the first violating keyword as an error.
pub fn assert_non_political(issue_names: &[String], deny_keywords: &[String]) -> Result<()> {
    let joined = issue_names.join(" ").to_lowercase();
    for keyword in deny_keywords {
        let pattern = format!(r"\b{}\b", regex::escape(&keyword.to_lowercase()));
        // The pattern is built from an escaped literal, so it always compiles.
        let re = Regex::new(&pattern).expect("escaped keyword pattern");
        if re.is_match(&joined) {
            return Err(PipelineError::ComplianceViolation {
                keyword: keyword.clone(),
            }
            .into());
        }
    }
    Ok(())
}
