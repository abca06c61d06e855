//! Input table adapters: CSV account/edge/post loaders and the YAML
//! taxonomy loader.
//!
//! Validation is fail-closed: required columns are checked against the CSV
//! header before any row is parsed, and a missing column aborts with the
//! table name and the exact missing fields. Optional columns default to
//! zero/empty so the rest of the pipeline never sees absent data.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::PipelineError;
use crate::types::{Account, ContentItem, FollowEdge, Taxonomy};

/// Load the accounts table. Required: `id`, `handle`.
pub fn load_accounts(path: &Path) -> Result<Vec<Account>> {
    load_table(path, "accounts", &["id", "handle"])
}

/// Load the follow-edge table. Required: `src_id`, `dst_id`.
pub fn load_edges(path: &Path) -> Result<Vec<FollowEdge>> {
    load_table(path, "edges", &["src_id", "dst_id"])
}

/// Load the content table. Required: `id`, `author_id`, `text`.
pub fn load_posts(path: &Path) -> Result<Vec<ContentItem>> {
    load_table(path, "posts", &["id", "author_id", "text"])
}

fn load_table<T: DeserializeOwned>(
    path: &Path,
    table: &'static str,
    required: &[&str],
) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {table} table: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read {table} header row"))?
        .clone();
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            table,
            columns: missing,
        }
        .into());
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T =
            record.with_context(|| format!("malformed row in {table} table"))?;
        rows.push(row);
    }
    tracing::debug!(table, rows = rows.len(), "loaded input table");
    Ok(rows)
}

/// YAML document shape for the taxonomy file.
#[derive(Debug, Deserialize)]
struct TaxonomyDoc {
    #[serde(default)]
    issues: IndexMap<String, Vec<String>>,
}

/// Load the issue taxonomy, preserving issue insertion order and
/// lowercasing every keyword (matching is case-insensitive downstream).
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read taxonomy file: {}", path.display()))?;
    let doc: TaxonomyDoc = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse taxonomy file: {}", path.display()))?;

    let taxonomy = doc
        .issues
        .into_iter()
        .map(|(issue, keywords)| {
            let lowered = keywords.into_iter().map(|kw| kw.to_lowercase()).collect();
            (issue, lowered)
        })
        .collect();
    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_accounts_with_optional_columns_absent() {
        let file = write_temp("id,handle\nu1,alice\nu2,bob\n");
        let accounts = load_accounts(file.path()).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, "u1");
        assert_eq!(accounts[0].followers, 0);
        assert_eq!(accounts[0].geo, "");
    }

    #[test]
    fn test_load_accounts_missing_required_column() {
        let file = write_temp("id,followers\nu1,10\n");
        let err = load_accounts(file.path()).unwrap_err();
        let err = err.downcast::<PipelineError>().unwrap();
        match err {
            PipelineError::MissingColumns { table, columns } => {
                assert_eq!(table, "accounts");
                assert_eq!(columns, vec!["handle".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_edges() {
        let file = write_temp("src_id,dst_id\nu1,u2\nu2,u1\n");
        let edges = load_edges(file.path()).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].src_id, "u1");
        assert_eq!(edges[0].dst_id, "u2");
    }

    #[test]
    fn test_load_posts_defaults_counters() {
        let file = write_temp("id,author_id,text\np1,u1,hello world\n");
        let posts = load_posts(file.path()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].likes, 0);
        assert_eq!(posts[0].engagement(), 0);
        assert_eq!(posts[0].timestamp, "");
    }

    #[test]
    fn test_load_posts_missing_text_column() {
        let file = write_temp("id,author_id\np1,u1\n");
        let err = load_posts(file.path()).unwrap_err();
        assert!(err.to_string().contains("text"));
        assert!(err.to_string().contains("posts"));
    }

    #[test]
    fn test_load_taxonomy_lowercases_and_keeps_order() {
        let file = write_temp(
            "issues:\n  Climate:\n    - CARBON\n    - emissions\n  Housing:\n    - rent\n",
        );
        let tax = load_taxonomy(file.path()).unwrap();
        let issues: Vec<_> = tax.keys().collect();
        assert_eq!(issues, ["Climate", "Housing"]);
        assert_eq!(tax["Climate"], vec!["carbon", "emissions"]);
    }

    #[test]
    fn test_load_taxonomy_empty_document() {
        let file = write_temp("issues: {}\n");
        let tax = load_taxonomy(file.path()).unwrap();
        assert!(tax.is_empty());
    }
}
