//! Configuration loading from seedrank.toml.
//!
//! All sections are optional and every field has a default, so an absent or
//! empty config file yields a fully usable pipeline. Example:
//!
//! ```toml
//! [weights]
//! reach = 0.35
//! engagement = 0.25
//! centrality = 0.25
//! salience = 0.15
//!
//! [scoring]
//! min_samples_for_engagement = 3
//! epsilon = 1e-9
//!
//! [selection]
//! enforce_diversity = true
//! top_k = 25
//!
//! [compliance]
//! disallow_political_persuasion = true
//! deny_keywords = ["vote for", "election"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Component weights for the composite score. Not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub reach: f64,
    pub engagement: f64,
    pub centrality: f64,
    pub salience: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            reach: 0.35,
            engagement: 0.25,
            centrality: 0.25,
            salience: 0.15,
        }
    }
}

/// Scoring knobs independent of the weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum tagged-item count before an account's engagement rate counts.
    /// Below this the rate is forced to zero (cold-start guard).
    pub min_samples_for_engagement: u64,
    /// Denominator guard for the salience fraction.
    pub epsilon: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_samples_for_engagement: 3,
            epsilon: 1e-9,
        }
    }
}

/// Seed selection defaults for the command surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub enforce_diversity: bool,
    pub top_k: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            enforce_diversity: true,
            top_k: 25,
        }
    }
}

/// Deny-list settings for the taxonomy compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub disallow_political_persuasion: bool,
    pub deny_keywords: Vec<String>,
    pub allow_geos: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            disallow_political_persuasion: true,
            deny_keywords: vec![
                "vote for".into(),
                "election".into(),
                "ballot".into(),
                "turnout".into(),
                "register to vote".into(),
            ],
            allow_geos: Vec::new(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub weights: Weights,
    pub scoring: ScoringConfig,
    pub selection: SelectionConfig,
    pub compliance: ComplianceConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, or defaults when no path given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config file: {}", p.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("failed to parse config file: {}", p.display()))
            }
        }
    }

    /// The exact scoring inputs that get frozen into the pipeline state.
    pub fn scoring_spec(&self) -> ScoringSpec {
        ScoringSpec {
            weights: self.weights,
            min_samples_for_engagement: self.scoring.min_samples_for_engagement,
            epsilon: self.scoring.epsilon,
        }
    }
}

/// The scoring configuration persisted alongside derived data, so re-ranking
/// reproduces exactly the scores of the original run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSpec {
    pub weights: Weights,
    pub min_samples_for_engagement: u64,
    pub epsilon: f64,
}

impl Default for ScoringSpec {
    fn default() -> Self {
        AppConfig::default().scoring_spec()
    }
}
