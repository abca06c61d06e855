//! Multi-factor linear scoring.
//!
//! Combines four independently normalized signals per (account, issue):
//! - reach: follower count, normalized across all accounts
//! - centrality: PageRank value, normalized across all accounts
//! - engagement: per-item engagement rate relative to audience size,
//!   normalized per issue, zeroed below the cold-start sample threshold
//! - salience: fraction of the account's tagged activity on this issue,
//!   normalized per issue
//!
//! Normalization is min-max with a deliberate degenerate rule: when a
//! vector is effectively constant the normalized output is all zeros, not
//! all 0.5. That rule changes ranking outcomes whenever a population is
//! uniform on some axis and must hold exactly.

use crate::aggregate::EngagementTable;
use crate::config::ScoringSpec;
use crate::types::{Account, Centrality, CommunityPartition, IssueScore};

/// Spread below which a vector counts as constant.
const MINMAX_TOLERANCE: f64 = 1e-12;

/// Min-max scale to [0,1]. Constant (or empty) input scales to all zeros.
pub fn minmax_scale(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max - min < MINMAX_TOLERANCE {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

/// Produce the full score table: one row per (account, issue) for the
/// sorted union of issues present in the stats table.
///
/// Pure function of its inputs; accounts absent from the community
/// partition carry `community: None`.
pub fn score(
    accounts: &[Account],
    centrality: &Centrality,
    communities: &CommunityPartition,
    stats: &EngagementTable,
    spec: &ScoringSpec,
) -> Vec<IssueScore> {
    // Issue-independent axes, normalized once across all accounts.
    let reach_raw: Vec<f64> = accounts.iter().map(|a| a.followers as f64).collect();
    let centrality_raw: Vec<f64> = accounts
        .iter()
        .map(|a| centrality.get(&a.id).copied().unwrap_or(0.0))
        .collect();
    let reach_norm = minmax_scale(&reach_raw);
    let centrality_norm = minmax_scale(&centrality_raw);

    let mut records = Vec::new();
    for issue in stats.issues() {
        let mut eng_rate = Vec::with_capacity(accounts.len());
        let mut salience = Vec::with_capacity(accounts.len());

        for account in accounts {
            let stat = stats.get(&account.id, &issue);

            // Cold-start guard: below the sample threshold the rate is
            // forced to zero no matter how high eng_sum is.
            let rate = if stat.count >= spec.min_samples_for_engagement {
                let followers = (account.followers as f64).max(1.0);
                (stat.eng_sum as f64 / stat.count as f64) / followers
            } else {
                0.0
            };
            eng_rate.push(rate);

            let total_mentions = stats.total_mentions(&account.id);
            let sal = if total_mentions > 0 {
                stat.count as f64 / (total_mentions as f64 + spec.epsilon)
            } else {
                0.0
            };
            salience.push(sal);
        }

        let eng_norm = minmax_scale(&eng_rate);
        let sal_norm = minmax_scale(&salience);

        let w = &spec.weights;
        for (i, account) in accounts.iter().enumerate() {
            let composite = w.reach * reach_norm[i]
                + w.engagement * eng_norm[i]
                + w.centrality * centrality_norm[i]
                + w.salience * sal_norm[i];
            records.push(IssueScore {
                account_id: account.id.clone(),
                handle: account.handle.clone(),
                issue: issue.clone(),
                reach: reach_norm[i],
                engagement: eng_norm[i],
                centrality: centrality_norm[i],
                salience: sal_norm[i],
                score: composite,
                community: communities.get(&account.id).copied(),
            });
        }
    }
    records
}
