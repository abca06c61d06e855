//! Diversity-constrained top-K seed selection.
//!
//! Filters the score table to one issue, sorts by composite score with a
//! stable tie-break (equal scores keep their input order), and returns
//! either the plain head-K or a community round-robin pick. The round-robin
//! guarantees no single community contributes a second seed before every
//! other community with remaining supply has contributed one.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::types::IssueScore;

/// Group key for records without a community assignment.
///
/// `Option<usize>` with `None` as the reserved sentinel group: unassigned
/// accounts round-robin as their own bucket rather than being dropped.
type GroupKey = Option<usize>;

/// Select up to `k` seeds for one issue.
pub fn select(records: &[IssueScore], issue: &str, k: usize, diverse: bool) -> Vec<IssueScore> {
    let mut rows: Vec<IssueScore> = records.iter().filter(|r| r.issue == issue).cloned().collect();
    // Stable sort: equal scores preserve relative input order.
    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if !diverse {
        rows.truncate(k);
        return rows;
    }
    round_robin_by_community(rows, k)
}

/// Round-robin over community groups.
///
/// Groups form in first-seen (i.e. score-sorted) order, then order by
/// descending size with ties keeping first-seen order. Sweeps the ordered
/// groups repeatedly, popping each group's highest-scored remaining row,
/// until `k` rows are collected or every group is exhausted. A group that
/// runs dry is skipped on later sweeps.
fn round_robin_by_community(rows: Vec<IssueScore>, k: usize) -> Vec<IssueScore> {
    let mut groups: IndexMap<GroupKey, VecDeque<IssueScore>> = IndexMap::new();
    for row in rows {
        groups.entry(row.community).or_default().push_back(row);
    }

    let mut order: Vec<GroupKey> = groups.keys().copied().collect();
    // Stable sort keeps first-seen order among equal-sized groups.
    order.sort_by_key(|key| std::cmp::Reverse(groups[key].len()));

    let mut picked = Vec::new();
    while picked.len() < k && groups.values().any(|g| !g.is_empty()) {
        for key in &order {
            if let Some(row) = groups.get_mut(key).and_then(VecDeque::pop_front) {
                picked.push(row);
                if picked.len() >= k {
                    break;
                }
            }
        }
    }
    picked
}
