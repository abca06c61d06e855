//! Per-account, per-issue engagement aggregation.
//!
//! Folds tagged content into a typed table keyed by the composite
//! (account id, issue) key. Absent entries mean zero - the table never
//! stores explicit zeros, and the accessors hand back a zero stat for any
//! key they have never seen. Accumulation is associative, so input order
//! does not matter.
//!
//! The persisted form is the nested `{account -> {issue -> {count,
//! eng_sum}}}` document; serialization converts between the flat composite
//! keying used in memory and that nested shape.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{ContentItem, PostIssueMap};

/// Activity counters for one (account, issue) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStat {
    /// Number of tagged items the account authored for this issue.
    pub count: u64,
    /// Summed likes+shares+comments across those items.
    pub eng_sum: u64,
}

/// The per-account, per-issue stats table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementTable {
    stats: HashMap<(String, String), IssueStat>,
}

impl EngagementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tagged item for (account, issue).
    pub fn add(&mut self, account_id: &str, issue: &str, engagement: u64) {
        let entry = self
            .stats
            .entry((account_id.to_string(), issue.to_string()))
            .or_default();
        entry.count += 1;
        entry.eng_sum += engagement;
    }

    /// Stats for (account, issue); zero if the pair was never recorded.
    pub fn get(&self, account_id: &str, issue: &str) -> IssueStat {
        self.stats
            .get(&(account_id.to_string(), issue.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Total tagged-item count for an account across every issue.
    pub fn total_mentions(&self, account_id: &str) -> u64 {
        self.stats
            .iter()
            .filter(|((account, _), _)| account == account_id)
            .map(|(_, stat)| stat.count)
            .sum()
    }

    /// Sorted union of all issues present in the table.
    pub fn issues(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.stats.keys().map(|(_, issue)| issue.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }
}

impl Serialize for EngagementTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut nested: BTreeMap<&str, BTreeMap<&str, &IssueStat>> = BTreeMap::new();
        for ((account, issue), stat) in &self.stats {
            nested
                .entry(account.as_str())
                .or_default()
                .insert(issue.as_str(), stat);
        }
        nested.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EngagementTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nested: BTreeMap<String, BTreeMap<String, IssueStat>> =
            BTreeMap::deserialize(deserializer)?;
        let mut stats = HashMap::new();
        for (account, issues) in nested {
            for (issue, stat) in issues {
                stats.insert((account.clone(), issue), stat);
            }
        }
        Ok(Self { stats })
    }
}

/// Fold tagged content into the stats table.
///
/// For every item and every issue it matched, the author's (account, issue)
/// counters advance by 1 and by the item's total engagement. Accounts that
/// authored no tagged content never appear as keys.
pub fn aggregate(posts: &[ContentItem], post_issue_map: &PostIssueMap) -> EngagementTable {
    let mut table = EngagementTable::new();
    for post in posts {
        let Some(issues) = post_issue_map.get(&post.id) else {
            continue;
        };
        let engagement = post.engagement();
        for issue in issues {
            table.add(&post.author_id, issue, engagement);
        }
    }
    table
}
