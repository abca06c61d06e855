//! Keyword-based issue tagging.
//!
//! Maps each content item to the issues whose keywords occur in its text.
//! Matching is case-insensitive substring search; issues are tried in
//! taxonomy insertion order and match lists preserve that order, which is
//! the tie-break contract downstream consumers rely on.

use crate::types::{ContentItem, PostIssueMap, Taxonomy};

/// Tag every content item with its matched issues.
///
/// Every item gets an entry, including items that match nothing (empty
/// list). An item matches an issue when any of that issue's keywords occurs
/// as a substring of the lowercased text. Pure and deterministic.
pub fn tag_posts(posts: &[ContentItem], taxonomy: &Taxonomy) -> PostIssueMap {
    let mut tagged = PostIssueMap::new();
    for post in posts {
        let text = post.text.to_lowercase();
        let matched: Vec<String> = taxonomy
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw.as_str())))
            .map(|(issue, _)| issue.clone())
            .collect();
        tagged.insert(post.id.clone(), matched);
    }
    tagged
}
