use std::collections::HashSet;

use crowdpulse_core::ScoredPost;

use crate::types::ResultSet;

/// Deduplicate by URL, order by `quality_score` descending and keep the
/// first `max_count`.
///
/// The earliest-discovered copy of a URL wins. The sort is stable, so equal
/// scores keep discovery order and identical input yields identical output.
#[must_use]
pub fn rank(posts: Vec<ScoredPost>, max_count: usize) -> ResultSet {
    let mut seen: HashSet<String> = HashSet::with_capacity(posts.len());
    let mut unique: Vec<ScoredPost> = posts
        .into_iter()
        .filter(|p| seen.insert(p.post.url.clone()))
        .collect();

    unique.sort_by(|a, b| b.quality_score.total_cmp(&a.quality_score));
    unique.truncate(max_count);
    ResultSet::from_ranked(unique)
}
