use crowdpulse_core::ScoredPost;
use serde::{Deserialize, Serialize};

/// Ranked, size-bounded output of one pipeline run.
///
/// Posts are ordered by `quality_score` descending; ties keep discovery
/// order. Immutable once built and shared through the session cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    posts: Vec<ScoredPost>,
}

impl ResultSet {
    /// Wraps posts that are already ranked. Use [`crate::rank`] to build one
    /// from an unordered collection.
    #[must_use]
    pub(crate) fn from_ranked(posts: Vec<ScoredPost>) -> Self {
        Self { posts }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn posts(&self) -> &[ScoredPost] {
        &self.posts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredPost> {
        self.posts.iter()
    }

    #[must_use]
    pub fn into_posts(self) -> Vec<ScoredPost> {
        self.posts
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ScoredPost;
    type IntoIter = std::slice::Iter<'a, ScoredPost>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}
