//! Admission gate applied to every extracted post before ranking.
//!
//! A post is admitted when it satisfies ANY enabled branch: an influential
//! author, enough weighted engagement, or enough substantive content.
//! A branch whose threshold is `None` never admits.

use crowdpulse_core::{CanonicalPost, Engagement};

/// Per-counter multipliers for the weighted-engagement branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementWeights {
    pub likes: u64,
    pub comments: u64,
    pub reposts: u64,
    pub views: u64,
}

impl EngagementWeights {
    /// Weighted sum of `engagement`, saturating on overflow.
    #[must_use]
    pub fn weighted(&self, engagement: &Engagement) -> u64 {
        [
            (self.likes, engagement.likes),
            (self.comments, engagement.comments),
            (self.reposts, engagement.reposts),
            (self.views, engagement.views),
        ]
        .iter()
        .fold(0_u64, |acc, (w, n)| acc.saturating_add(w.saturating_mul(*n)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityGate {
    /// Minimum author followers.
    pub min_audience: Option<u64>,
    /// Minimum weighted engagement per `weights`.
    pub min_engagement: Option<u64>,
    /// Minimum content length in characters.
    pub min_content_chars: Option<usize>,
    pub weights: EngagementWeights,
}

impl QualityGate {
    /// Gate for list pages that only expose a read count: admits posts with
    /// at least `min_views` views.
    #[must_use]
    pub fn views_only(min_views: u64) -> Self {
        Self {
            min_audience: None,
            min_engagement: Some(min_views),
            min_content_chars: None,
            weights: EngagementWeights {
                views: 1,
                ..EngagementWeights::default()
            },
        }
    }

    /// Gate for timelines with author and interaction data. Engagement is
    /// `likes + 2 * comments`.
    #[must_use]
    pub fn influence(min_followers: u64, min_engagement: u64, min_content_chars: usize) -> Self {
        Self {
            min_audience: Some(min_followers),
            min_engagement: Some(min_engagement),
            min_content_chars: Some(min_content_chars),
            weights: EngagementWeights {
                likes: 1,
                comments: 2,
                ..EngagementWeights::default()
            },
        }
    }

    #[must_use]
    pub fn has_audience(&self, post: &CanonicalPost) -> bool {
        self.min_audience
            .is_some_and(|min| post.audience_size() >= min)
    }

    #[must_use]
    pub fn has_engagement(&self, post: &CanonicalPost) -> bool {
        self.min_engagement
            .is_some_and(|min| self.weights.weighted(&post.engagement) >= min)
    }

    #[must_use]
    pub fn has_substance(&self, post: &CanonicalPost) -> bool {
        self.min_content_chars
            .is_some_and(|min| post.content_chars() >= min)
    }

    #[must_use]
    pub fn admit(&self, post: &CanonicalPost) -> bool {
        self.has_audience(post) || self.has_engagement(post) || self.has_substance(post)
    }
}
