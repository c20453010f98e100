//! Sentiment classification and quality scoring.

use std::sync::Arc;

use crowdpulse_core::{CanonicalPost, ScoredPost, Sentiment};

use crate::lexicon::Lexicon;

/// One side must exceed the other by this factor to leave `Neutral`.
pub const SENTIMENT_MARGIN: f64 = 1.2;

/// Content length unit for confidence normalization.
const CONFIDENCE_CHARS_PER_UNIT: f64 = 100.0;

/// Label a bull/bear score pair.
///
/// Bullish when `bull > 1.2 * bear`, bearish when `bear > 1.2 * bull`,
/// neutral otherwise (including `0/0`).
#[must_use]
pub fn classify(bull: u32, bear: u32) -> Sentiment {
    let (bull, bear) = (f64::from(bull), f64::from(bear));
    if bull > SENTIMENT_MARGIN * bear {
        Sentiment::Bullish
    } else if bear > SENTIMENT_MARGIN * bull {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// How a source's posts are weighed for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityModel {
    /// Sources exposing view counts but no author data:
    /// `min(views / 1000, 5) + min(title_chars / 20, 2)`.
    Engagement,
    /// Sources exposing author followers and interaction counters:
    /// `min(followers / 10000, 5) + (likes + 3*comments + 2*reposts) / 100`.
    Audience,
}

impl QualityModel {
    /// Non-negative quality scalar, rounded to two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(self, post: &CanonicalPost) -> f64 {
        let e = &post.engagement;
        let raw = match self {
            QualityModel::Engagement => {
                let views = e.views as f64 / 1000.0;
                let title = post.title.chars().count() as f64 / 20.0;
                views.min(5.0) + title.min(2.0)
            }
            QualityModel::Audience => {
                let followers = post.audience_size() as f64 / 10_000.0;
                let interactions = e
                    .likes
                    .saturating_add(e.comments.saturating_mul(3))
                    .saturating_add(e.reposts.saturating_mul(2));
                followers.min(5.0) + interactions as f64 / 100.0
            }
        };
        round2(raw.max(0.0))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derives every scored attribute of a post from its text and counters.
///
/// Total over its input: a post with no matching terms and zero counters
/// still produces a `Neutral` result.
#[derive(Clone)]
pub struct Scorer {
    lexicon: Arc<dyn Lexicon>,
    quality: QualityModel,
}

impl Scorer {
    #[must_use]
    pub fn new(lexicon: Arc<dyn Lexicon>, quality: QualityModel) -> Self {
        Self { lexicon, quality }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, post: CanonicalPost) -> ScoredPost {
        let hits = self.lexicon.scan(&post.scoring_text());
        let bull = hits.bull_score();
        let bear = hits.bear_score();

        let length_units = (post.content_chars() as f64 / CONFIDENCE_CHARS_PER_UNIT).max(1.0);
        let sentiment_confidence = f64::from(bull.abs_diff(bear)) / length_units;
        let quality_score = self.quality.score(&post);

        ScoredPost {
            sentiment: classify(bull, bear),
            sentiment_score: i64::from(bull) - i64::from(bear),
            panic_level: hits.panic,
            greed_level: hits.greed,
            emotion_intensity: hits.panic.max(hits.greed),
            sentiment_confidence,
            quality_score,
            post,
        }
    }
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("quality", &self.quality)
            .finish_non_exhaustive()
    }
}
