use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Offset both community sites publish timestamps in (China Standard Time).
const SOURCE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Returns the fixed UTC+08:00 offset used for every post timestamp.
///
/// # Panics
///
/// Does not panic: the offset is a constant well inside chrono's valid range.
#[must_use]
pub fn source_offset() -> FixedOffset {
    FixedOffset::east_opt(SOURCE_UTC_OFFSET_SECS).expect("UTC+8 is a valid offset")
}

/// The community site a post originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Eastmoney Guba stock forum (HTML list pages).
    EastmoneyCommunity,
    /// Xueqiu public timeline (JSON API).
    XueqiuCommunity,
}

impl SourceType {
    pub const ALL: [SourceType; 2] = [SourceType::EastmoneyCommunity, SourceType::XueqiuCommunity];

    /// Stable name used for cache keys, log fields and the `source_type` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::EastmoneyCommunity => "eastmoney_community",
            SourceType::XueqiuCommunity => "xueqiu_community",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eastmoney" | "eastmoney_community" | "guba" => Ok(SourceType::EastmoneyCommunity),
            "xueqiu" | "xueqiu_community" => Ok(SourceType::XueqiuCommunity),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A six-digit A-share instrument code, e.g. `"600519"`.
    Instrument,
    /// A numeric topic-category id on a timeline source, e.g. `"102"`.
    Category,
}

/// What one fetch task is pointed at. Enumerated fresh per pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub id: String,
}

impl Target {
    #[must_use]
    pub fn instrument(code: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Instrument,
            id: code.into(),
        }
    }

    #[must_use]
    pub fn category(id: impl ToString) -> Self {
        Self {
            kind: TargetKind::Category,
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Engagement counters. Any counter the source does not expose stays `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    pub reposts: u64,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Audience size (follower count).
    pub followers: u64,
}

/// A discussion item normalized from any source format. Not yet scored.
///
/// `content` is never empty: extractors drop items whose cleaned text is
/// empty before a `CanonicalPost` is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPost {
    /// Display title; may carry a trailing `...` when derived from long content.
    pub title: String,
    /// Full text with markup and entities stripped. Never truncated.
    pub content: String,
    pub publish_time: DateTime<FixedOffset>,
    /// Absolute URL of the post.
    pub url: String,
    pub source_target: Target,
    pub author: Option<Author>,
    pub engagement: Engagement,
    pub source_type: SourceType,
    /// Instrument codes mentioned in the text, first-seen order.
    #[serde(default)]
    pub stock_mentions: Vec<String>,
    /// `true` when the source exposed only a title and `content` repeats it.
    #[serde(default)]
    pub title_only: bool,
}

impl CanonicalPost {
    /// Author follower count, `0` when the source carries no author.
    #[must_use]
    pub fn audience_size(&self) -> u64 {
        self.author.as_ref().map_or(0, |a| a.followers)
    }

    /// Length of `content` in characters (not bytes).
    #[must_use]
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Text the lexicon scans: title and content joined by a space.
    #[must_use]
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`CanonicalPost`] plus everything the scorer derived from it.
/// Computed once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    #[serde(flatten)]
    pub post: CanonicalPost,
    pub sentiment: Sentiment,
    /// `bull_score - bear_score`.
    pub sentiment_score: i64,
    pub panic_level: u32,
    pub greed_level: u32,
    /// `max(panic_level, greed_level)`.
    pub emotion_intensity: u32,
    /// Signal imbalance normalized by text length (per 100 chars, floor 1).
    pub sentiment_confidence: f64,
    /// Non-negative quality/influence scalar used for ranking.
    pub quality_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_parses_short_and_long_names() {
        assert_eq!(
            "eastmoney".parse::<SourceType>().unwrap(),
            SourceType::EastmoneyCommunity
        );
        assert_eq!(
            "XUEQIU_COMMUNITY".parse::<SourceType>().unwrap(),
            SourceType::XueqiuCommunity
        );
    }

    #[test]
    fn source_type_rejects_unknown_name() {
        let err = "weibo".parse::<SourceType>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSource(ref s) if s == "weibo"));
    }

    #[test]
    fn source_type_serializes_as_snake_case() {
        let json = serde_json::to_string(&SourceType::XueqiuCommunity).unwrap();
        assert_eq!(json, "\"xueqiu_community\"");
    }

    #[test]
    fn content_chars_counts_characters_not_bytes() {
        let post = CanonicalPost {
            title: "茅台".to_string(),
            content: "茅台涨停".to_string(),
            publish_time: DateTime::parse_from_rfc3339("2026-03-02T09:30:00+08:00").unwrap(),
            url: "https://example.com/1".to_string(),
            source_target: Target::instrument("600519"),
            author: None,
            engagement: Engagement::default(),
            source_type: SourceType::EastmoneyCommunity,
            stock_mentions: vec![],
            title_only: false,
        };
        assert_eq!(post.content_chars(), 4);
        assert_eq!(post.audience_size(), 0);
        assert_eq!(post.scoring_text(), "茅台 茅台涨停");
    }

    #[test]
    fn source_offset_is_utc_plus_eight() {
        assert_eq!(source_offset().local_minus_utc(), 8 * 3600);
    }
}
