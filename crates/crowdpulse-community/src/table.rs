//! Flat tabular view of a [`ResultSet`] for tools that expect rows.

use crowdpulse_core::{ScoredPost, Sentiment, SourceType};
use serde::Serialize;

use crate::types::ResultSet;

const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names in row order. Present even when there are no rows.
pub const COLUMNS: &[&str] = &[
    "title",
    "content",
    "publish_time",
    "url",
    "sentiment",
    "quality_score",
    "sentiment_score",
    "panic_level",
    "greed_level",
    "emotion_intensity",
    "sentiment_confidence",
    "source_type",
    "source_target",
    "author_name",
    "author_followers",
    "like_count",
    "comment_count",
    "repost_count",
    "view_count",
    "stock_mentions",
    "title_only",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRow {
    pub title: String,
    pub content: String,
    /// `%Y-%m-%d %H:%M:%S` in the source's local offset.
    pub publish_time: String,
    pub url: String,
    pub sentiment: Sentiment,
    pub quality_score: f64,
    pub sentiment_score: i64,
    pub panic_level: u32,
    pub greed_level: u32,
    pub emotion_intensity: u32,
    pub sentiment_confidence: f64,
    pub source_type: SourceType,
    pub source_target: String,
    pub author_name: String,
    pub author_followers: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub repost_count: u64,
    pub view_count: u64,
    /// Comma-separated instrument codes.
    pub stock_mentions: String,
    pub title_only: bool,
}

impl From<&ScoredPost> for PostRow {
    fn from(scored: &ScoredPost) -> Self {
        let post = &scored.post;
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            publish_time: post.publish_time.format(PUBLISH_TIME_FORMAT).to_string(),
            url: post.url.clone(),
            sentiment: scored.sentiment,
            quality_score: scored.quality_score,
            sentiment_score: scored.sentiment_score,
            panic_level: scored.panic_level,
            greed_level: scored.greed_level,
            emotion_intensity: scored.emotion_intensity,
            sentiment_confidence: scored.sentiment_confidence,
            source_type: post.source_type,
            source_target: post.source_target.id.clone(),
            author_name: post.author.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            author_followers: post.audience_size(),
            like_count: post.engagement.likes,
            comment_count: post.engagement.comments,
            repost_count: post.engagement.reposts,
            view_count: post.engagement.views,
            stock_mentions: post.stock_mentions.join(","),
            title_only: post.title_only,
        }
    }
}

/// One row per ranked post, in rank order, with a fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostTable {
    rows: Vec<PostRow>,
}

impl PostTable {
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    #[must_use]
    pub fn rows(&self) -> &[PostRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl From<&ResultSet> for PostTable {
    fn from(set: &ResultSet) -> Self {
        Self {
            rows: set.iter().map(PostRow::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::rank;
    use chrono::DateTime;
    use crowdpulse_core::{Author, CanonicalPost, Engagement, Target};

    fn scored() -> ScoredPost {
        ScoredPost {
            post: CanonicalPost {
                title: "标题".to_string(),
                content: "内容 600519".to_string(),
                publish_time: DateTime::parse_from_rfc3339("2026-03-02T09:30:00+08:00").unwrap(),
                url: "https://xueqiu.com/1".to_string(),
                source_target: Target::category(102),
                author: Some(Author {
                    name: "老韭菜".to_string(),
                    followers: 2_000,
                }),
                engagement: Engagement {
                    likes: 1,
                    comments: 2,
                    reposts: 3,
                    views: 4,
                },
                source_type: SourceType::XueqiuCommunity,
                stock_mentions: vec!["600519".to_string(), "000001".to_string()],
                title_only: false,
            },
            sentiment: Sentiment::Bullish,
            sentiment_score: 3,
            panic_level: 0,
            greed_level: 1,
            emotion_intensity: 1,
            sentiment_confidence: 3.0,
            quality_score: 0.35,
        }
    }

    #[test]
    fn empty_table_keeps_schema() {
        let table = PostTable::from(&ResultSet::empty());
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 21);
        assert_eq!(table.columns()[0], "title");
    }

    #[test]
    fn row_flattens_post() {
        let table = PostTable::from(&rank(vec![scored()], 10));
        let row = &table.rows()[0];
        assert_eq!(row.author_name, "老韭菜");
        assert_eq!(row.source_target, "102");
        assert_eq!(row.stock_mentions, "600519,000001");
        assert_eq!(row.publish_time, "2026-03-02 09:30:00");
        assert_eq!(row.sentiment, Sentiment::Bullish);
    }

    #[test]
    fn serialized_row_fields_match_columns() {
        let row = PostRow::from(&scored());
        let value = serde_json::to_value(&row).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), COLUMNS.len());
        for column in COLUMNS {
            assert!(object.contains_key(*column), "missing column {column}");
        }
    }
}
