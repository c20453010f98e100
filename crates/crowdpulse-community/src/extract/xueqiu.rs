//! Xueqiu public-timeline JSON extraction.
//!
//! Field types on this API drift (ids and counters arrive as numbers or
//! strings, `user` is sometimes `null`). Every field is read leniently and
//! defaults to empty or zero; a status is only dropped when its cleaned
//! text is empty.

use chrono::{DateTime, FixedOffset};
use crowdpulse_core::{Author, CanonicalPost, Engagement, SourceType};
use crowdpulse_fetch::RawPayload;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{absolutize_url, clean_text, derive_title, extract_stock_mentions};

#[derive(Debug, Default, Deserialize)]
struct Timeline {
    #[serde(default)]
    statuses: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Status {
    #[serde(deserialize_with = "lenient_string")]
    id: String,
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_string")]
    text: String,
    /// Relative permalink, e.g. `/1234567/280000001`.
    #[serde(deserialize_with = "lenient_string")]
    target: String,
    /// Milliseconds since the Unix epoch.
    #[serde(deserialize_with = "lenient_count")]
    created_at: u64,
    #[serde(deserialize_with = "lenient_count")]
    like_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    comment_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    retweet_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    view_count: u64,
    #[serde(deserialize_with = "lenient_user")]
    user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct User {
    #[serde(deserialize_with = "lenient_string")]
    screen_name: String,
    #[serde(deserialize_with = "lenient_count")]
    followers_count: u64,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(f64_to_count))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f64_to_count(f: f64) -> u64 {
    f as u64
}

fn lenient_user<'de, D: Deserializer<'de>>(d: D) -> Result<Option<User>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Extract every usable status from one timeline page.
pub(crate) fn extract_timeline(payload: &RawPayload, site_base: &str) -> Vec<CanonicalPost> {
    let timeline: Timeline = match serde_json::from_str(&payload.body) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!(
                fetch_target = %payload.target,
                page = payload.page,
                error = %e,
                "timeline payload is not the expected JSON shape"
            );
            return Vec::new();
        }
    };

    timeline
        .statuses
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Status>(raw) {
            Ok(status) => status_to_post(status, payload, site_base),
            Err(e) => {
                tracing::debug!(fetch_target = %payload.target, error = %e, "skipping malformed status");
                None
            }
        })
        .collect()
}

fn status_to_post(status: Status, payload: &RawPayload, site_base: &str) -> Option<CanonicalPost> {
    let content = clean_text(&status.text);
    if content.is_empty() {
        return None;
    }
    let explicit_title = clean_text(&status.title);
    let title = if explicit_title.is_empty() {
        derive_title(&content)
    } else {
        explicit_title
    };

    let url = if status.target.is_empty() {
        absolutize_url(site_base, &status.id)
    } else {
        absolutize_url(site_base, &status.target)
    };

    let publish_time = publish_time(status.created_at, payload.fetched_at);
    let stock_mentions = extract_stock_mentions(&format!("{title} {content}"));

    Some(CanonicalPost {
        title,
        content,
        publish_time,
        url,
        source_target: payload.target.clone(),
        author: status.user.map(|u| Author {
            name: u.screen_name,
            followers: u.followers_count,
        }),
        engagement: Engagement {
            likes: status.like_count,
            comments: status.comment_count,
            reposts: status.retweet_count,
            views: status.view_count,
        },
        source_type: SourceType::XueqiuCommunity,
        stock_mentions,
        title_only: false,
    })
}

/// Missing or out-of-range timestamps fall back to the fetch time.
fn publish_time(created_at_ms: u64, fetched_at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    if created_at_ms == 0 {
        return fetched_at;
    }
    i64::try_from(created_at_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map_or(fetched_at, |utc| utc.with_timezone(fetched_at.offset()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdpulse_core::Target;

    const SITE: &str = "https://xueqiu.com";

    fn payload(body: &str) -> RawPayload {
        RawPayload::from_body(
            SourceType::XueqiuCommunity,
            Target::category(102),
            1,
            DateTime::parse_from_rfc3339("2026-03-02T15:00:00+08:00").unwrap(),
            body,
        )
    }

    #[test]
    fn extracts_full_status() {
        let body = r#"{"statuses":[{
            "id": 280000001,
            "text": "<p>看好$贵州茅台(SH600519)$，今天&nbsp;突破</p>",
            "created_at": 1772420400000,
            "like_count": 12, "comment_count": 3, "retweet_count": 2,
            "user": {"screen_name": "价值投资者", "followers_count": 15000}
        }]}"#;
        let posts = extract_timeline(&payload(body), SITE);
        assert_eq!(posts.len(), 1);

        let p = &posts[0];
        assert_eq!(p.content, "看好$贵州茅台(SH600519)$，今天 突破");
        assert_eq!(p.title, p.content);
        assert!(!p.title_only);
        assert_eq!(p.url, "https://xueqiu.com/280000001");
        assert_eq!(p.stock_mentions, vec!["600519"]);
        assert_eq!(p.audience_size(), 15_000);
        assert_eq!(p.engagement.likes, 12);
        assert_eq!(p.engagement.comments, 3);
        assert_eq!(p.engagement.reposts, 2);
        assert_eq!(
            p.publish_time,
            DateTime::parse_from_rfc3339("2026-03-02T11:00:00+08:00").unwrap()
        );
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let body = r#"{"statuses":[{"text": "只是随便说说"}]}"#;
        let p = payload(body);
        let posts = extract_timeline(&p, SITE);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author, None);
        assert_eq!(posts[0].engagement, Engagement::default());
        assert_eq!(posts[0].publish_time, p.fetched_at);
    }

    #[test]
    fn drifted_field_types_are_tolerated() {
        let body = r#"{"statuses":[{
            "id": "99", "text": "数据类型变了",
            "like_count": "7", "comment_count": null, "retweet_count": 1.0,
            "user": null
        }]}"#;
        let posts = extract_timeline(&payload(body), SITE);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].url, "https://xueqiu.com/99");
        assert_eq!(posts[0].engagement.likes, 7);
        assert_eq!(posts[0].engagement.comments, 0);
        assert_eq!(posts[0].engagement.reposts, 1);
        assert_eq!(posts[0].author, None);
    }

    #[test]
    fn explicit_title_and_permalink_are_preferred() {
        let body = r#"{"statuses":[{
            "id": 5, "title": "<b>年报点评</b>", "target": "/1234/5",
            "text": "正文内容"
        }]}"#;
        let posts = extract_timeline(&payload(body), SITE);
        assert_eq!(posts[0].title, "年报点评");
        assert_eq!(posts[0].url, "https://xueqiu.com/1234/5");
    }

    #[test]
    fn long_text_gets_truncated_title_but_full_content() {
        let text = "字".repeat(140);
        let body = format!(r#"{{"statuses":[{{"id":1,"text":"{text}"}}]}}"#);
        let posts = extract_timeline(&payload(&body), SITE);
        assert_eq!(posts[0].content.chars().count(), 140);
        assert!(posts[0].title.ends_with("..."));
        assert_eq!(posts[0].title.chars().count(), 103);
    }

    #[test]
    fn empty_text_and_non_object_statuses_are_skipped() {
        let body = r#"{"statuses":[{"id":1,"text":"<img src='a.png'>"}, 42, {"id":2,"text":"留下"}]}"#;
        let posts = extract_timeline(&payload(body), SITE);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "留下");
    }

    #[test]
    fn unexpected_payloads_yield_nothing() {
        assert!(extract_timeline(&payload("<html>blocked</html>"), SITE).is_empty());
        assert!(extract_timeline(&payload(r#"{"list":[]}"#), SITE).is_empty());
        assert!(extract_timeline(&payload(r#"{"statuses":[]}"#), SITE).is_empty());
    }
}
